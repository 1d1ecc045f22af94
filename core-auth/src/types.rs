use serde::{Deserialize, Serialize};

/// Claims extracted from a successfully verified identity token.
///
/// `subject_id` is the provider-assigned user id and the only value
/// used as an account key. `admin` is the explicit elevated-privilege
/// claim gating administrative operations; it is never inferred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedToken {
    /// Provider-assigned subject (user) id
    pub subject_id: String,
    /// Email claim, empty when absent
    #[serde(default)]
    pub email: String,
    /// Display name claim, empty when absent
    #[serde(default)]
    pub display_name: String,
    /// Elevated-privilege claim
    #[serde(default)]
    pub admin: bool,
}
