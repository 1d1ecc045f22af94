//! Token verification delegated to the external identity provider.
//!
//! The backend never validates token signatures itself: every token is
//! sent to the provider's introspection endpoint and the returned
//! claims are trusted. [`TokenVerifier`] is the seam the service layer
//! is written against; tests substitute a mock.

use crate::error::{AuthError, Result};
use crate::types::VerifiedToken;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Timeout for introspection calls.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies identity tokens and yields their claims.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify a raw token string.
    ///
    /// # Errors
    /// `Unauthenticated` for an invalid, expired, or malformed token;
    /// `ProviderUnavailable` when the provider cannot be reached or
    /// answers with a server error.
    async fn verify(&self, token: &str) -> Result<VerifiedToken>;
}

/// Extract the token from an `Authorization` header value.
///
/// Accepts exactly the `Bearer <token>` form, scheme case-insensitive.
pub fn bearer_token(header: &str) -> Result<&str> {
    let mut parts = header.splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(AuthError::Unauthenticated(
            "Invalid Authorization header format, must be Bearer <token>".to_string(),
        )),
    }
}

#[derive(Serialize)]
struct IntrospectRequest<'a> {
    #[serde(rename = "idToken")]
    id_token: &'a str,
}

#[derive(Deserialize)]
struct IntrospectResponse {
    #[serde(rename = "sub")]
    subject_id: String,
    #[serde(default)]
    email: String,
    #[serde(default, rename = "name")]
    display_name: String,
    #[serde(default)]
    admin: bool,
}

/// Verifier that calls the identity provider's introspection endpoint.
pub struct RemoteTokenVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl RemoteTokenVerifier {
    /// Create a verifier for the given introspection endpoint.
    ///
    /// # Errors
    /// `ProviderUnavailable` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(verify_url: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .map_err(|e| AuthError::ProviderUnavailable(e.to_string()))?;

        Ok(Self { client, verify_url })
    }
}

#[async_trait]
impl TokenVerifier for RemoteTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedToken> {
        if token.trim().is_empty() {
            return Err(AuthError::Unauthenticated("Empty token".to_string()));
        }

        let response = self
            .client
            .post(&self.verify_url)
            .json(&IntrospectRequest { id_token: token })
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Identity provider request failed");
                AuthError::ProviderUnavailable(e.to_string())
            })?;

        let status = response.status();
        if status.is_client_error() {
            return Err(AuthError::Unauthenticated(format!(
                "Provider rejected token with status {}",
                status.as_u16()
            )));
        }
        if !status.is_success() {
            return Err(AuthError::ProviderUnavailable(format!(
                "Provider answered with status {}",
                status.as_u16()
            )));
        }

        let claims: IntrospectResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ProviderUnavailable(format!("Malformed claims: {}", e)))?;

        debug!(subject = %claims.subject_id, "Token verified");

        Ok(VerifiedToken {
            subject_id: claims.subject_id,
            email: claims.email,
            display_name: claims.display_name,
            admin: claims.admin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_accepts_standard_form() {
        assert_eq!(bearer_token("Bearer abc123").unwrap(), "abc123");
        assert_eq!(bearer_token("bearer abc123").unwrap(), "abc123");
        assert_eq!(bearer_token("BEARER abc123").unwrap(), "abc123");
    }

    #[test]
    fn test_bearer_token_rejects_malformed_headers() {
        assert!(bearer_token("").is_err());
        assert!(bearer_token("abc123").is_err());
        assert!(bearer_token("Basic abc123").is_err());
        assert!(bearer_token("Bearer ").is_err());
        assert!(bearer_token("Bearer").is_err());
    }

    #[test]
    fn test_introspect_response_defaults() {
        let claims: IntrospectResponse =
            serde_json::from_str(r#"{"sub": "uid-1"}"#).unwrap();
        assert_eq!(claims.subject_id, "uid-1");
        assert!(claims.email.is_empty());
        assert!(claims.display_name.is_empty());
        assert!(!claims.admin);
    }

    #[test]
    fn test_introspect_response_full_claims() {
        let claims: IntrospectResponse = serde_json::from_str(
            r#"{"sub": "uid-1", "email": "a@b.c", "name": "A", "admin": true}"#,
        )
        .unwrap();
        assert_eq!(claims.email, "a@b.c");
        assert_eq!(claims.display_name, "A");
        assert!(claims.admin);
    }
}
