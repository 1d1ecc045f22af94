//! Service configuration from the environment.
//!
//! Values come from process environment variables, optionally seeded
//! from a `.env` file in the working directory. Missing required
//! variables are reported as errors rather than panics so the binary
//! can fail with a readable message at startup.

use crate::error::{Result, ServiceError};
use core_catalog::SearchStrictness;
use provider_b2::B2Config;
use std::env;

/// Default lifetime of signed retrieval URLs.
pub const DEFAULT_SIGNED_URL_TTL_SECS: u32 = 3600;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// SQLite database file path
    pub database_path: String,
    /// Identity provider introspection endpoint
    pub auth_verify_url: String,
    /// Object storage account and bucket
    pub storage: B2Config,
    /// Lifetime of signed retrieval URLs
    pub signed_url_ttl_secs: u32,
    /// Failure policy for the artist branch of combined search
    pub search_strictness: SearchStrictness,
}

impl ServiceConfig {
    /// Load configuration from the environment, seeding it from a
    /// `.env` file when one exists.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            lookup(key).filter(|v| !v.is_empty()).ok_or_else(|| {
                ServiceError::Validation(format!("Environment variable {} not set", key))
            })
        };

        let search_strictness = match lookup("SEARCH_STRICTNESS").filter(|v| !v.is_empty()) {
            None => SearchStrictness::default(),
            Some(raw) => match raw.as_str() {
                "best-effort" => SearchStrictness::BestEffort,
                "fail-fast" => SearchStrictness::AllFailFast,
                other => {
                    return Err(ServiceError::Validation(format!(
                        "SEARCH_STRICTNESS must be best-effort or fail-fast, got {:?}",
                        other
                    )))
                }
            },
        };

        let signed_url_ttl_secs = match lookup("SIGNED_URL_TTL_SECS") {
            None => DEFAULT_SIGNED_URL_TTL_SECS,
            Some(raw) => raw.parse().map_err(|_| {
                ServiceError::Validation(format!(
                    "SIGNED_URL_TTL_SECS must be a positive integer, got {:?}",
                    raw
                ))
            })?,
        };

        Ok(Self {
            database_path: required("DATABASE_PATH")?,
            auth_verify_url: required("AUTH_VERIFY_URL")?,
            storage: B2Config {
                account_id: required("B2_ACCOUNT_ID")?,
                application_key: required("B2_APPLICATION_KEY")?,
                bucket_name: required("B2_BUCKET_NAME")?,
            },
            signed_url_ttl_secs,
            search_strictness,
        })
    }
}
