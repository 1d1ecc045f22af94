//! Object storage abstraction.
//!
//! [`ObjectStore`] is the seam the service layer is written against;
//! tests substitute a mock, production wires in
//! [`crate::B2ObjectStore`].

use crate::error::{Result, StorageError};
use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

/// Blob storage for uploaded audio files.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key` and return a durable public locator
    /// for the object.
    async fn put_object(&self, key: &str, data: Bytes) -> Result<String>;

    /// Produce a time-limited signed URL granting read access to the
    /// object stored under `key`.
    async fn signed_url(&self, key: &str, valid_secs: u32) -> Result<String>;
}

/// Recover the object key from a public locator.
///
/// Locators are URLs whose last path segment is the stored key; the
/// segment is percent-decoded before being returned.
pub fn object_key(locator: &str) -> Result<String> {
    let url = Url::parse(locator)
        .map_err(|e| StorageError::InvalidLocator(format!("{}: {}", locator, e)))?;

    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
        .ok_or_else(|| StorageError::InvalidLocator(format!("no file name in {}", locator)))?;

    let decoded = urlencoding::decode(last)
        .map_err(|e| StorageError::InvalidLocator(format!("{}: {}", locator, e)))?;

    Ok(decoded.into_owned())
}
