//! # Backblaze B2 Storage Provider
//!
//! Blob storage for uploaded audio files via the B2 native API. The
//! [`ObjectStore`] trait is the seam consumed by the service layer;
//! [`B2ObjectStore`] is the production implementation with lazy
//! session establishment and cached upload targets.

pub mod connector;
pub mod error;
pub mod store;
pub mod types;

pub use connector::{B2Config, B2ObjectStore};
pub use error::{Result, StorageError};
pub use store::{object_key, ObjectStore};
