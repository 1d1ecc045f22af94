//! # Authentication Module
//!
//! Token verification delegated to an external identity provider.
//! This crate owns the [`TokenVerifier`] seam, the remote HTTP
//! implementation behind it, and bearer-header parsing. It holds no
//! credentials and issues no tokens of its own.

pub mod error;
pub mod types;
pub mod verifier;

pub use error::{AuthError, Result};
pub use types::VerifiedToken;
pub use verifier::{bearer_token, RemoteTokenVerifier, TokenVerifier};
