use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Storage request failed: {0}")]
    Network(String),

    #[error("Malformed storage response: {0}")]
    Parse(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Invalid object locator: {0}")]
    InvalidLocator(String),
}

impl From<reqwest::Error> for StorageError {
    fn from(err: reqwest::Error) -> Self {
        StorageError::Network(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;
