use core_auth::AuthError;
use core_catalog::CatalogError;
use provider_b2::StorageError;
use thiserror::Error;

/// Service-level error taxonomy.
///
/// Collaborator errors are folded into the caller-facing categories
/// here; the transport layer maps each variant to a status without
/// inspecting the message.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Authentication required: {0}")]
    Unauthenticated(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl From<CatalogError> for ServiceError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound { entity_type, id } => {
                ServiceError::NotFound(format!("{} {}", entity_type, id))
            }
            CatalogError::InvalidInput { field, message } => {
                ServiceError::Validation(format!("{}: {}", field, message))
            }
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Unauthenticated(message) => ServiceError::Unauthenticated(message),
            AuthError::ProviderUnavailable(message) => ServiceError::Upstream(message),
        }
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidLocator(message) => ServiceError::Validation(message),
            other => ServiceError::Upstream(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_not_found_maps_to_not_found() {
        let err: ServiceError = CatalogError::NotFound {
            entity_type: "Song".to_string(),
            id: "s1".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[test]
    fn test_auth_rejection_maps_to_unauthenticated() {
        let err: ServiceError = AuthError::Unauthenticated("bad token".to_string()).into();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[test]
    fn test_provider_outage_maps_to_upstream() {
        let err: ServiceError = AuthError::ProviderUnavailable("timeout".to_string()).into();
        assert!(matches!(err, ServiceError::Upstream(_)));

        let err: ServiceError = StorageError::Api {
            status: 503,
            message: "busy".to_string(),
        }
        .into();
        assert!(matches!(err, ServiceError::Upstream(_)));
    }

    #[test]
    fn test_bad_locator_maps_to_validation() {
        let err: ServiceError = StorageError::InvalidLocator("not a url".to_string()).into();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
