//! Caller-facing failures of the service layer

use thiserror::Error;

use crate::error::StoreError;

/// Result type alias using ServiceError
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Outcome classes a caller can act on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The request itself is malformed or violates the record layout
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A unique key is already taken
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Another write holds the table; retry later
    #[error("Busy: {0}")]
    Busy(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        let message = err.to_string();
        match err {
            StoreError::DuplicateKey { .. } => ServiceError::Conflict(message),
            StoreError::NotFound { .. } => ServiceError::NotFound(message),
            StoreError::Busy { .. } => ServiceError::Busy(message),
            StoreError::MissingField { .. }
            | StoreError::TypeMismatch { .. }
            | StoreError::UnknownIndex { .. }
            | StoreError::Serialization(_)
            | StoreError::Protocol(_) => ServiceError::BadRequest(message),
            StoreError::Schema(_)
            | StoreError::UnknownTable(_)
            | StoreError::Io(_)
            | StoreError::Network(_)
            | StoreError::Config(_) => ServiceError::Internal(message),
        }
    }
}
