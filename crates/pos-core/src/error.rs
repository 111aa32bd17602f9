//! # POS Error Types
//!
//! Typed error handling for deli-pos.
//! Backend calls, configuration and cart storage return `Result<T, PosError>`.
//! Order submission has its own outcome taxonomy, see [`crate::submitter::OrderFailure`].

use thiserror::Error;

/// Core error type for backend, configuration and storage operations
#[derive(Debug, Error)]
pub enum PosError {
    /// Configuration errors (missing or malformed settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Menu item not found in catalog
    #[error("Menu item not found: {item_id}")]
    ItemNotFound { item_id: String },

    /// No staff session is active
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Backend could not be reached or the call timed out
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Backend answered with a non-success HTTP status
    #[error("Backend returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Backend answered 2xx but reported an application-level error
    #[error("Backend error [{action}]: {message}")]
    Backend { action: String, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Cart slot could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PosError {
    /// Returns true if the cashier may simply try again
    pub fn is_retryable(&self) -> bool {
        match self {
            PosError::NetworkError(_) => true,
            PosError::HttpStatus { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// True for failures of the transport itself, as opposed to a backend verdict
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PosError::NetworkError(_) | PosError::HttpStatus { .. } | PosError::Serialization(_)
        )
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PosError::Configuration(_) => 500,
            PosError::InvalidRequest(_) => 400,
            PosError::ItemNotFound { .. } => 404,
            PosError::NotAuthenticated => 401,
            PosError::NetworkError(_) => 503,
            PosError::HttpStatus { .. } => 502,
            PosError::Backend { .. } => 422,
            PosError::Serialization(_) => 502,
            PosError::Storage(_) => 500,
            PosError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for PosError {
    fn from(err: serde_json::Error) -> Self {
        PosError::Serialization(err.to_string())
    }
}

/// Result type alias for POS operations
pub type PosResult<T> = Result<T, PosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(PosError::NetworkError("timeout".into()).is_retryable());
        assert!(PosError::HttpStatus {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!PosError::HttpStatus {
            status: 404,
            body: String::new()
        }
        .is_retryable());
        assert!(!PosError::InvalidRequest("bad data".into()).is_retryable());
    }

    #[test]
    fn test_transport_classification() {
        assert!(PosError::Serialization("eof".into()).is_transport());
        assert!(!PosError::Backend {
            action: "addOrder".into(),
            message: "out of stock".into()
        }
        .is_transport());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(PosError::InvalidRequest("test".into()).status_code(), 400);
        assert_eq!(PosError::NotAuthenticated.status_code(), 401);
        assert_eq!(
            PosError::ItemNotFound {
                item_id: "x".into()
            }
            .status_code(),
            404
        );
        assert_eq!(PosError::NetworkError("down".into()).status_code(), 503);
    }
}
