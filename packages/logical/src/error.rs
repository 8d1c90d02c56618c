//! Error types for backends and storage.

/// Errors raised by backends and storage implementations.
///
/// The router never inspects these; it hands them back to its caller as-is.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The backend does not implement the requested operation.
    #[error("unsupported operation")]
    UnsupportedOperation,

    /// The backend has nothing at the requested path.
    #[error("unsupported path")]
    UnsupportedPath,

    /// The request was malformed.
    #[error("invalid request: {message}")]
    InvalidRequest { message: String },

    /// The caller may not perform the operation.
    #[error("permission denied")]
    PermissionDenied,

    /// The underlying storage failed.
    #[error("storage error: {message}")]
    Storage { message: String },

    /// Stored or submitted data could not be (de)serialized.
    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage {
            message: message.into(),
        }
    }

    pub fn other(message: impl Into<String>) -> Self {
        Error::Other {
            message: message.into(),
        }
    }
}

/// Result alias for backend and storage operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn error_display() {
        assert_eq!(Error::UnsupportedPath.to_string(), "unsupported path");
        assert_eq!(
            Error::invalid_request("missing data").to_string(),
            "invalid request: missing data"
        );
        assert_eq!(Error::other("boom").to_string(), "boom");
    }

    #[test]
    fn codec_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: Error = json_err.into();
        assert!(matches!(e, Error::Codec(_)));
        assert!(StdError::source(&e).is_some());
    }

    #[test]
    fn storage_error_has_no_source() {
        let e = Error::storage("disk on fire");
        assert!(e.to_string().contains("disk on fire"));
        assert!(StdError::source(&e).is_none());
    }
}
