//! Error types for `duobox-core`.
//!
//! Fallible local operations (config loading, entry construction) return
//! [`CoreResult<T>`]. Remote calls fail with [`TransportError`], which is
//! `Clone` so a single failure can fan out to every waiter of a fetch.

use std::path::PathBuf;

/// Unified error type for local core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The target file does not exist.
    #[error("path not found: {0}")]
    NotFound(PathBuf),

    /// The process lacks permission to access the file.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An entry name is invalid (empty or contains a path separator).
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// Failed to parse a TOML configuration file.
    #[error("config parse error: {0}")]
    ConfigParse(String),

    /// A remote call failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// An I/O error that doesn't fit a more specific variant.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout `duobox-core`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Failure of a call to the remote directory service.
///
/// Opaque to the navigation core beyond its display message, except for
/// [`TransportError::NotFound`], which triggers stale-entry removal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The remote path no longer exists.
    #[error("not found: {0}")]
    NotFound(String),

    /// The access token was rejected.
    #[error("authentication failed: {0}")]
    Unauthorized(String),

    /// The service asked us to back off.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// The request never got a response.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The service answered with something we could not interpret.
    #[error("malformed response: {0}")]
    Protocol(String),

    /// Any other error reported by the service.
    #[error("remote error: {0}")]
    Remote(String),
}

impl TransportError {
    /// Returns `true` for [`TransportError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_displays_path() {
        let err = CoreError::NotFound(PathBuf::from("/missing/config.toml"));
        assert_eq!(err.to_string(), "path not found: /missing/config.toml");
    }

    #[test]
    fn invalid_name_displays_quoted_name() {
        let err = CoreError::InvalidName("a/b".to_string());
        assert_eq!(err.to_string(), "invalid name: \"a/b\"");
    }

    #[test]
    fn config_parse_displays_message() {
        let err = CoreError::ConfigParse("unexpected token".to_string());
        assert_eq!(err.to_string(), "config parse error: unexpected token");
    }

    #[test]
    fn transport_error_is_transparent() {
        let err: CoreError = TransportError::Unauthorized("expired token".to_string()).into();
        assert!(matches!(err, CoreError::Transport(_)));
        assert_eq!(err.to_string(), "authentication failed: expired token");
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let core_err: CoreError = io_err.into();
        assert!(matches!(core_err, CoreError::Io(_)));
        assert!(core_err.to_string().contains("disk on fire"));
    }

    #[test]
    fn only_not_found_is_not_found() {
        assert!(TransportError::NotFound("/gone".to_string()).is_not_found());
        assert!(!TransportError::Remote("boom".to_string()).is_not_found());
        assert!(!TransportError::RateLimited("slow down".to_string()).is_not_found());
    }

    #[test]
    fn transport_error_clones_equal() {
        let err = TransportError::Connection("reset by peer".to_string());
        assert_eq!(err.clone(), err);
    }
}
