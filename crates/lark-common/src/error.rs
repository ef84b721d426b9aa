//! Common error types for LarkXR.

use thiserror::Error;

/// Result type alias using LarkXR's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the shared configuration plumbing.
///
/// Failures from the streaming library itself are `lark_vr::VrError`.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (config file, library path, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a serialization error from any displayable type.
    pub fn serialization(msg: impl std::fmt::Display) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Create a config error from any displayable type.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = Error::config("lark.json: expected value");
        assert_eq!(err.to_string(), "configuration error: lark.json: expected value");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
