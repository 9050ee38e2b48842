//! Error types for the shard module
//!
//! Defines the errors a shard reader can surface. The segment merger passes these
//! through to its caller without interpretation.

use std::io;

use thiserror::Error;

/// Errors that can occur during shard reads
#[derive(Error, Debug)]
pub enum ShardError {
    /// The shard or one of its chunks does not exist
    #[error("Shard not found: {0}")]
    NotFound(String),

    /// Network or timeout failure while fetching shard data
    #[error("Transport error: {0}")]
    Transport(String),

    /// A chunk record could not be decoded
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// The shard cursor does not match the shard contents
    #[error("Invalid shard cursor: {0}")]
    InvalidCursor(String),

    /// The read was cancelled through its cancellation token
    #[error("The operation was aborted")]
    Cancelled,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error
    #[error("Shard error: {0}")]
    Other(String),
}

/// Result type for shard operations
pub type ShardResult<T> = std::result::Result<T, ShardError>;

impl ShardError {
    /// Create a new shard not found error
    pub fn not_found(shard_path: impl Into<String>) -> Self {
        Self::NotFound(shard_path.into())
    }

    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Create a new deserialization error
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Create a new invalid cursor error
    pub fn invalid_cursor(message: impl Into<String>) -> Self {
        Self::InvalidCursor(message.into())
    }

    /// Create a new cancellation error
    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    /// Create a new generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this error is worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Io(_))
    }
}

impl From<serde_json::Error> for ShardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Deserialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shard_error_creation() {
        let err = ShardError::not_found("log/00/2019/02/22/1810/");
        assert!(matches!(err, ShardError::NotFound(ref path) if path == "log/00/2019/02/22/1810/"));
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Shard not found: log/00/2019/02/22/1810/");

        let err = ShardError::cancelled();
        assert!(err.is_cancelled());
        assert!(!err.is_transient());
    }

    #[test]
    fn test_shard_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::TimedOut, "read timed out");
        let err = ShardError::from(io_err);

        assert!(matches!(err, ShardError::Io(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_shard_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ShardError::from(json_err);
        assert!(matches!(err, ShardError::Deserialization(_)));
    }
}
