//! Error handling for the change-feed reader
//!
//! This module provides the crate-level error type and result alias. Errors raised
//! by individual shard readers are carried unchanged inside [`Error::Shard`].

use std::io;

use thiserror::Error;

use crate::shard::ShardError;

/// Errors that can occur while reading a change feed
#[derive(Error, Debug)]
pub enum Error {
    /// The merger's internal state is inconsistent (construction or cursor bug)
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A shard read failed; the shard's error is preserved as-is
    #[error(transparent)]
    Shard(#[from] ShardError),

    /// Errors related to cursors
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// Errors related to segment manifests
    #[error("Manifest error for {path}: {message}")]
    Manifest {
        path: String,
        message: String,
    },

    /// Errors related to timestamp operations
    #[error("Timestamp error: {0}")]
    Timestamp(String),

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Generic error type for other cases
    #[error("{0}")]
    Other(String),
}

/// Result type for change-feed operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    /// Create a new cursor error
    pub fn cursor(message: impl Into<String>) -> Self {
        Self::Cursor(message.into())
    }

    /// Create a new manifest error
    pub fn manifest(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Manifest {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new timestamp error
    pub fn timestamp(message: impl Into<String>) -> Self {
        Self::Timestamp(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Check if this error is a programming fault rather than a runtime failure
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }

    /// Check if the operation was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Shard(err) if err.is_cancelled())
    }

    /// Check if retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Shard(err) => err.is_transient(),
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Check if this is a serialization error
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Get a user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidState(_) => {
                Some("The segment was built with an out-of-range shard index; rebuild it from a valid cursor".to_string())
            }
            Self::Cursor(_) => {
                Some("The cursor does not belong to this segment; start from the segment beginning or use the matching cursor".to_string())
            }
            Self::Shard(err) if err.is_cancelled() => None,
            Self::Shard(err) if err.is_transient() => {
                Some("The shard read failed transiently; retry from the last cursor".to_string())
            }
            Self::Config(_) => Some("Check the reader configuration values".to_string()),
            _ => None,
        }
    }
}
