//! Error types for Keyward

use thiserror::Error;

use crate::domain::keys::StorageError;

/// Result type alias using Keyward's Error
pub type Result<T> = std::result::Result<T, Error>;

/// The two kinds of failure surfaced to callers of the lifecycle service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller omitted a required input
    BadRequest,
    /// An underlying collaborator failed
    Internal,
}

/// Keyward error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Request errors (E400-E499)
    #[error("Bad request: {0}")]
    BadRequest(String),

    // Remote errors (E500-E599)
    #[error("Internal error: {0}")]
    Internal(String),

    // Storage errors (E600-E699)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // Config errors (E700-E799)
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error into one of the two caller-facing kinds
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::BadRequest(_) => ErrorKind::BadRequest,
            _ => ErrorKind::Internal,
        }
    }

    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "E400",
            Self::Internal(_) => "E500",
            Self::Storage(_) => "E600",
            Self::Config(_) => "E700",
            Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Internal(_) => Some("Check `keyward config get bridge.url` and retry".to_string()),
            Self::Storage(StorageError::Keyring(_)) => {
                Some("keyward config set storage.backend file".to_string())
            }
            Self::Config(_) => Some("keyward config list".to_string()),
            _ => None,
        }
    }
}
