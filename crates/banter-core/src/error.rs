//! Error types for the Banter application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the Banter domain.
///
/// Transport failures have their own type in `banter-interaction`; by the time
/// they reach the conversation they are already turned into visible bot
/// messages, so they never surface here.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BanterError {
    /// Configuration error (missing credential, malformed config file, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Input rejected by a domain rule
    #[error("Validation error: {0}")]
    Validation(String),

    /// A send is still in flight for this conversation
    #[error("A message is already being sent")]
    SendInFlight,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BanterError {
    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Serialization error
    pub fn serialization(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialization {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Returns true when the error should be reported as a user mistake
    /// rather than an application failure.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::SendInFlight)
    }
}

impl From<std::io::Error> for BanterError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for BanterError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization("JSON", err.to_string())
    }
}

/// Convenience alias used across the core crate.
pub type Result<T> = std::result::Result<T, BanterError>;
