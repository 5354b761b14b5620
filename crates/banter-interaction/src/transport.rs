//! Transport seam between the exchange logic and the remote model.

use async_trait::async_trait;
use thiserror::Error;

use crate::gemini_api::GenerateContentRequest;

/// Failure of a single send, after any rate-limit retries have been spent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced an HTTP response (DNS, TLS, connection reset, ...).
    #[error("Request failed: {0}")]
    Network(String),

    /// Non-success status with a message taken from the error body.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// Every attempt in the retry budget came back rate limited.
    #[error("Rate limited after {attempts} attempts: {message}")]
    RateLimited { attempts: u32, message: String },

    /// Success status, but the body was not valid JSON.
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl TransportError {
    /// The human readable part shown to the user after `"Error: "`.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Network(message)
            | TransportError::Api { message, .. }
            | TransportError::RateLimited { message, .. } => message.clone(),
            TransportError::Decode(message) => format!("Failed to parse response: {message}"),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Api { status, .. } => Some(*status),
            TransportError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }
}

/// Sends one generation request and returns the reply text.
///
/// Implementations own their retry behaviour; a call only returns once the
/// exchange is finished one way or the other.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, TransportError>;
}
