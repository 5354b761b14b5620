//! Secret management service trait.
//!
//! Defines the interface for obtaining the API credential and the opaque
//! wrapper it travels in.

use crate::config::SecretConfig;
use crate::error::BanterError;

/// The API credential.
///
/// Constant for the lifetime of the process. `Debug` never prints the value,
/// and the only way to read it is [`ApiKey::expose`], which the transport
/// calls when building a request URL.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a credential, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Result<Self, BanterError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BanterError::config("API key must not be empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Service for loading secret configuration.
///
/// # Security Note
///
/// Implementations should ensure that:
/// - Secret files have appropriate permissions (e.g., 600 on Unix)
/// - Secrets are never logged or exposed in error messages
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    async fn load_secrets(&self) -> Result<SecretConfig, BanterError>;

    /// Resolves the Gemini credential from whatever sources the
    /// implementation consults.
    async fn gemini_api_key(&self) -> Result<ApiKey, BanterError>;
}
