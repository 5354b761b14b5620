//! Secret service implementation.
//!
//! The API key comes from the `GEMINI_API_KEY` environment variable when it is
//! set, otherwise from `secret.json` in the config directory:
//!
//! ```json
//! { "gemini": { "api_key": "...", "model_name": "gemini-2.5-flash-lite" } }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use banter_core::BanterError;
use banter_core::config::SecretConfig;
use banter_core::secret::{ApiKey, SecretService};
use tokio::sync::RwLock;

use crate::paths::BanterPaths;

/// Environment variable consulted before `secret.json`.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Reads secrets from the environment and `secret.json`, caching the file.
#[derive(Clone)]
pub struct SecretServiceImpl {
    path: PathBuf,
    env_var: Option<String>,
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    pub fn new(paths: &BanterPaths) -> Self {
        Self {
            path: paths.secret_file(),
            env_var: Some(API_KEY_ENV_VAR.to_string()),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    /// Reads the key from `name` instead of `GEMINI_API_KEY`.
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = Some(name.into());
        self
    }

    /// Ignores the environment and only reads `secret.json`.
    pub fn without_env(mut self) -> Self {
        self.env_var = None;
        self
    }

    pub fn secret_file(&self) -> &std::path::Path {
        &self.path
    }

    fn key_from_env(&self) -> Option<ApiKey> {
        let name = self.env_var.as_deref()?;
        let value = std::env::var(name).ok()?;
        match ApiKey::new(value) {
            Ok(key) => {
                tracing::debug!("Using API key from ${}", name);
                Some(key)
            }
            Err(_) => {
                tracing::warn!("${} is set but blank, ignoring it", name);
                None
            }
        }
    }

    async fn read_secret_file(&self) -> Result<SecretConfig, BanterError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No secret file at {:?}", self.path);
                return Ok(SecretConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            BanterError::serialization(
                "JSON",
                format!("Failed to parse {}: {}", self.path.display(), e),
            )
        })
    }

    fn missing_key_error(&self) -> BanterError {
        let env_hint = match &self.env_var {
            Some(name) => format!("Set ${name} or add "),
            None => "Add ".to_string(),
        };
        BanterError::config(format!(
            "No Gemini API key configured. {}gemini.api_key to {}",
            env_hint,
            self.path.display()
        ))
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, BanterError> {
        if let Some(cached) = self.secrets.read().await.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = self.read_secret_file().await?;
        *self.secrets.write().await = Some(loaded.clone());
        Ok(loaded)
    }

    async fn gemini_api_key(&self) -> Result<ApiKey, BanterError> {
        if let Some(key) = self.key_from_env() {
            return Ok(key);
        }

        let secrets = self.load_secrets().await?;
        match secrets.gemini {
            Some(gemini) => ApiKey::new(gemini.api_key).map_err(|_| self.missing_key_error()),
            None => Err(self.missing_key_error()),
        }
    }
}
