//! Configuration model for Banter.
//!
//! Mirrors the layout of `config.toml`. Every field has a default so a
//! partially written file (or no file at all) still produces a usable config.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MODEL_NAME: &str = "gemini-2.5-flash-lite";
pub const DEFAULT_API_VERSION: &str = "v1beta";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ChatConfig {
    pub model: ModelSettings,
    pub generation: GenerationSettings,
    pub retry: RetrySettings,
    pub context: ContextSettings,
}

/// Which model to call and where.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ModelSettings {
    pub name: String,
    pub api_version: String,
    pub base_url: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL_NAME.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Sampling parameters sent as `generationConfig`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// When false, no `generationConfig` is sent and the model defaults apply.
    pub enabled: bool,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            temperature: 0.9,
            top_p: 1.0,
            max_output_tokens: 2048,
        }
    }
}

/// Rate-limit retry budget.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySettings {
    /// Total number of requests per send, the first one included.
    pub max_attempts: u32,
    /// Fixed wait between a rate-limited response and the next attempt.
    pub backoff_ms: u64,
}

impl RetrySettings {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_ms: 2000,
        }
    }
}

/// How much history goes back to the model with each send.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    /// The last `window` messages, the new user message included.
    #[default]
    Recent,
    /// Only the message being sent.
    CurrentOnly,
}

#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ContextSettings {
    pub strategy: ContextMode,
    pub window: usize,
}

impl Default for ContextSettings {
    fn default() -> Self {
        Self {
            strategy: ContextMode::Recent,
            window: 6,
        }
    }
}

/// Root configuration structure for secret.json
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Deserialize, Serialize, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"<redacted>")
            .field("model_name", &self.model_name)
            .finish()
    }
}
