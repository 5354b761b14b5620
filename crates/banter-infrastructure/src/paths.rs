//! Path management for banter configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/banter/            # Config directory (platform config dir)
//! ├── config.toml              # Model, generation, retry and context settings
//! ├── secret.json              # API key (fallback when GEMINI_API_KEY is unset)
//! ├── app_state.toml           # Theme and last display name
//! └── logs/                    # Application logs
//!     └── banter.log.YYYY-MM-DD
//! ```

use banter_core::BanterError;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "banter";

/// Resolves every file location from one base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanterPaths {
    base: PathBuf,
}

impl BanterPaths {
    /// Uses `base` when given, otherwise the platform config directory.
    pub fn new(base: Option<&Path>) -> Result<Self, BanterError> {
        let base = match base {
            Some(path) => path.to_path_buf(),
            None => dirs::config_dir()
                .ok_or_else(|| BanterError::config("Cannot find config directory"))?
                .join(APP_DIR_NAME),
        };
        Ok(Self { base })
    }

    pub fn config_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// # Security Note
    ///
    /// Keep this file at 600 permissions.
    pub fn secret_file(&self) -> PathBuf {
        self.base.join("secret.json")
    }

    pub fn app_state_file(&self) -> PathBuf {
        self.base.join("app_state.toml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs")
    }

    /// Creates the config directory if needed.
    pub async fn ensure_config_dir(&self) -> Result<(), BanterError> {
        tokio::fs::create_dir_all(&self.base).await?;
        Ok(())
    }
}
