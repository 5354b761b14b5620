//! Loads `config.toml`.

use banter_core::BanterError;
use banter_core::config::ChatConfig;

use crate::paths::BanterPaths;
use crate::storage::AtomicTomlFile;

/// Reads and seeds the chat configuration file.
pub struct ConfigService {
    file: AtomicTomlFile<ChatConfig>,
}

impl ConfigService {
    pub fn new(paths: &BanterPaths) -> Self {
        Self {
            file: AtomicTomlFile::new(paths.config_file()),
        }
    }

    /// Loads the configuration. A missing file gives the defaults; a file
    /// that does not parse is an error rather than being silently ignored.
    pub fn load(&self) -> Result<ChatConfig, BanterError> {
        match self.file.load()? {
            Some(config) => {
                tracing::debug!("Loaded config from {:?}", self.file.path());
                Ok(config)
            }
            None => {
                tracing::debug!("No config at {:?}, using defaults", self.file.path());
                Ok(ChatConfig::default())
            }
        }
    }

    /// Writes a config file with every default spelled out, unless one exists.
    ///
    /// Returns true when a file was created.
    pub fn write_default_if_missing(&self) -> Result<bool, BanterError> {
        if self.file.path().exists() {
            return Ok(false);
        }
        self.file.save(&ChatConfig::default())?;
        tracing::info!("Created default config at {:?}", self.file.path());
        Ok(true)
    }
}
