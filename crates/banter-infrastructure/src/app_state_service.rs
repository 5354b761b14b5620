//! Application state service implementation.
//!
//! Remembers the chosen theme and the last display name across restarts in
//! `app_state.toml`.

use std::sync::{Arc, RwLock};

use banter_core::{BanterError, Theme};
use serde::{Deserialize, Serialize};

use crate::paths::BanterPaths;
use crate::storage::AtomicTomlFile;

/// State that persists across restarts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Theme token, e.g. `theme-dark`.
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub last_display_name: Option<String>,
}

/// Reads and writes [`AppState`], caching it after the first load.
#[derive(Clone)]
pub struct AppStateService {
    file: Arc<AtomicTomlFile<AppState>>,
    state: Arc<RwLock<Option<AppState>>>,
}

impl AppStateService {
    pub fn new(paths: &BanterPaths) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(paths.app_state_file())),
            state: Arc::new(RwLock::new(None)),
        }
    }

    /// Loads the state, falling back to the default when the file is missing
    /// or unreadable.
    fn load_state(&self) -> AppState {
        if let Ok(guard) = self.state.read()
            && let Some(cached) = guard.as_ref()
        {
            return cached.clone();
        }

        let loaded = match self.file.load() {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Ignoring unreadable {:?}: {}", self.file.path(), e);
                AppState::default()
            }
        };

        if let Ok(mut guard) = self.state.write() {
            *guard = Some(loaded.clone());
        }
        loaded
    }

    /// Applies `f` to the state on disk under the file lock, then refreshes
    /// the cache.
    fn update<F>(&self, f: F) -> Result<(), BanterError>
    where
        F: FnOnce(&mut AppState),
    {
        let mut updated = None;
        self.file.update(AppState::default(), |stored| {
            f(stored);
            updated = Some(stored.clone());
        })?;

        if let Ok(mut guard) = self.state.write() {
            *guard = updated;
        }
        Ok(())
    }

    /// Returns the saved theme. Unknown tokens fall back to the default.
    pub fn theme(&self) -> Theme {
        match self.load_state().theme {
            Some(token) => Theme::from_token(&token).unwrap_or_else(|e| {
                tracing::warn!("{}, using default theme", e);
                Theme::default()
            }),
            None => Theme::default(),
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<(), BanterError> {
        self.update(|state| state.theme = Some(theme.token()))
    }

    pub fn last_display_name(&self) -> Option<String> {
        self.load_state().last_display_name
    }

    pub fn set_last_display_name(&self, name: impl Into<String>) -> Result<(), BanterError> {
        let name = name.into();
        self.update(|state| state.last_display_name = Some(name))
    }
}
