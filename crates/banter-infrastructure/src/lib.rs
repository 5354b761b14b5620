//! Filesystem-backed services for banter: paths, config, secrets and app state.

pub mod app_state_service;
pub mod config_service;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use app_state_service::{AppState, AppStateService};
pub use config_service::ConfigService;
pub use paths::BanterPaths;
pub use secret_service::{API_KEY_ENV_VAR, SecretServiceImpl};
