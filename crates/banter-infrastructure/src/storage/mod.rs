//! Storage layer for small TOML state files.

mod atomic_toml;

pub use atomic_toml::{AtomicTomlError, AtomicTomlFile};
