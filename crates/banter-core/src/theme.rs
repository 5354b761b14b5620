//! Visual theme token.
//!
//! The core never looks at the theme; it is owned by the shell, which persists
//! the selection and restores it on startup.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::BanterError;

const TOKEN_PREFIX: &str = "theme-";

/// The closed set of available themes.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    Blue,
}

impl Theme {
    /// Returns the persisted token form, e.g. `theme-dark`.
    pub fn token(self) -> String {
        format!("{TOKEN_PREFIX}{self}")
    }

    /// Parses a persisted token. Unknown tokens are rejected.
    pub fn from_token(token: &str) -> Result<Self, BanterError> {
        token
            .strip_prefix(TOKEN_PREFIX)
            .and_then(|name| Theme::from_str(name).ok())
            .ok_or_else(|| BanterError::validation(format!("Unknown theme token: {token}")))
    }

    /// Parses either a bare name (`dark`) or a token (`theme-dark`).
    pub fn parse_loose(value: &str) -> Result<Self, BanterError> {
        let value = value.trim();
        Theme::from_str(value).or_else(|_| Self::from_token(value))
    }

    pub fn available() -> Vec<Theme> {
        Theme::iter().collect()
    }

    /// Label shown in theme selectors.
    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "🌞 Light",
            Theme::Dark => "🌙 Dark",
            Theme::Blue => "💠 Blue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_light() {
        assert_eq!(Theme::default(), Theme::Light);
    }

    #[test]
    fn test_token_round_trip() {
        for theme in Theme::available() {
            assert_eq!(Theme::from_token(&theme.token()).unwrap(), theme);
        }
        assert_eq!(Theme::Blue.token(), "theme-blue");
    }

    #[test]
    fn test_unknown_tokens_rejected() {
        assert!(Theme::from_token("theme-neon").is_err());
        assert!(Theme::from_token("dark").is_err());
        assert!(Theme::from_token("").is_err());
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(Theme::parse_loose("dark").unwrap(), Theme::Dark);
        assert_eq!(Theme::parse_loose(" theme-blue ").unwrap(), Theme::Blue);
        assert!(Theme::parse_loose("purple").is_err());
    }

    #[test]
    fn test_available_is_closed_set() {
        assert_eq!(
            Theme::available(),
            vec![Theme::Light, Theme::Dark, Theme::Blue]
        );
    }
}
