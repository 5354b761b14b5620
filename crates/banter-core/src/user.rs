//! UserProfile domain model.
//!
//! The display name is supplied by the shell before any chatting happens and
//! is used verbatim as the sender label for user messages.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::BanterError;

const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

/// User profile domain model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    display_name: String,
}

impl UserProfile {
    /// Creates a profile, rejecting names that are empty after trimming.
    ///
    /// The name itself is kept exactly as entered.
    pub fn new(display_name: impl Into<String>) -> Result<Self, BanterError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(BanterError::validation("Display name must not be empty"));
        }
        Ok(Self { display_name })
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn greeting(&self) -> String {
        format!("Hi, {}", self.display_name)
    }

    /// Generated avatar image URL for this user.
    pub fn avatar_url(&self) -> Result<String, BanterError> {
        let url = Url::parse_with_params(
            AVATAR_BASE_URL,
            &[
                ("name", self.display_name.as_str()),
                ("background", "4f46e5"),
                ("color", "fff"),
                ("rounded", "true"),
                ("size", "40"),
            ],
        )
        .map_err(|e| BanterError::Internal(format!("Invalid avatar URL: {e}")))?;
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_names_rejected() {
        assert!(UserProfile::new("").is_err());
        assert!(UserProfile::new("   ").is_err());
    }

    #[test]
    fn test_name_kept_verbatim() {
        let profile = UserProfile::new(" Ada ").unwrap();
        assert_eq!(profile.display_name(), " Ada ");
        assert_eq!(profile.greeting(), "Hi,  Ada ");
    }

    #[test]
    fn test_avatar_url_encodes_name() {
        let profile = UserProfile::new("Ada & Co").unwrap();
        let avatar = profile.avatar_url().unwrap();
        let url = Url::parse(&avatar).unwrap();

        assert_eq!(url.host_str(), Some("ui-avatars.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs[0], ("name".to_string(), "Ada & Co".to_string()));
        assert!(pairs.contains(&("size".to_string(), "40".to_string())));
        assert!(!avatar.contains("Ada & Co"));
    }
}
