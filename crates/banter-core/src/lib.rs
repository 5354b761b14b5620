pub mod config;
pub mod conversation;
pub mod error;
pub mod message;
pub mod secret;
pub mod theme;
pub mod user;

// Re-export common types
pub use conversation::Conversation;
pub use error::BanterError;
pub use message::{Message, Sender};
pub use secret::ApiKey;
pub use theme::Theme;
pub use user::UserProfile;
