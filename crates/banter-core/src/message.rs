//! Conversation message types.
//!
//! This module contains the types for representing a single exchanged
//! message: who sent it and what it says.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Message typed by the person at the keyboard.
    User,
    /// Message produced by the model, or an error placeholder standing in for one.
    Bot,
}

impl Sender {
    /// Role tag used by the generation endpoint for this sender.
    pub fn api_role(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "model",
        }
    }
}

/// A single message in a conversation.
///
/// Messages are immutable once created; the fields are private so the only
/// way to obtain one is through the constructors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    sender: Sender,
    text: String,
    /// Timestamp when the message was created (ISO 8601 format).
    timestamp: String,
}

impl Message {
    /// Creates a message authored by the user.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, text)
    }

    /// Creates a message authored by the model.
    pub fn bot(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text)
    }

    fn new(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            sender,
            text: text.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}
