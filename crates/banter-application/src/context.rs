//! Outbound context selection.
//!
//! Decides which part of the conversation goes back to the model and maps it
//! onto role-tagged request contents.

use banter_core::config::{ContextMode, ContextSettings};
use banter_core::{Conversation, Message};
use banter_interaction::Content;

/// How much history accompanies each send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextStrategy {
    /// Only the message being sent.
    CurrentOnly,
    /// The last `window` messages, the message being sent included.
    Recent { window: usize },
}

impl ContextStrategy {
    pub fn from_settings(settings: &ContextSettings) -> Self {
        match settings.strategy {
            ContextMode::CurrentOnly => ContextStrategy::CurrentOnly,
            ContextMode::Recent => ContextStrategy::Recent {
                window: settings.window,
            },
        }
    }

    /// Number of trailing messages this strategy sends. Never zero, so the
    /// message being sent is always part of the context.
    pub fn window(&self) -> usize {
        match self {
            ContextStrategy::CurrentOnly => 1,
            ContextStrategy::Recent { window } => (*window).max(1),
        }
    }

    /// The slice of the conversation to send, oldest first.
    pub fn select<'a>(&self, conversation: &'a Conversation) -> &'a [Message] {
        conversation.recent_window(self.window())
    }

    /// Role-tagged request contents for the selected messages.
    pub fn build_contents(&self, conversation: &Conversation) -> Vec<Content> {
        self.select(conversation)
            .iter()
            .map(|message| Content::text(message.sender().api_role(), message.text()))
            .collect()
    }
}

impl Default for ContextStrategy {
    fn default() -> Self {
        Self::from_settings(&ContextSettings::default())
    }
}
