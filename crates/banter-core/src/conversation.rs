//! Append-only conversation log.
//!
//! The full log and the outbound context are separate concerns: the log keeps
//! everything for display, while [`Conversation::recent_window`] hands out the
//! bounded suffix that is sent back to the model.

use super::message::Message;

/// Ordered, append-only log of exchanged messages.
///
/// Individual messages are never mutated or removed; the only destructive
/// operation is [`Conversation::clear`], which drops the whole log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message to the end of the log.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Returns the last `n` messages (or fewer, if the log is shorter) in
    /// their original order.
    ///
    /// The returned slice borrows the log, so it can be iterated as many
    /// times as needed without copying.
    pub fn recent_window(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Resets the log to empty.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }
}
