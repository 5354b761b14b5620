//! Message exchange orchestration.
//!
//! [`ExchangeOrchestrator`] owns one conversation and its in-flight flag. A
//! send appends the user message, ships the bounded context to the transport
//! and records exactly one bot message for the outcome, success or failure.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use banter_core::config::{ChatConfig, GenerationSettings};
use banter_core::{BanterError, Conversation, Message};
use banter_interaction::{GenerateContentRequest, GenerationTransport, TransportError};

use crate::context::ContextStrategy;

/// Why a send did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Input was empty or whitespace only.
    EmptyInput,
    /// Another send for this conversation has not finished yet.
    SendInFlight,
}

/// Result of [`ExchangeOrchestrator::send_prompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Nothing was appended.
    Rejected(RejectReason),
    /// The model answered; the reply was appended.
    Replied(Message),
    /// The send failed; an `Error: ...` bot message was appended.
    Failed {
        message: Message,
        error: TransportError,
    },
}

impl SendOutcome {
    /// The bot message appended by this send, if any.
    pub fn bot_message(&self) -> Option<&Message> {
        match self {
            SendOutcome::Rejected(_) => None,
            SendOutcome::Replied(message) | SendOutcome::Failed { message, .. } => Some(message),
        }
    }
}

/// Bot message recorded when a send is abandoned before the transport answers.
pub const CANCELLED_REPLY: &str = "Error: request cancelled";

/// Holds the in-flight flag for as long as it lives.
///
/// Released on drop, so every exit path of a send clears the flag, including
/// an early return or the send future being dropped mid-request. Once the
/// user message of a send is in the log, the guard also owes it a reply: if
/// it is dropped before [`PendingGuard::complete`], it appends
/// [`CANCELLED_REPLY`] so the log keeps its user/bot pairing.
struct PendingGuard<'a> {
    flag: &'a AtomicBool,
    conversation: &'a Mutex<Conversation>,
    awaiting_reply: bool,
}

impl<'a> PendingGuard<'a> {
    fn acquire(flag: &'a AtomicBool, conversation: &'a Mutex<Conversation>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag,
                conversation,
                awaiting_reply: false,
            })
    }

    /// Appends the user message and returns the request for it.
    fn begin(
        &mut self,
        user_message: Message,
        context: &ContextStrategy,
        generation: &GenerationSettings,
    ) -> GenerateContentRequest {
        let mut conversation = lock(self.conversation);
        conversation.append(user_message);
        self.awaiting_reply = true;
        GenerateContentRequest::new(context.build_contents(&conversation))
            .with_generation_settings(generation)
    }

    /// Appends the reply owed to the user message and releases the flag.
    fn complete(mut self, reply: Message) {
        lock(self.conversation).append(reply);
        self.awaiting_reply = false;
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.awaiting_reply {
            tracing::warn!("Send dropped before a reply arrived");
            lock(self.conversation).append(Message::bot(CANCELLED_REPLY));
        }
        self.flag.store(false, Ordering::Release);
    }
}

/// The log stays consistent even if a holder panicked, so poisoning is ignored.
fn lock(conversation: &Mutex<Conversation>) -> MutexGuard<'_, Conversation> {
    conversation.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Coordinates one conversation with the remote model.
///
/// Each instance is an independent conversation; nothing is shared between
/// instances except, optionally, the transport. The conversation lock is
/// only ever held for in-memory updates, never across the network call.
pub struct ExchangeOrchestrator {
    transport: Arc<dyn GenerationTransport>,
    conversation: Mutex<Conversation>,
    pending: AtomicBool,
    context: ContextStrategy,
    generation: GenerationSettings,
}

impl ExchangeOrchestrator {
    /// Creates an orchestrator with default context and generation settings.
    pub fn new(transport: Arc<dyn GenerationTransport>) -> Self {
        Self {
            transport,
            conversation: Mutex::new(Conversation::new()),
            pending: AtomicBool::new(false),
            context: ContextStrategy::default(),
            generation: GenerationSettings::default(),
        }
    }

    pub fn from_config(transport: Arc<dyn GenerationTransport>, config: &ChatConfig) -> Self {
        Self::new(transport)
            .with_context_strategy(ContextStrategy::from_settings(&config.context))
            .with_generation_settings(config.generation.clone())
    }

    pub fn with_context_strategy(mut self, context: ContextStrategy) -> Self {
        self.context = context;
        self
    }

    pub fn with_generation_settings(mut self, generation: GenerationSettings) -> Self {
        self.generation = generation;
        self
    }

    pub fn context_strategy(&self) -> ContextStrategy {
        self.context
    }

    /// True while a send is between its user message and its reply.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Sends `input` to the model.
    ///
    /// Blank input and sends issued while another one is in flight are
    /// no-ops. Otherwise the user message and exactly one bot message are
    /// appended; transport failures become `Error: <message>` bot messages
    /// instead of propagating, and a send dropped mid-request leaves
    /// [`CANCELLED_REPLY`] behind.
    pub async fn send_prompt(&self, input: &str) -> SendOutcome {
        if input.trim().is_empty() {
            tracing::debug!("Ignoring empty prompt");
            return SendOutcome::Rejected(RejectReason::EmptyInput);
        }

        let Some(mut pending) = PendingGuard::acquire(&self.pending, &self.conversation) else {
            tracing::debug!("Ignoring prompt while another send is in flight");
            return SendOutcome::Rejected(RejectReason::SendInFlight);
        };

        let request = pending.begin(Message::user(input), &self.context, &self.generation);

        tracing::info!(
            "Sending prompt with {} context message(s)",
            request.contents.len()
        );

        let (reply, outcome) = match self.transport.generate(&request).await {
            Ok(text) => {
                let reply = Message::bot(text);
                (reply.clone(), SendOutcome::Replied(reply))
            }
            Err(error) => {
                tracing::warn!("Send failed: {}", error);
                let reply = Message::bot(format!("Error: {}", error.user_message()));
                let outcome = SendOutcome::Failed {
                    message: reply.clone(),
                    error,
                };
                (reply, outcome)
            }
        };

        pending.complete(reply);
        outcome
    }

    /// Starts a new chat by dropping the whole history.
    ///
    /// Refused while a send is in flight, so a late reply can never land in
    /// the fresh conversation.
    pub fn clear(&self) -> Result<(), BanterError> {
        let _pending = PendingGuard::acquire(&self.pending, &self.conversation)
            .ok_or(BanterError::SendInFlight)?;
        lock(&self.conversation).clear();
        tracing::info!("Conversation cleared");
        Ok(())
    }

    /// A copy of the messages so far, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.conversation).messages().to_vec()
    }

    pub fn len(&self) -> usize {
        lock(&self.conversation).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.conversation).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_guard_is_exclusive_and_released_on_drop() {
        let flag = AtomicBool::new(false);
        let conversation = Mutex::new(Conversation::new());

        let guard = PendingGuard::acquire(&flag, &conversation).expect("first acquire succeeds");
        assert!(flag.load(Ordering::Acquire));
        assert!(PendingGuard::acquire(&flag, &conversation).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(PendingGuard::acquire(&flag, &conversation).is_some());
        assert!(lock(&conversation).is_empty());
    }

    #[test]
    fn test_guard_dropped_after_begin_appends_cancelled_reply() {
        let flag = AtomicBool::new(false);
        let conversation = Mutex::new(Conversation::new());

        let mut guard = PendingGuard::acquire(&flag, &conversation).unwrap();
        let request = guard.begin(
            Message::user("hello"),
            &ContextStrategy::default(),
            &GenerationSettings::default(),
        );
        assert_eq!(request.contents.len(), 1);
        drop(guard);

        let conversation = lock(&conversation);
        assert_eq!(conversation.len(), 2);
        assert_eq!(conversation.messages()[1].text(), CANCELLED_REPLY);
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_completed_guard_appends_only_the_reply() {
        let flag = AtomicBool::new(false);
        let conversation = Mutex::new(Conversation::new());

        let mut guard = PendingGuard::acquire(&flag, &conversation).unwrap();
        guard.begin(
            Message::user("hello"),
            &ContextStrategy::default(),
            &GenerationSettings::default(),
        );
        guard.complete(Message::bot("hi"));

        let texts: Vec<String> = lock(&conversation)
            .messages()
            .iter()
            .map(|m| m.text().to_string())
            .collect();
        assert_eq!(texts, vec!["hello", "hi"]);
        assert!(!flag.load(Ordering::Acquire));
    }

    #[test]
    fn test_bot_message_accessor() {
        let reply = Message::bot("hi");
        assert_eq!(
            SendOutcome::Replied(reply.clone()).bot_message(),
            Some(&reply)
        );
        assert_eq!(
            SendOutcome::Rejected(RejectReason::EmptyInput).bot_message(),
            None
        );
    }
}
