use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use banter_application::{
    CANCELLED_REPLY, ContextStrategy, ExchangeOrchestrator, RejectReason, SendOutcome,
};
use banter_core::config::GenerationSettings;
use banter_core::{BanterError, Message, Sender};
use banter_interaction::{
    Content, GenerateContentRequest, GenerationTransport, NO_RESPONSE_PLACEHOLDER, TransportError,
};
use tokio::sync::{Notify, Semaphore};

/// Transport that replays scripted results and records every request.
#[derive(Default)]
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<String, TransportError>>>,
    requests: Mutex<Vec<GenerateContentRequest>>,
    /// When set, each call waits for a permit before answering.
    gate: Option<Arc<Semaphore>>,
    entered: Notify,
}

impl ScriptedTransport {
    fn replying(replies: Vec<Result<String, TransportError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    fn gated(replies: Vec<Result<String, TransportError>>, gate: Arc<Semaphore>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::replying(replies)
        }
    }

    fn requests(&self) -> Vec<GenerateContentRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationTransport for ScriptedTransport {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<String, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.entered.notify_one();
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("default reply".to_string()))
    }
}

fn pairs(messages: &[Message]) -> Vec<(Sender, &str)> {
    messages.iter().map(|m| (m.sender(), m.text())).collect()
}

#[tokio::test]
async fn test_hello_scenario() {
    let transport = Arc::new(ScriptedTransport::replying(vec![Ok("Hi there".to_string())]));
    let orchestrator = ExchangeOrchestrator::new(transport.clone());

    let outcome = orchestrator.send_prompt("Hello").await;

    assert!(matches!(outcome, SendOutcome::Replied(ref m) if m.text() == "Hi there"));
    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].contents, vec![Content::text("user", "Hello")]);
    assert_eq!(
        pairs(&orchestrator.messages()),
        vec![(Sender::User, "Hello"), (Sender::Bot, "Hi there")]
    );
    assert!(!orchestrator.is_pending());
}

#[tokio::test]
async fn test_api_error_becomes_visible_message() {
    let transport = Arc::new(ScriptedTransport::replying(vec![Err(TransportError::Api {
        status: 500,
        message: "quota exceeded".to_string(),
    })]));
    let orchestrator = ExchangeOrchestrator::new(transport);

    let outcome = orchestrator.send_prompt("Hello").await;

    match outcome {
        SendOutcome::Failed { message, error } => {
            assert_eq!(message.text(), "Error: quota exceeded");
            assert_eq!(error.status(), Some(500));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    let messages = orchestrator.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1].sender(), Sender::Bot);
    assert_eq!(messages[1].text(), "Error: quota exceeded");
    assert!(!orchestrator.is_pending());
}

#[tokio::test]
async fn test_exhausted_rate_limit_becomes_visible_message() {
    let transport = Arc::new(ScriptedTransport::replying(vec![Err(
        TransportError::RateLimited {
            attempts: 3,
            message: "rate limit exceeded after 3 attempts".to_string(),
        },
    )]));
    let orchestrator = ExchangeOrchestrator::new(transport);

    orchestrator.send_prompt("Hello").await;

    let messages = orchestrator.messages();
    assert_eq!(messages[1].text(), "Error: rate limit exceeded after 3 attempts");
}

#[tokio::test]
async fn test_placeholder_reply_is_recorded() {
    let transport = Arc::new(ScriptedTransport::replying(vec![Ok(
        NO_RESPONSE_PLACEHOLDER.to_string()
    )]));
    let orchestrator = ExchangeOrchestrator::new(transport);

    orchestrator.send_prompt("Hello").await;

    assert_eq!(
        orchestrator.messages()[1].text(),
        NO_RESPONSE_PLACEHOLDER
    );
}

#[tokio::test]
async fn test_blank_input_is_noop() {
    let transport = Arc::new(ScriptedTransport::default());
    let orchestrator = ExchangeOrchestrator::new(transport.clone());

    for input in ["", "   ", "\n\t "] {
        assert_eq!(
            orchestrator.send_prompt(input).await,
            SendOutcome::Rejected(RejectReason::EmptyInput)
        );
    }

    assert!(orchestrator.is_empty());
    assert!(transport.requests().is_empty());
    assert!(!orchestrator.is_pending());
}

#[tokio::test]
async fn test_user_text_kept_verbatim() {
    let transport = Arc::new(ScriptedTransport::default());
    let orchestrator = ExchangeOrchestrator::new(transport.clone());

    orchestrator.send_prompt("  padded  ").await;

    assert_eq!(orchestrator.messages()[0].text(), "  padded  ");
    assert_eq!(transport.requests()[0].contents[0].parts[0].text, "  padded  ");
}

#[tokio::test]
async fn test_send_while_pending_is_rejected() {
    let gate = Arc::new(Semaphore::new(0));
    let transport = Arc::new(ScriptedTransport::gated(
        vec![Ok("first reply".to_string())],
        gate.clone(),
    ));
    let orchestrator = Arc::new(ExchangeOrchestrator::new(transport.clone()));

    let in_flight = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.send_prompt("first").await }
    });
    transport.entered.notified().await;

    assert!(orchestrator.is_pending());
    assert_eq!(orchestrator.len(), 1);
    assert_eq!(
        orchestrator.send_prompt("second").await,
        SendOutcome::Rejected(RejectReason::SendInFlight)
    );
    assert_eq!(orchestrator.clear(), Err(BanterError::SendInFlight));
    assert_eq!(orchestrator.len(), 1);
    assert!(orchestrator.is_pending());

    gate.add_permits(1);
    let outcome = in_flight.await.unwrap();

    assert!(matches!(outcome, SendOutcome::Replied(_)));
    assert_eq!(
        pairs(&orchestrator.messages()),
        vec![(Sender::User, "first"), (Sender::Bot, "first reply")]
    );
    assert!(!orchestrator.is_pending());
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_dropped_send_leaves_cancelled_reply() {
    let gate = Arc::new(Semaphore::new(0));
    let transport = Arc::new(ScriptedTransport::gated(vec![], gate.clone()));
    let orchestrator = ExchangeOrchestrator::new(transport.clone());

    let result =
        tokio::time::timeout(Duration::from_millis(50), orchestrator.send_prompt("stuck")).await;

    assert!(result.is_err());
    assert!(!orchestrator.is_pending());
    assert_eq!(orchestrator.len() % 2, 0);
    assert_eq!(
        pairs(&orchestrator.messages()),
        vec![(Sender::User, "stuck"), (Sender::Bot, CANCELLED_REPLY)]
    );

    gate.add_permits(1);
    orchestrator.send_prompt("again").await;

    assert_eq!(orchestrator.len(), 4);
    assert_eq!(
        transport.requests()[1].contents,
        vec![
            Content::text("user", "stuck"),
            Content::text("model", CANCELLED_REPLY),
            Content::text("user", "again"),
        ]
    );
}

#[tokio::test]
async fn test_conversation_length_tracks_completed_sends() {
    let transport = Arc::new(ScriptedTransport::replying(vec![
        Ok("a1".to_string()),
        Err(TransportError::Network("connection reset".to_string())),
        Ok("a3".to_string()),
    ]));
    let orchestrator = ExchangeOrchestrator::new(transport);

    for (completed, prompt) in ["q1", "q2", "q3"].into_iter().enumerate() {
        orchestrator.send_prompt(prompt).await;
        assert_eq!(orchestrator.len(), (completed + 1) * 2);
        assert!(!orchestrator.is_pending());
    }

    assert_eq!(orchestrator.messages()[3].text(), "Error: connection reset");
}

#[tokio::test]
async fn test_recent_context_window() {
    let transport = Arc::new(ScriptedTransport::default());
    let orchestrator = ExchangeOrchestrator::new(transport.clone())
        .with_context_strategy(ContextStrategy::Recent { window: 3 });

    orchestrator.send_prompt("q1").await;
    orchestrator.send_prompt("q2").await;
    orchestrator.send_prompt("q3").await;

    let last = transport.requests().pop().unwrap();
    assert_eq!(
        last.contents,
        vec![
            Content::text("user", "q2"),
            Content::text("model", "default reply"),
            Content::text("user", "q3"),
        ]
    );
}

#[tokio::test]
async fn test_current_only_context() {
    let transport = Arc::new(ScriptedTransport::default());
    let orchestrator = ExchangeOrchestrator::new(transport.clone())
        .with_context_strategy(ContextStrategy::CurrentOnly);

    orchestrator.send_prompt("q1").await;
    orchestrator.send_prompt("q2").await;

    assert_eq!(
        transport.requests()[1].contents,
        vec![Content::text("user", "q2")]
    );
}

#[tokio::test]
async fn test_generation_settings_forwarded() {
    let transport = Arc::new(ScriptedTransport::default());
    let orchestrator = ExchangeOrchestrator::new(transport.clone()).with_generation_settings(
        GenerationSettings {
            max_output_tokens: 256,
            ..GenerationSettings::default()
        },
    );

    orchestrator.send_prompt("hi").await;

    let config = transport.requests()[0]
        .generation_config
        .clone()
        .expect("generation config attached");
    assert_eq!(config.max_output_tokens, 256);
}

#[tokio::test]
async fn test_clear_then_continue() {
    let transport = Arc::new(ScriptedTransport::default());
    let orchestrator = ExchangeOrchestrator::new(transport.clone());

    orchestrator.send_prompt("before").await;
    orchestrator.clear().unwrap();
    assert!(orchestrator.is_empty());
    assert!(!orchestrator.is_pending());

    orchestrator.send_prompt("after").await;

    assert_eq!(orchestrator.len(), 2);
    assert_eq!(
        transport.requests()[1].contents,
        vec![Content::text("user", "after")]
    );
}

#[tokio::test]
async fn test_independent_conversations_share_transport() {
    let transport = Arc::new(ScriptedTransport::default());
    let first = ExchangeOrchestrator::new(transport.clone());
    let second = ExchangeOrchestrator::new(transport.clone());

    first.send_prompt("one").await;

    assert_eq!(first.len(), 2);
    assert!(second.is_empty());
}
