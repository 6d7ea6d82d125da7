//! End-to-end conversation scenarios against in-memory storage.
//!
//! Each test wires the coordinator to a real `RealtimeRouter` and checks
//! both what was stored and what connected clients received.

use std::sync::Arc;

use tokio::sync::mpsc;

use live_chat::adapters::memory::{
    InMemoryBotConfigurationRepository, InMemoryMessageLog, InMemorySessionRegistry,
};
use live_chat::adapters::websocket::{ParticipantRole, RealtimeRouter, ServerMessage};
use live_chat::application::handlers::bot::BotEngine;
use live_chat::application::handlers::conversation::{
    ConversationCoordinator, CoordinatorOptions, OperatorActionCommand, VisitorActionCommand,
};
use live_chat::domain::bot::{BotAction, BotConfigurationUpdate, BotOptionDraft};
use live_chat::domain::foundation::{
    AccessKeyId, BotOptionId, CompanyId, OperatorId, OperatorRole, SenderType, SessionId,
    SessionStatus,
};
use live_chat::domain::tenant::{AccessKeyGrant, Actor, OperatorIdentity};
use live_chat::ports::{BotConfigurationRepository, MessageLog, SessionRegistry};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Scenario {
    coordinator: Arc<ConversationCoordinator>,
    router: Arc<RealtimeRouter>,
    sessions: InMemorySessionRegistry,
    messages: InMemoryMessageLog,
    bots: InMemoryBotConfigurationRepository,
}

fn scenario(options: CoordinatorOptions) -> Scenario {
    let sessions = InMemorySessionRegistry::new();
    let messages = InMemoryMessageLog::new();
    let bots = InMemoryBotConfigurationRepository::new();
    let router = Arc::new(RealtimeRouter::default());

    let coordinator = ConversationCoordinator::new(
        Arc::new(sessions.clone()),
        Arc::new(messages.clone()),
        BotEngine::new(Arc::new(bots.clone())),
        router.clone(),
        options,
    );

    Scenario {
        coordinator: Arc::new(coordinator),
        router,
        sessions,
        messages,
        bots,
    }
}

fn company() -> CompanyId {
    CompanyId::new(1)
}

fn grant() -> AccessKeyGrant {
    AccessKeyGrant {
        key_id: AccessKeyId::new(1),
        company_id: company(),
        issuing_operator: OperatorId::new(10),
    }
}

fn owner() -> OperatorIdentity {
    OperatorIdentity::new(OperatorId::new(10), company(), OperatorRole::Operator)
}

fn first_contact(visitor: &str, content: Option<&str>, option: Option<BotOptionId>) -> VisitorActionCommand {
    VisitorActionCommand {
        grant: grant(),
        session_id: None,
        visitor_identifier: Some(visitor.to_string()),
        visitor_name: None,
        content: content.map(str::to_string),
        attachment_ref: None,
        bot_option_id: option,
    }
}

impl Scenario {
    async fn configure_bot(&self, enabled: bool, action: BotAction, reply: &str, url: Option<&str>) -> BotOptionId {
        let saved = self
            .bots
            .save(&BotConfigurationUpdate {
                company_id: company(),
                enabled,
                welcome_message: Some("Welcome".to_string()),
                options: vec![BotOptionDraft {
                    id: None,
                    label: "Docs".to_string(),
                    action,
                    reply_text: Some(reply.to_string()),
                    link_url: url.map(str::to_string),
                    sort_order: 0,
                    is_active: true,
                }],
            })
            .await
            .unwrap();
        saved.options[0].id
    }

    async fn watch(&self, session_id: SessionId, role: ParticipantRole) -> mpsc::Receiver<ServerMessage> {
        let (id, rx) = self.router.register().await;
        self.router.join_session(&id, session_id, role, company()).await;
        rx
    }
}

fn received(rx: &mut mpsc::Receiver<ServerMessage>) -> Vec<(SenderType, Option<String>)> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        if let ServerMessage::NewMessage(event) = message {
            out.push((event.sender_type, event.content));
        }
    }
    out
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn repeated_first_contact_returns_the_same_session() {
    let s = scenario(CoordinatorOptions::default());

    let first = s
        .coordinator
        .handle_visitor_action(first_contact("visitor-1", Some("Hi"), None))
        .await
        .unwrap();
    let second = s
        .coordinator
        .handle_visitor_action(first_contact("visitor-1", Some("Hello again"), None))
        .await
        .unwrap();

    assert_eq!(first.session.id(), second.session.id());
    assert_eq!(s.sessions.session_count().await, 1);
}

#[tokio::test]
async fn concurrent_first_contact_creates_one_open_session() {
    let s = scenario(CoordinatorOptions::default());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let coordinator = s.coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .handle_visitor_action(first_contact("visitor-1", Some(&format!("msg {}", i)), None))
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(*task.await.unwrap().unwrap().session.id());
    }

    ids.dedup();
    assert_eq!(ids.len(), 1);
    assert_eq!(s.sessions.open_count("visitor-1", &grant().session_owner()).await, 1);
    assert_eq!(s.messages.list_by_session(&ids[0]).await.unwrap().len(), 16);
}

#[tokio::test]
async fn close_then_visitor_message_reopens() {
    let s = scenario(CoordinatorOptions::default());
    let result = s
        .coordinator
        .handle_visitor_action(first_contact("visitor-1", Some("Hi"), None))
        .await
        .unwrap();
    let session_id = *result.session.id();

    s.sessions.close(&session_id, &owner()).await.unwrap();
    s.coordinator
        .handle_operator_action(OperatorActionCommand {
            identity: owner(),
            session_id,
            content: Some("Closing note".to_string()),
            attachment_ref: None,
        })
        .await
        .unwrap();
    assert_eq!(s.sessions.get(&session_id).await.unwrap().status(), SessionStatus::Closed);

    s.coordinator
        .handle_visitor_action(VisitorActionCommand::text(grant(), session_id, "Back again"))
        .await
        .unwrap();

    assert_eq!(s.sessions.get(&session_id).await.unwrap().status(), SessionStatus::Open);
}

#[tokio::test]
async fn link_option_replies_with_text_and_url() {
    let s = scenario(CoordinatorOptions::default());
    let option = s
        .configure_bot(true, BotAction::Link, "See our docs", Some("https://x/y"))
        .await;

    let result = s
        .coordinator
        .handle_visitor_action(first_contact("visitor-1", None, Some(option)))
        .await
        .unwrap();

    let reply = result.bot_reply.expect("bot reply");
    assert_eq!(reply.sender_type, SenderType::System);
    assert_eq!(reply.content.as_deref(), Some("See our docs\nhttps://x/y"));
    // the click itself is stored under the option label
    assert_eq!(result.visitor_message.content.as_deref(), Some("Docs"));
}

#[tokio::test]
async fn disabled_bot_never_replies() {
    let s = scenario(CoordinatorOptions::default());
    let option = s.configure_bot(false, BotAction::Reply, "Hello", None).await;

    let result = s
        .coordinator
        .handle_visitor_action(first_contact("visitor-1", Some("Docs please"), Some(option)))
        .await
        .unwrap();

    assert!(result.bot_reply.is_none());
    let stored = s.messages.list_by_session(result.session.id()).await.unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn operator_reply_reaches_every_watcher_once() {
    let s = scenario(CoordinatorOptions::default());
    let result = s
        .coordinator
        .handle_visitor_action(first_contact("visitor-1", Some("Hi"), None))
        .await
        .unwrap();
    let session_id = *result.session.id();

    let mut visitor_rx = s.watch(session_id, ParticipantRole::Visitor).await;
    let mut owner_rx = s.watch(session_id, ParticipantRole::Operator).await;
    // operator watching a different session of the same company
    let mut colleague_rx = s.watch(SessionId::new(), ParticipantRole::Operator).await;

    s.coordinator
        .handle_operator_action(OperatorActionCommand {
            identity: owner(),
            session_id,
            content: Some("How can I help?".to_string()),
            attachment_ref: None,
        })
        .await
        .unwrap();

    let expected = vec![(SenderType::Operator, Some("How can I help?".to_string()))];
    assert_eq!(received(&mut visitor_rx), expected);
    assert_eq!(received(&mut owner_rx), expected);
    assert_eq!(received(&mut colleague_rx), expected);
}

#[tokio::test]
async fn handoff_is_monotonic() {
    let s = scenario(CoordinatorOptions {
        handoff_option_requests_handoff: true,
    });
    let option = s.configure_bot(true, BotAction::Handoff, "Connecting you", None).await;

    let result = s
        .coordinator
        .handle_visitor_action(first_contact("visitor-1", None, Some(option)))
        .await
        .unwrap();
    let session_id = *result.session.id();
    let flagged = s.sessions.get(&session_id).await.unwrap();
    assert!(flagged.handoff_requested());
    let first_at = flagged.handoff_requested_at().cloned();

    let again = s
        .coordinator
        .request_handoff(&session_id, &Actor::Visitor(grant()))
        .await
        .unwrap();
    s.sessions.close(&session_id, &owner()).await.unwrap();

    let after = s.sessions.get(&session_id).await.unwrap();
    assert!(again.handoff_requested());
    assert!(after.handoff_requested());
    assert_eq!(after.handoff_requested_at().cloned(), first_at);
}
