//! ConversationCoordinator - visitor sends, operator sends and handoff.
//!
//! Every step is persisted before it is broadcast. The visitor message and
//! the bot reply are independent: a failing bot step never undoes the
//! visitor message.

use std::sync::Arc;

use crate::application::handlers::bot::BotEngine;
use crate::domain::conversation::ChatError;
use crate::domain::foundation::{BotOptionId, CompanyId, ErrorCode, SessionId, Timestamp};
use crate::domain::message::{Message, MessageAuthor, MessageBody, NewMessage};
use crate::domain::session::ChatSession;
use crate::domain::tenant::Actor;
use crate::ports::{MessageBroadcaster, MessageLog, SessionRegistry};

use super::commands::{
    OperatorActionCommand, PreparedVisitorAction, VisitorActionCommand, VisitorActionResult,
    VisitorTarget,
};

/// Behaviour switches of the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Whether choosing a bot `handoff` option also sets the session's
    /// handoff flag.
    pub handoff_option_requests_handoff: bool,
}

/// Orchestrates sessions, messages, the bot and real-time delivery.
#[derive(Clone)]
pub struct ConversationCoordinator {
    sessions: Arc<dyn SessionRegistry>,
    messages: Arc<dyn MessageLog>,
    bot: BotEngine,
    broadcaster: Arc<dyn MessageBroadcaster>,
    options: CoordinatorOptions,
}

impl ConversationCoordinator {
    pub fn new(
        sessions: Arc<dyn SessionRegistry>,
        messages: Arc<dyn MessageLog>,
        bot: BotEngine,
        broadcaster: Arc<dyn MessageBroadcaster>,
        options: CoordinatorOptions,
    ) -> Self {
        Self {
            sessions,
            messages,
            bot,
            broadcaster,
            options,
        }
    }

    /// Store and deliver a visitor action, then the bot's answer if any.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if nothing would be stored, or no session id and
    ///   no visitor identifier were given
    /// - `NotFound` if the session is missing or in another company
    pub async fn handle_visitor_action(
        &self,
        cmd: VisitorActionCommand,
    ) -> Result<VisitorActionResult, ChatError> {
        let prepared = self.prepare_visitor_action(cmd).await?;
        self.commit_visitor_action(prepared).await
    }

    /// Validate a visitor action without creating, reopening or touching
    /// any session.
    ///
    /// A pure option click is resolved to the option's label here, so a
    /// click on an unknown or inactive option, or one made while the bot is
    /// disabled, is rejected as empty.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if nothing would be stored, or no session id and
    ///   no visitor identifier were given
    pub async fn prepare_visitor_action(
        &self,
        cmd: VisitorActionCommand,
    ) -> Result<PreparedVisitorAction, ChatError> {
        let target = match cmd.session_id {
            Some(session_id) => VisitorTarget::Session(session_id),
            None => {
                let identifier = cmd
                    .visitor_identifier
                    .as_deref()
                    .filter(|v| !v.trim().is_empty())
                    .ok_or_else(|| {
                        ChatError::invalid_argument(
                            "visitor_identifier",
                            "required when no session id is given",
                        )
                    })?;
                VisitorTarget::FirstContact {
                    visitor_identifier: identifier.to_string(),
                }
            }
        };

        let mut content = cmd.content;
        if is_blank(content.as_deref()) && is_blank(cmd.attachment_ref.as_deref()) {
            if let Some(option_id) = cmd.bot_option_id {
                content = self.bot.option_label(cmd.grant.company_id, option_id).await?;
            }
        }
        let body = MessageBody::new(content.as_deref(), cmd.attachment_ref.as_deref())?;

        Ok(PreparedVisitorAction {
            grant: cmd.grant,
            target,
            visitor_name: cmd.visitor_name,
            body,
            bot_option_id: cmd.bot_option_id,
        })
    }

    /// Store and deliver a prepared visitor action.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session is missing or in another company
    pub async fn commit_visitor_action(
        &self,
        prepared: PreparedVisitorAction,
    ) -> Result<VisitorActionResult, ChatError> {
        let company_id = prepared.grant.company_id;
        let mut session = self.resolve_visitor_session(&prepared).await?;

        let new_message =
            NewMessage::from_body(*session.id(), MessageAuthor::Visitor, prepared.body);
        let visitor_message = self.store_and_broadcast(company_id, new_message).await?;

        let bot_reply = match prepared.bot_option_id {
            Some(option_id) => self.answer_option(&mut session, company_id, option_id).await,
            None => None,
        };

        Ok(VisitorActionResult {
            session,
            visitor_message,
            bot_reply,
        })
    }

    /// Store and deliver an operator reply. Never reopens a closed session.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session is missing or in another company
    /// - `Forbidden` if the operator is neither owner nor admin
    /// - `InvalidArgument` for an empty message
    pub async fn handle_operator_action(
        &self,
        cmd: OperatorActionCommand,
    ) -> Result<Message, ChatError> {
        let session = self.sessions.get(&cmd.session_id).await?;
        session.ensure_operator_access(&cmd.identity)?;

        let new_message = NewMessage::new(
            cmd.session_id,
            MessageAuthor::Operator(cmd.identity.operator_id),
            cmd.content.as_deref(),
            cmd.attachment_ref.as_deref(),
        )?;
        let stored = self.messages.append(new_message).await?;
        self.sessions.touch(&cmd.session_id, stored.created_at).await?;
        self.broadcaster
            .broadcast_message(session.company_id(), &stored)
            .await;

        Ok(stored)
    }

    /// Flag a session for a human operator. Idempotent.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the session is missing or in another company
    /// - `Forbidden` if an operator is neither owner nor admin
    pub async fn request_handoff(
        &self,
        session_id: &SessionId,
        actor: &Actor,
    ) -> Result<ChatSession, ChatError> {
        let session = self.sessions.get(session_id).await?;
        session.ensure_visible_to(actor)?;
        Ok(self.sessions.request_handoff(session_id, actor).await?)
    }

    async fn resolve_visitor_session(
        &self,
        prepared: &PreparedVisitorAction,
    ) -> Result<ChatSession, ChatError> {
        let now = Timestamp::now();

        let session_id = match &prepared.target {
            VisitorTarget::Session(session_id) => *session_id,
            VisitorTarget::FirstContact { visitor_identifier } => {
                let mut session = self
                    .sessions
                    .ensure_open_session(
                        visitor_identifier,
                        prepared.visitor_name(),
                        &prepared.grant.session_owner(),
                    )
                    .await?;
                self.sessions.touch(session.id(), now).await?;
                session.touch(now);
                return Ok(session);
            }
        };

        let mut session = self.sessions.get(&session_id).await?;
        session.ensure_access_key(&prepared.grant)?;

        if session.record_visitor_name(prepared.visitor_name()) {
            if let Some(name) = session.visitor_name() {
                self.sessions.fill_visitor_name(&session_id, name).await?;
            }
        }

        // Always go through the atomic reopen: the status read above may
        // already be stale if an operator closed the session meanwhile.
        match self.sessions.reopen_if_closed(&session_id, now).await {
            Ok(reopened) => {
                session.reopen(now);
                if reopened {
                    tracing::info!(session_id = %session_id, "Reopened chat session");
                }
            }
            Err(err) if err.code == ErrorCode::Conflict => {
                // another open session exists for this visitor; keep the message here
                tracing::warn!(
                    session_id = %session_id,
                    "Could not reopen session, another one is open"
                );
                self.sessions.touch(&session_id, now).await?;
                session.touch(now);
            }
            Err(err) => return Err(err.into()),
        }
        Ok(session)
    }

    async fn store_and_broadcast(
        &self,
        company_id: CompanyId,
        message: NewMessage,
    ) -> Result<Message, ChatError> {
        let stored = self.messages.append(message).await?;
        let delivered = self.broadcaster.broadcast_message(company_id, &stored).await;
        tracing::debug!(
            session_id = %stored.session_id,
            message_id = %stored.id,
            delivered,
            "Message delivered"
        );
        Ok(stored)
    }

    /// Bot step for a chosen option. Failures are logged, not returned.
    async fn answer_option(
        &self,
        session: &mut ChatSession,
        company_id: CompanyId,
        option_id: BotOptionId,
    ) -> Option<Message> {
        let reply = match self.bot.evaluate(company_id, option_id).await {
            Ok(reply) => reply?,
            Err(err) => {
                tracing::warn!(session_id = %session.id(), error = %err, "Bot evaluation failed");
                return None;
            }
        };

        let stored = match self
            .store_and_broadcast(company_id, NewMessage::system(*session.id(), reply.content.as_str()))
            .await
        {
            Ok(stored) => stored,
            Err(err) => {
                tracing::warn!(session_id = %session.id(), error = %err, "Bot reply not stored");
                return None;
            }
        };

        if reply.is_handoff() && self.options.handoff_option_requests_handoff {
            let now = Timestamp::now();
            match self.sessions.mark_handoff_requested(session.id(), now).await {
                Ok(_) => {
                    session.request_handoff(now);
                }
                Err(err) => {
                    tracing::warn!(session_id = %session.id(), error = %err, "Bot handoff not recorded");
                }
            }
        }

        Some(stored)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use crate::adapters::memory::{
        InMemoryBotConfigurationRepository, InMemoryMessageLog, InMemorySessionRegistry,
    };
    use crate::domain::bot::{BotAction, BotConfigurationUpdate, BotOptionDraft};
    use crate::domain::foundation::{AccessKeyId, DomainError, OperatorId, OperatorRole, SenderType};
    use crate::domain::tenant::{AccessKeyGrant, OperatorIdentity, SessionOwner};
    use crate::ports::{BotConfigurationRepository, SessionListFilter};

    #[derive(Default)]
    struct RecordingBroadcaster {
        sent: Mutex<Vec<(CompanyId, Message)>>,
    }

    impl RecordingBroadcaster {
        fn sent(&self) -> Vec<(CompanyId, Message)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageBroadcaster for RecordingBroadcaster {
        async fn broadcast_message(&self, company_id: CompanyId, message: &Message) -> usize {
            self.sent.lock().unwrap().push((company_id, message.clone()));
            1
        }
    }

    struct Fixture {
        coordinator: ConversationCoordinator,
        sessions: InMemorySessionRegistry,
        messages: InMemoryMessageLog,
        bot: Arc<InMemoryBotConfigurationRepository>,
        broadcaster: Arc<RecordingBroadcaster>,
    }

    fn fixture(options: CoordinatorOptions) -> Fixture {
        let sessions = InMemorySessionRegistry::new();
        let messages = InMemoryMessageLog::new();
        let bot = Arc::new(InMemoryBotConfigurationRepository::new());
        let broadcaster = Arc::new(RecordingBroadcaster::default());
        let coordinator = ConversationCoordinator::new(
            Arc::new(sessions.clone()),
            Arc::new(messages.clone()),
            BotEngine::new(bot.clone()),
            broadcaster.clone(),
            options,
        );
        Fixture {
            coordinator,
            sessions,
            messages,
            bot,
            broadcaster,
        }
    }

    fn grant(company: i64) -> AccessKeyGrant {
        AccessKeyGrant {
            key_id: AccessKeyId::new(1),
            company_id: CompanyId::new(company),
            issuing_operator: OperatorId::new(10),
        }
    }

    fn owner() -> OperatorIdentity {
        OperatorIdentity::new(OperatorId::new(10), CompanyId::new(1), OperatorRole::Operator)
    }

    fn first_contact(content: &str) -> VisitorActionCommand {
        VisitorActionCommand {
            grant: grant(1),
            session_id: None,
            visitor_identifier: Some("visitor-1".to_string()),
            visitor_name: Some("Alice".to_string()),
            content: Some(content.to_string()),
            attachment_ref: None,
            bot_option_id: None,
        }
    }

    async fn save_option(f: &Fixture, action: BotAction, reply: Option<&str>, url: Option<&str>) -> BotOptionId {
        let saved = f
            .bot
            .save(&BotConfigurationUpdate {
                company_id: CompanyId::new(1),
                enabled: true,
                welcome_message: None,
                options: vec![BotOptionDraft {
                    id: None,
                    label: "Docs".to_string(),
                    action,
                    reply_text: reply.map(str::to_string),
                    link_url: url.map(str::to_string),
                    sort_order: 0,
                    is_active: true,
                }],
            })
            .await
            .unwrap();
        saved.options[0].id
    }

    #[tokio::test]
    async fn first_contact_opens_session_and_broadcasts() {
        let f = fixture(CoordinatorOptions::default());

        let result = f
            .coordinator
            .handle_visitor_action(first_contact("Hello"))
            .await
            .unwrap();

        assert!(result.session.is_open());
        assert_eq!(result.session.visitor_name(), Some("Alice"));
        assert_eq!(result.visitor_message.sender_type, SenderType::Visitor);
        assert!(!result.visitor_message.is_read);
        assert!(result.bot_reply.is_none());

        let sent = f.broadcaster.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, CompanyId::new(1));
        assert_eq!(sent[0].1, result.visitor_message);
    }

    #[tokio::test]
    async fn repeated_first_contact_reuses_session() {
        let f = fixture(CoordinatorOptions::default());

        let a = f.coordinator.handle_visitor_action(first_contact("one")).await.unwrap();
        let b = f.coordinator.handle_visitor_action(first_contact("two")).await.unwrap();

        assert_eq!(a.session.id(), b.session.id());
        assert_eq!(f.sessions.session_count().await, 1);
    }

    #[tokio::test]
    async fn missing_identifier_is_invalid() {
        let f = fixture(CoordinatorOptions::default());
        let mut cmd = first_contact("Hello");
        cmd.visitor_identifier = None;

        let err = f.coordinator.handle_visitor_action(cmd).await.unwrap_err();

        assert!(matches!(err, ChatError::InvalidArgument { .. }));
        assert_eq!(f.sessions.session_count().await, 0);
    }

    #[tokio::test]
    async fn empty_visitor_message_is_rejected_and_not_broadcast() {
        let f = fixture(CoordinatorOptions::default());

        let err = f
            .coordinator
            .handle_visitor_action(first_contact("   "))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::InvalidArgument { .. }));
        assert_eq!(f.messages.message_count().await, 0);
        assert_eq!(f.sessions.session_count().await, 0);
        assert!(f.broadcaster.sent().is_empty());
    }

    fn option_click(session_id: Option<SessionId>, option: BotOptionId) -> VisitorActionCommand {
        VisitorActionCommand {
            session_id,
            content: None,
            bot_option_id: Some(option),
            ..first_contact("")
        }
    }

    #[tokio::test]
    async fn unknown_option_click_leaves_closed_session_closed() {
        let f = fixture(CoordinatorOptions::default());
        let first = f.coordinator.handle_visitor_action(first_contact("hi")).await.unwrap();
        let id = *first.session.id();
        f.sessions.close(&id, &owner()).await.unwrap();

        let err = f
            .coordinator
            .handle_visitor_action(option_click(Some(id), BotOptionId::new(999)))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::InvalidArgument { .. }));
        assert!(!f.sessions.get(&id).await.unwrap().is_open());
        assert_eq!(f.messages.message_count().await, 1);
        assert_eq!(f.broadcaster.sent().len(), 1);
    }

    #[tokio::test]
    async fn unknown_option_click_on_first_contact_creates_no_session() {
        let f = fixture(CoordinatorOptions::default());

        let err = f
            .coordinator
            .handle_visitor_action(option_click(None, BotOptionId::new(999)))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::InvalidArgument { .. }));
        assert_eq!(f.sessions.session_count().await, 0);
        assert_eq!(f.messages.message_count().await, 0);
    }

    #[tokio::test]
    async fn option_click_while_bot_disabled_changes_nothing() {
        let f = fixture(CoordinatorOptions::default());
        let option = save_option(&f, BotAction::Reply, Some("Hello"), None).await;
        f.bot
            .save(&BotConfigurationUpdate {
                company_id: CompanyId::new(1),
                enabled: false,
                welcome_message: None,
                options: vec![BotOptionDraft {
                    id: Some(option),
                    label: "Docs".to_string(),
                    action: BotAction::Reply,
                    reply_text: Some("Hello".to_string()),
                    link_url: None,
                    sort_order: 0,
                    is_active: true,
                }],
            })
            .await
            .unwrap();

        let first = f.coordinator.handle_visitor_action(first_contact("hi")).await.unwrap();
        let id = *first.session.id();
        f.sessions.close(&id, &owner()).await.unwrap();

        assert!(f
            .coordinator
            .handle_visitor_action(option_click(Some(id), option))
            .await
            .is_err());
        assert!(!f.sessions.get(&id).await.unwrap().is_open());
        assert_eq!(f.sessions.session_count().await, 1);
        assert_eq!(f.messages.message_count().await, 1);
    }

    /// Registry whose lookups return the session and then let an operator
    /// close it, as if the close committed right after the read.
    struct CloseAfterRead {
        inner: InMemorySessionRegistry,
        armed: AtomicBool,
    }

    #[async_trait]
    impl SessionRegistry for CloseAfterRead {
        async fn find_by_id(&self, id: &SessionId) -> Result<Option<ChatSession>, DomainError> {
            let found = self.inner.find_by_id(id).await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.inner.mark_closed(id).await?;
            }
            Ok(found)
        }

        async fn find_open(
            &self,
            visitor_identifier: &str,
            owner: &SessionOwner,
        ) -> Result<Option<ChatSession>, DomainError> {
            self.inner.find_open(visitor_identifier, owner).await
        }

        async fn insert_open(&self, session: &ChatSession) -> Result<(), DomainError> {
            self.inner.insert_open(session).await
        }

        async fn fill_visitor_name(&self, id: &SessionId, name: &str) -> Result<(), DomainError> {
            self.inner.fill_visitor_name(id, name).await
        }

        async fn touch(&self, id: &SessionId, at: Timestamp) -> Result<(), DomainError> {
            self.inner.touch(id, at).await
        }

        async fn reopen_if_closed(&self, id: &SessionId, at: Timestamp) -> Result<bool, DomainError> {
            self.inner.reopen_if_closed(id, at).await
        }

        async fn mark_closed(&self, id: &SessionId) -> Result<bool, DomainError> {
            self.inner.mark_closed(id).await
        }

        async fn mark_handoff_requested(
            &self,
            id: &SessionId,
            at: Timestamp,
        ) -> Result<bool, DomainError> {
            self.inner.mark_handoff_requested(id, at).await
        }

        async fn list(&self, filter: &SessionListFilter) -> Result<Vec<ChatSession>, DomainError> {
            self.inner.list(filter).await
        }
    }

    #[tokio::test]
    async fn visitor_message_reopens_session_closed_after_lookup() {
        let inner = InMemorySessionRegistry::new();
        let messages = InMemoryMessageLog::new();
        let registry = Arc::new(CloseAfterRead {
            inner: inner.clone(),
            armed: AtomicBool::new(false),
        });
        let coordinator = ConversationCoordinator::new(
            registry.clone(),
            Arc::new(messages.clone()),
            BotEngine::new(Arc::new(InMemoryBotConfigurationRepository::new())),
            Arc::new(RecordingBroadcaster::default()),
            CoordinatorOptions::default(),
        );
        let first = coordinator.handle_visitor_action(first_contact("hi")).await.unwrap();
        let id = *first.session.id();

        registry.armed.store(true, Ordering::SeqCst);
        let result = coordinator
            .handle_visitor_action(VisitorActionCommand::text(grant(1), id, "still there?"))
            .await
            .unwrap();

        assert!(result.session.is_open());
        assert!(inner.get(&id).await.unwrap().is_open());
        assert_eq!(messages.list_by_session(&id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn visitor_message_reopens_closed_session() {
        let f = fixture(CoordinatorOptions::default());
        let first = f.coordinator.handle_visitor_action(first_contact("hi")).await.unwrap();
        let id = *first.session.id();
        f.sessions.close(&id, &owner()).await.unwrap();

        let result = f
            .coordinator
            .handle_visitor_action(VisitorActionCommand::text(grant(1), id, "back again"))
            .await
            .unwrap();

        assert!(result.session.is_open());
        assert!(f.sessions.get(&id).await.unwrap().is_open());
    }

    #[tokio::test]
    async fn operator_message_does_not_reopen() {
        let f = fixture(CoordinatorOptions::default());
        let first = f.coordinator.handle_visitor_action(first_contact("hi")).await.unwrap();
        let id = *first.session.id();
        f.sessions.close(&id, &owner()).await.unwrap();

        let stored = f
            .coordinator
            .handle_operator_action(OperatorActionCommand {
                identity: owner(),
                session_id: id,
                content: Some("We are closed".to_string()),
                attachment_ref: None,
            })
            .await
            .unwrap();

        assert_eq!(stored.sender_type, SenderType::Operator);
        assert_eq!(stored.sender_id, Some(OperatorId::new(10)));
        assert!(stored.is_read);
        assert!(!f.sessions.get(&id).await.unwrap().is_open());
    }

    #[tokio::test]
    async fn operator_access_is_checked() {
        let f = fixture(CoordinatorOptions::default());
        let first = f.coordinator.handle_visitor_action(first_contact("hi")).await.unwrap();
        let id = *first.session.id();
        let reply = |identity: OperatorIdentity| OperatorActionCommand {
            identity,
            session_id: id,
            content: Some("hello".to_string()),
            attachment_ref: None,
        };

        let colleague =
            OperatorIdentity::new(OperatorId::new(11), CompanyId::new(1), OperatorRole::Operator);
        let foreign =
            OperatorIdentity::new(OperatorId::new(12), CompanyId::new(2), OperatorRole::Admin);
        let admin = OperatorIdentity::new(OperatorId::new(13), CompanyId::new(1), OperatorRole::Admin);

        assert!(matches!(
            f.coordinator.handle_operator_action(reply(colleague)).await,
            Err(ChatError::Forbidden(_))
        ));
        assert!(matches!(
            f.coordinator.handle_operator_action(reply(foreign)).await,
            Err(ChatError::NotFound(_))
        ));
        assert!(f.coordinator.handle_operator_action(reply(admin)).await.is_ok());
    }

    #[tokio::test]
    async fn visitor_cannot_write_into_another_company() {
        let f = fixture(CoordinatorOptions::default());
        let first = f.coordinator.handle_visitor_action(first_contact("hi")).await.unwrap();

        let err = f
            .coordinator
            .handle_visitor_action(VisitorActionCommand::text(grant(2), *first.session.id(), "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::NotFound(_)));
    }

    #[tokio::test]
    async fn option_click_stores_label_and_bot_reply() {
        let f = fixture(CoordinatorOptions::default());
        let option = save_option(&f, BotAction::Link, Some("See our docs"), Some("https://x/y")).await;
        let mut cmd = first_contact("");
        cmd.content = None;
        cmd.bot_option_id = Some(option);

        let result = f.coordinator.handle_visitor_action(cmd).await.unwrap();

        assert_eq!(result.visitor_message.content.as_deref(), Some("Docs"));
        let reply = result.bot_reply.unwrap();
        assert_eq!(reply.sender_type, SenderType::System);
        assert_eq!(reply.content.as_deref(), Some("See our docs\nhttps://x/y"));
        assert!(reply.is_read);

        let log = f.messages.list_by_session(result.session.id()).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(f.broadcaster.sent().len(), 2);
    }

    #[tokio::test]
    async fn handoff_option_sets_flag_only_when_switched_on() {
        for switch in [false, true] {
            let f = fixture(CoordinatorOptions {
                handoff_option_requests_handoff: switch,
            });
            let option = save_option(&f, BotAction::Handoff, None, None).await;
            let mut cmd = first_contact("I need a human");
            cmd.bot_option_id = Some(option);

            let result = f.coordinator.handle_visitor_action(cmd).await.unwrap();

            assert_eq!(
                result.bot_reply.unwrap().content.as_deref(),
                Some(crate::domain::bot::HANDOFF_REPLY_TEXT)
            );
            let stored = f.sessions.get(result.session.id()).await.unwrap();
            assert_eq!(stored.handoff_requested(), switch);
        }
    }

    #[tokio::test]
    async fn handoff_request_respects_tenant() {
        let f = fixture(CoordinatorOptions::default());
        let first = f.coordinator.handle_visitor_action(first_contact("hi")).await.unwrap();
        let id = *first.session.id();

        let foreign = f
            .coordinator
            .request_handoff(&id, &Actor::Visitor(grant(2)))
            .await
            .unwrap_err();
        assert!(matches!(foreign, ChatError::NotFound(_)));

        let flagged = f
            .coordinator
            .request_handoff(&id, &Actor::Visitor(grant(1)))
            .await
            .unwrap();
        let at = flagged.handoff_requested_at().copied();
        assert!(flagged.handoff_requested());

        let again = f
            .coordinator
            .request_handoff(&id, &Actor::Operator(owner()))
            .await
            .unwrap();
        assert_eq!(again.handoff_requested_at().copied(), at);
    }
}
