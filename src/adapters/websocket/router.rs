//! Connection groups for real-time message routing.
//!
//! Every connection owns a bounded outbound queue. Connections are grouped
//! by session and, for operators, by company:
//!
//! ```text
//! Session: 4f1c…          Operators: company 7
//! ├── visitor-a           ├── operator-x
//! └── operator-x          └── operator-y
//! ```
//!
//! A message for a session in company 7 reaches visitor-a, operator-x and
//! operator-y, each exactly once.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::domain::foundation::{CompanyId, SessionId};
use crate::domain::message::Message;
use crate::ports::MessageBroadcaster;

use super::messages::{ParticipantRole, ServerMessage};

/// Default size of each connection's outbound queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Unique identifier for a WebSocket connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A broadcast group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Group {
    /// Everyone watching one session.
    Session(SessionId),
    /// Every operator connection of one company.
    Operators(CompanyId),
}

#[derive(Default)]
struct RouterState {
    connections: HashMap<ConnectionId, mpsc::Sender<ServerMessage>>,
    groups: HashMap<Group, HashSet<ConnectionId>>,
    memberships: HashMap<ConnectionId, HashSet<Group>>,
}

impl RouterState {
    fn add_member(&mut self, connection_id: ConnectionId, group: Group) {
        self.groups.entry(group).or_default().insert(connection_id);
        self.memberships
            .entry(connection_id)
            .or_default()
            .insert(group);
    }
}

/// Routes server messages to connection groups.
///
/// Membership lives only as long as the connection; clients join their
/// sessions again after reconnecting. Delivery never waits: when a
/// connection's queue is full the event is dropped for that connection.
pub struct RealtimeRouter {
    state: RwLock<RouterState>,
    queue_capacity: usize,
}

impl RealtimeRouter {
    /// Create a router whose connections buffer up to `queue_capacity` events.
    pub fn new(queue_capacity: usize) -> Self {
        Self {
            state: RwLock::new(RouterState::default()),
            queue_capacity: queue_capacity.max(1),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }

    /// Register a connection. The receiver yields everything routed to it.
    pub async fn register(&self) -> (ConnectionId, mpsc::Receiver<ServerMessage>) {
        let connection_id = ConnectionId::new();
        let (tx, rx) = mpsc::channel(self.queue_capacity);
        self.state.write().await.connections.insert(connection_id, tx);
        (connection_id, rx)
    }

    /// Drop a connection and all of its group memberships.
    pub async fn unregister(&self, connection_id: &ConnectionId) {
        let mut state = self.state.write().await;
        state.connections.remove(connection_id);

        if let Some(groups) = state.memberships.remove(connection_id) {
            for group in groups {
                let now_empty = match state.groups.get_mut(&group) {
                    Some(members) => {
                        members.remove(connection_id);
                        members.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    state.groups.remove(&group);
                }
            }
        }
    }

    /// Add a connection to a session group.
    ///
    /// Operators also join their company's operator group. Unknown
    /// connections are ignored.
    pub async fn join_session(
        &self,
        connection_id: &ConnectionId,
        session_id: SessionId,
        role: ParticipantRole,
        company_id: CompanyId,
    ) {
        let mut state = self.state.write().await;
        if !state.connections.contains_key(connection_id) {
            tracing::debug!(connection_id = %connection_id, "Join for unknown connection ignored");
            return;
        }

        state.add_member(*connection_id, Group::Session(session_id));
        if role == ParticipantRole::Operator {
            state.add_member(*connection_id, Group::Operators(company_id));
        }
    }

    /// Deliver to the union of the session group and the company's operator
    /// group, once per connection.
    ///
    /// Returns the number of connections the message was queued for.
    pub async fn broadcast(
        &self,
        session_id: SessionId,
        company_id: CompanyId,
        message: ServerMessage,
    ) -> usize {
        let state = self.state.read().await;

        let recipients: HashSet<&ConnectionId> = [
            Group::Session(session_id),
            Group::Operators(company_id),
        ]
        .iter()
        .filter_map(|group| state.groups.get(group))
        .flatten()
        .collect();

        let mut delivered = 0;
        for connection_id in recipients {
            let Some(sender) = state.connections.get(connection_id) else {
                continue;
            };
            match sender.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        session_id = %session_id,
                        "Outbound queue full, dropping event"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Connection already closed");
                }
            }
        }
        delivered
    }

    /// Queue a message for a single connection. Returns false if it was dropped.
    pub async fn send_to(&self, connection_id: &ConnectionId, message: ServerMessage) -> bool {
        let state = self.state.read().await;
        state
            .connections
            .get(connection_id)
            .is_some_and(|sender| sender.try_send(message).is_ok())
    }

    /// Number of connections in a group (0 if the group doesn't exist).
    pub async fn group_size(&self, group: &Group) -> usize {
        self.state
            .read()
            .await
            .groups
            .get(group)
            .map_or(0, HashSet::len)
    }

    /// Total number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }
}

impl Default for RealtimeRouter {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl MessageBroadcaster for RealtimeRouter {
    async fn broadcast_message(&self, company_id: CompanyId, message: &Message) -> usize {
        self.broadcast(
            message.session_id,
            company_id,
            ServerMessage::NewMessage(message.into()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company() -> CompanyId {
        CompanyId::new(7)
    }

    fn drain(rx: &mut mpsc::Receiver<ServerMessage>) -> usize {
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    #[tokio::test]
    async fn register_and_unregister_track_connections() {
        let router = RealtimeRouter::default();
        let (id, _rx) = router.register().await;
        assert_eq!(router.connection_count().await, 1);

        router.unregister(&id).await;
        assert_eq!(router.connection_count().await, 0);
    }

    #[tokio::test]
    async fn unregister_discards_memberships() {
        let router = RealtimeRouter::default();
        let session = SessionId::new();
        let (id, _rx) = router.register().await;
        router
            .join_session(&id, session, ParticipantRole::Operator, company())
            .await;

        router.unregister(&id).await;

        assert_eq!(router.group_size(&Group::Session(session)).await, 0);
        assert_eq!(router.group_size(&Group::Operators(company())).await, 0);
    }

    #[tokio::test]
    async fn visitors_do_not_join_the_operator_group() {
        let router = RealtimeRouter::default();
        let (id, _rx) = router.register().await;
        router
            .join_session(&id, SessionId::new(), ParticipantRole::Visitor, company())
            .await;

        assert_eq!(router.group_size(&Group::Operators(company())).await, 0);
    }

    #[tokio::test]
    async fn join_for_unknown_connection_is_ignored() {
        let router = RealtimeRouter::default();
        let session = SessionId::new();
        router
            .join_session(&ConnectionId::new(), session, ParticipantRole::Visitor, company())
            .await;
        assert_eq!(router.group_size(&Group::Session(session)).await, 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_union_exactly_once() {
        let router = RealtimeRouter::default();
        let session = SessionId::new();
        let other_session = SessionId::new();

        let (visitor, mut visitor_rx) = router.register().await;
        let (operator, mut operator_rx) = router.register().await;
        let (watcher, mut watcher_rx) = router.register().await;

        router
            .join_session(&visitor, session, ParticipantRole::Visitor, company())
            .await;
        // in both the session group and the operator group
        router
            .join_session(&operator, session, ParticipantRole::Operator, company())
            .await;
        router
            .join_session(&watcher, other_session, ParticipantRole::Operator, company())
            .await;

        let delivered = router
            .broadcast(session, company(), ServerMessage::pong())
            .await;

        assert_eq!(delivered, 3);
        assert_eq!(drain(&mut visitor_rx), 1);
        assert_eq!(drain(&mut operator_rx), 1);
        assert_eq!(drain(&mut watcher_rx), 1);
    }

    #[tokio::test]
    async fn broadcast_stays_within_company() {
        let router = RealtimeRouter::default();
        let (foreign, mut foreign_rx) = router.register().await;
        router
            .join_session(
                &foreign,
                SessionId::new(),
                ParticipantRole::Operator,
                CompanyId::new(99),
            )
            .await;

        let delivered = router
            .broadcast(SessionId::new(), company(), ServerMessage::pong())
            .await;

        assert_eq!(delivered, 0);
        assert_eq!(drain(&mut foreign_rx), 0);
    }

    #[tokio::test]
    async fn full_queue_drops_without_blocking() {
        let router = RealtimeRouter::new(1);
        let session = SessionId::new();
        let (id, mut rx) = router.register().await;
        router
            .join_session(&id, session, ParticipantRole::Visitor, company())
            .await;

        assert_eq!(router.broadcast(session, company(), ServerMessage::pong()).await, 1);
        assert_eq!(router.broadcast(session, company(), ServerMessage::pong()).await, 0);
        assert_eq!(drain(&mut rx), 1);
    }

    #[tokio::test]
    async fn send_to_reaches_only_that_connection() {
        let router = RealtimeRouter::default();
        let (a, mut a_rx) = router.register().await;
        let (_b, mut b_rx) = router.register().await;

        assert!(router.send_to(&a, ServerMessage::pong()).await);
        assert!(!router.send_to(&ConnectionId::new(), ServerMessage::pong()).await);

        assert_eq!(drain(&mut a_rx), 1);
        assert_eq!(drain(&mut b_rx), 0);
    }

    #[test]
    fn connection_id_display_is_uuid() {
        assert_eq!(ConnectionId::new().to_string().len(), 36);
    }
}
