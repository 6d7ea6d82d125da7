//! WebSocket upgrade handler for live chat connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Authenticate with `?token=` (operator) or `?key=` (widget access key)
//! 2. Upgrade to WebSocket and register with the router
//! 3. Apply client frames until disconnect
//! 4. Unregister, dropping all group memberships

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::{IntoResponse, Response},
};
use futures::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;

use crate::adapters::http::middleware::{AuthRejection, AuthState};
use crate::application::handlers::conversation::{
    ConversationCoordinator, OperatorActionCommand, VisitorActionCommand, VisitorTarget,
};
use crate::domain::conversation::ChatError;
use crate::domain::tenant::Actor;
use crate::ports::SessionRegistry;

use super::messages::{
    ClientMessage, ConnectedMessage, JoinSessionFrame, OperatorMessageFrame, ParticipantRole,
    ServerMessage, VisitorMessageFrame,
};
use super::router::{ConnectionId, RealtimeRouter};

/// Default upper bound for a single inbound frame.
pub const DEFAULT_MAX_FRAME_BYTES: usize = 64 * 1024;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub router: Arc<RealtimeRouter>,
    pub coordinator: Arc<ConversationCoordinator>,
    pub sessions: Arc<dyn SessionRegistry>,
    pub auth: AuthState,
    pub max_frame_bytes: usize,
}

/// Credentials accepted on the upgrade request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectParams {
    pub token: Option<String>,
    pub key: Option<String>,
}

/// Handle WebSocket upgrade requests.
///
/// Route: `GET /ws?token=<bearer>` or `GET /ws?key=<access key>`
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<ConnectParams>,
    State(state): State<WebSocketState>,
) -> Response {
    let actor = match authenticate(&state.auth, &params).await {
        Ok(actor) => actor,
        Err(rejection) => return rejection.into_response(),
    };

    ws.max_message_size(state.max_frame_bytes)
        .on_upgrade(move |socket| handle_socket(socket, actor, state))
}

async fn authenticate(auth: &AuthState, params: &ConnectParams) -> Result<Actor, AuthRejection> {
    if let Some(token) = params.token.as_deref() {
        return Ok(Actor::Operator(auth.authenticate_operator(token).await?));
    }
    if let Some(key) = params.key.as_deref() {
        return Ok(Actor::Visitor(auth.authenticate_access_key(key).await?));
    }
    Err(AuthRejection::Unauthenticated)
}

/// Handle an established WebSocket connection.
async fn handle_socket(socket: WebSocket, actor: Actor, state: WebSocketState) {
    let (connection_id, mut outbound) = state.router.register().await;
    let (mut sender, mut receiver) = socket.split();

    tracing::debug!(
        connection_id = %connection_id,
        company_id = %actor.company_id(),
        operator = actor.is_operator(),
        "WebSocket connected"
    );

    let connected = ServerMessage::Connected(ConnectedMessage {
        connection_id: connection_id.to_string(),
        company_id: actor.company_id().value(),
    });
    if let Err(e) = send_message(&mut sender, &connected).await {
        tracing::debug!("Failed to send connected message: {}", e);
        state.router.unregister(&connection_id).await;
        return;
    }

    // Forward routed events to the client
    let mut send_task = tokio::spawn(async move {
        while let Some(message) = outbound.recv().await {
            if let Err(e) = send_message(&mut sender, &message).await {
                tracing::debug!(
                    connection_id = %connection_id,
                    "Send error, closing connection: {}",
                    e
                );
                break;
            }
        }
    });

    // Apply client frames
    let recv_state = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(result) = receiver.next().await {
            match result {
                Ok(WsMessage::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(message) => dispatch(&recv_state, connection_id, &actor, message).await,
                    Err(e) => {
                        tracing::debug!(connection_id = %connection_id, "Dropping malformed frame: {}", e);
                    }
                },
                Ok(WsMessage::Binary(_)) => {
                    tracing::warn!(connection_id = %connection_id, "Received unsupported binary message");
                }
                Ok(WsMessage::Ping(_)) | Ok(WsMessage::Pong(_)) => {}
                Ok(WsMessage::Close(_)) => {
                    tracing::debug!(connection_id = %connection_id, "Client sent close frame");
                    break;
                }
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, "Receive error: {}", e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.router.unregister(&connection_id).await;
    tracing::debug!(connection_id = %connection_id, "WebSocket disconnected");
}

/// Apply one client frame. Failures are logged and the frame is dropped.
pub async fn dispatch(
    state: &WebSocketState,
    connection_id: ConnectionId,
    actor: &Actor,
    message: ClientMessage,
) {
    let result = match message {
        ClientMessage::Ping => {
            state.router.send_to(&connection_id, ServerMessage::pong()).await;
            Ok(())
        }
        ClientMessage::JoinSession(frame) => join_session(state, connection_id, actor, frame).await,
        ClientMessage::VisitorMessage(frame) => {
            visitor_message(state, connection_id, actor, frame).await
        }
        ClientMessage::OperatorMessage(frame) => operator_message(state, actor, frame).await,
    };

    if let Err(err) = result {
        tracing::debug!(connection_id = %connection_id, error = %err, "Dropping event");
    }
}

async fn join_session(
    state: &WebSocketState,
    connection_id: ConnectionId,
    actor: &Actor,
    frame: JoinSessionFrame,
) -> Result<(), ChatError> {
    let session = state.sessions.get(&frame.session_id).await?;
    session.ensure_visible_to(actor)?;

    // access keys always speak for the visitor
    let role = match actor {
        Actor::Operator(_) => frame.role,
        Actor::Visitor(_) => ParticipantRole::Visitor,
    };

    state
        .router
        .join_session(&connection_id, frame.session_id, role, session.company_id())
        .await;
    Ok(())
}

async fn visitor_message(
    state: &WebSocketState,
    connection_id: ConnectionId,
    actor: &Actor,
    frame: VisitorMessageFrame,
) -> Result<(), ChatError> {
    let Actor::Visitor(grant) = actor else {
        return Err(ChatError::forbidden("visitor_message requires an access key"));
    };
    if !frame.has_payload() {
        return Err(ChatError::invalid_argument("content", "message is empty"));
    }

    let cmd = VisitorActionCommand {
        grant: *grant,
        session_id: frame.session_id,
        visitor_identifier: frame.visitor_identifier,
        visitor_name: frame.visitor_name,
        content: frame.content,
        attachment_ref: frame.attachment_ref,
        bot_option_id: frame.bot_option_id,
    };
    // rejected actions must not create a session
    let mut prepared = state.coordinator.prepare_visitor_action(cmd).await?;

    let first_contact = match prepared.target() {
        VisitorTarget::FirstContact { visitor_identifier } => Some(visitor_identifier.clone()),
        VisitorTarget::Session(_) => None,
    };
    if let Some(visitor_identifier) = first_contact {
        // join before anything is broadcast so the bot reply reaches the sender
        let session = state
            .sessions
            .ensure_open_session(
                &visitor_identifier,
                prepared.visitor_name(),
                &grant.session_owner(),
            )
            .await?;
        state
            .router
            .join_session(&connection_id, *session.id(), ParticipantRole::Visitor, grant.company_id)
            .await;
        prepared = prepared.into_session(*session.id());
    }

    state.coordinator.commit_visitor_action(prepared).await?;
    Ok(())
}

async fn operator_message(
    state: &WebSocketState,
    actor: &Actor,
    frame: OperatorMessageFrame,
) -> Result<(), ChatError> {
    let Actor::Operator(identity) = actor else {
        return Err(ChatError::forbidden("operator_message requires an operator token"));
    };

    let cmd = OperatorActionCommand {
        identity: *identity,
        session_id: frame.session_id,
        content: frame.content,
        attachment_ref: frame.attachment_ref,
    };
    state.coordinator.handle_operator_action(cmd).await?;
    Ok(())
}

/// Send a JSON message over the WebSocket.
async fn send_message(
    sender: &mut SplitSink<WebSocket, WsMessage>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(message) {
        Ok(json) => sender.send(WsMessage::Text(json)).await,
        Err(e) => {
            tracing::error!("Failed to serialize server message: {}", e);
            Ok(())
        }
    }
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router(state: WebSocketState) -> axum::Router {
    use axum::routing::get;

    axum::Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}
