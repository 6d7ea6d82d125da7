//! CloseSessionHandler - Command handler for closing a session.

use std::sync::Arc;

use crate::domain::conversation::ChatError;
use crate::domain::foundation::SessionId;
use crate::domain::session::ChatSession;
use crate::domain::tenant::OperatorIdentity;
use crate::ports::SessionRegistry;

/// Command to close a session.
#[derive(Debug, Clone)]
pub struct CloseSessionCommand {
    pub identity: OperatorIdentity,
    pub session_id: SessionId,
}

/// Handler for closing sessions. Closing twice is not an error.
pub struct CloseSessionHandler {
    sessions: Arc<dyn SessionRegistry>,
}

impl CloseSessionHandler {
    pub fn new(sessions: Arc<dyn SessionRegistry>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, cmd: CloseSessionCommand) -> Result<ChatSession, ChatError> {
        Ok(self.sessions.close(&cmd.session_id, &cmd.identity).await?)
    }
}
