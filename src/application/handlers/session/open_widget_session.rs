//! OpenWidgetSessionHandler - the widget asks for its visitor's open session.

use std::sync::Arc;

use crate::domain::conversation::ChatError;
use crate::domain::session::ChatSession;
use crate::domain::tenant::AccessKeyGrant;
use crate::ports::SessionRegistry;

/// Command to find or create the visitor's open session.
#[derive(Debug, Clone)]
pub struct OpenWidgetSessionCommand {
    pub grant: AccessKeyGrant,
    pub visitor_identifier: String,
    pub visitor_name: Option<String>,
}

/// Handler returning the visitor's open session, owned by the key's issuer.
pub struct OpenWidgetSessionHandler {
    sessions: Arc<dyn SessionRegistry>,
}

impl OpenWidgetSessionHandler {
    pub fn new(sessions: Arc<dyn SessionRegistry>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, cmd: OpenWidgetSessionCommand) -> Result<ChatSession, ChatError> {
        Ok(self
            .sessions
            .ensure_open_session(
                &cmd.visitor_identifier,
                cmd.visitor_name.as_deref(),
                &cmd.grant.session_owner(),
            )
            .await?)
    }
}
