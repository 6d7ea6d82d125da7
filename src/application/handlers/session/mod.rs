//! Session command and query handlers.

mod close_session;
mod list_messages;
mod list_sessions;
mod open_widget_session;

pub use close_session::{CloseSessionCommand, CloseSessionHandler};
pub use list_messages::{ListMessagesHandler, ListMessagesQuery};
pub use list_sessions::{ListSessionsHandler, ListSessionsQuery, SessionSummary};
pub use open_widget_session::{OpenWidgetSessionCommand, OpenWidgetSessionHandler};
