//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod bot;
pub mod conversation;
pub mod session;

pub use bot::{
    BotEngine, GetBotConfigurationHandler, GetWidgetBotHandler, UpdateBotConfigurationCommand,
    UpdateBotConfigurationHandler, WidgetBotView,
};
pub use conversation::{
    ConversationCoordinator, CoordinatorOptions, OperatorActionCommand, VisitorActionCommand,
    VisitorActionResult,
};
pub use session::{
    CloseSessionCommand, CloseSessionHandler, ListMessagesHandler, ListMessagesQuery,
    ListSessionsHandler, ListSessionsQuery, OpenWidgetSessionCommand, OpenWidgetSessionHandler,
    SessionSummary,
};
