//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Commands (sends, close, bot updates) and queries (listings) have their
//! own handlers; the conversation coordinator covers the real-time paths.

pub mod handlers;

pub use handlers::{
    BotEngine, CloseSessionCommand, CloseSessionHandler, ConversationCoordinator,
    CoordinatorOptions, GetBotConfigurationHandler, GetWidgetBotHandler, ListMessagesHandler,
    ListMessagesQuery, ListSessionsHandler, ListSessionsQuery, OpenWidgetSessionCommand,
    OpenWidgetSessionHandler, OperatorActionCommand, SessionSummary,
    UpdateBotConfigurationCommand, UpdateBotConfigurationHandler, VisitorActionCommand,
    VisitorActionResult, WidgetBotView,
};
