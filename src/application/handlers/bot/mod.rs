//! Bot handlers: option evaluation and configuration queries/commands.

mod bot_engine;
mod get_bot_configuration;
mod get_widget_bot;
mod update_bot_configuration;

pub use bot_engine::BotEngine;
pub use get_bot_configuration::GetBotConfigurationHandler;
pub use get_widget_bot::{GetWidgetBotHandler, WidgetBotView};
pub use update_bot_configuration::{UpdateBotConfigurationCommand, UpdateBotConfigurationHandler};
