//! HTTP DTOs for widget endpoints.

use serde::{Deserialize, Serialize};

use crate::adapters::http::bot::BotOptionResponse;
use crate::application::handlers::bot::WidgetBotView;

/// The widget announces its visitor.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenSessionRequest {
    pub visitor_identifier: String,
    #[serde(default)]
    pub visitor_name: Option<String>,
}

/// What the widget renders from the bot.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetBotResponse {
    pub enabled: bool,
    pub welcome_message: Option<String>,
    pub options: Vec<BotOptionResponse>,
}

impl From<&WidgetBotView> for WidgetBotResponse {
    fn from(view: &WidgetBotView) -> Self {
        Self {
            enabled: view.enabled,
            welcome_message: view.welcome_message.clone(),
            options: view.options.iter().map(Into::into).collect(),
        }
    }
}
