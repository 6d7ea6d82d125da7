//! HTTP DTOs for bot configuration endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::bot::{BotAction, BotConfiguration, BotOption, BotOptionDraft};
use crate::domain::foundation::BotOptionId;

/// One option in an update request.
#[derive(Debug, Clone, Deserialize)]
pub struct BotOptionRequest {
    /// Existing option id to keep; omitted for new options.
    #[serde(default)]
    pub id: Option<i64>,
    pub label: String,
    pub action: BotAction,
    #[serde(default)]
    pub reply_text: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl From<BotOptionRequest> for BotOptionDraft {
    fn from(req: BotOptionRequest) -> Self {
        Self {
            id: req.id.map(BotOptionId::new),
            label: req.label,
            action: req.action,
            reply_text: req.reply_text,
            link_url: req.link_url,
            sort_order: req.sort_order,
            is_active: req.is_active,
        }
    }
}

/// Full replacement of the caller's bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBotConfigurationRequest {
    pub enabled: bool,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub options: Vec<BotOptionRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BotOptionResponse {
    pub id: i64,
    pub label: String,
    pub action: BotAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl From<&BotOption> for BotOptionResponse {
    fn from(option: &BotOption) -> Self {
        Self {
            id: option.id.value(),
            label: option.label.clone(),
            action: option.action,
            reply_text: option.reply_text.clone(),
            link_url: option.link_url.clone(),
            sort_order: option.sort_order,
            is_active: option.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BotConfigurationResponse {
    pub enabled: bool,
    pub welcome_message: Option<String>,
    pub options: Vec<BotOptionResponse>,
}

impl From<&BotConfiguration> for BotConfigurationResponse {
    fn from(config: &BotConfiguration) -> Self {
        let mut options: Vec<&BotOption> = config.options.iter().collect();
        options.sort_by_key(|o| (o.sort_order, o.id));
        Self {
            enabled: config.enabled,
            welcome_message: config.welcome_message.clone(),
            options: options.into_iter().map(Into::into).collect(),
        }
    }
}
