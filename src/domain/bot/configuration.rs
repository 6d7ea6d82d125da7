//! Bot configuration value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{BotOptionId, CompanyId, ValidationError};

/// Maximum length for option labels.
pub const MAX_LABEL_LENGTH: usize = 255;

/// What a bot option does when a visitor picks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotAction {
    Reply,
    Link,
    Handoff,
}

impl BotAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BotAction::Reply => "reply",
            BotAction::Link => "link",
            BotAction::Handoff => "handoff",
        }
    }
}

impl fmt::Display for BotAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BotAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reply" => Ok(BotAction::Reply),
            "link" => Ok(BotAction::Link),
            "handoff" => Ok(BotAction::Handoff),
            other => Err(ValidationError::invalid_format(
                "action",
                format!("unknown bot action '{}'", other),
            )),
        }
    }
}

/// A single choice offered to visitors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotOption {
    pub id: BotOptionId,
    pub label: String,
    pub action: BotAction,
    pub reply_text: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

/// Option as submitted by an administrator.
///
/// `id` is kept when it names an existing option of the same company so
/// widgets holding that id keep working; otherwise storage assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotOptionDraft {
    pub id: Option<BotOptionId>,
    pub label: String,
    pub action: BotAction,
    pub reply_text: Option<String>,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

impl BotOptionDraft {
    /// Checks the fields an administrator supplies.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let label = self.label.trim();
        if label.is_empty() {
            return Err(ValidationError::empty_field("label"));
        }
        let len = label.chars().count();
        if len > MAX_LABEL_LENGTH {
            return Err(ValidationError::too_long("label", MAX_LABEL_LENGTH, len));
        }
        if self.action == BotAction::Link
            && is_blank(self.reply_text.as_deref())
            && is_blank(self.link_url.as_deref())
        {
            return Err(ValidationError::empty_field("link_url"));
        }
        Ok(())
    }

    /// Stored option under the given id, with text fields trimmed.
    pub fn into_option(self, id: BotOptionId) -> BotOption {
        BotOption {
            id,
            label: self.label.trim().to_string(),
            action: self.action,
            reply_text: trimmed(self.reply_text),
            link_url: trimmed(self.link_url),
            sort_order: self.sort_order,
            is_active: self.is_active,
        }
    }
}

/// Full replacement of a company's bot configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfigurationUpdate {
    pub company_id: CompanyId,
    pub enabled: bool,
    pub welcome_message: Option<String>,
    pub options: Vec<BotOptionDraft>,
}

impl BotConfigurationUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.options.iter().try_for_each(BotOptionDraft::validate)
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A company's bot: on/off switch, welcome text and its options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfiguration {
    pub company_id: CompanyId,
    pub enabled: bool,
    pub welcome_message: Option<String>,
    pub options: Vec<BotOption>,
}

impl BotConfiguration {
    /// Configuration of a company that never set one up.
    pub fn disabled(company_id: CompanyId) -> Self {
        Self {
            company_id,
            enabled: false,
            welcome_message: None,
            options: Vec::new(),
        }
    }

    /// Active options in display order (sort order, then id).
    pub fn active_options(&self) -> Vec<&BotOption> {
        let mut options: Vec<&BotOption> = self.options.iter().filter(|o| o.is_active).collect();
        options.sort_by_key(|o| (o.sort_order, o.id));
        options
    }

    pub fn find_active_option(&self, option_id: BotOptionId) -> Option<&BotOption> {
        self.options
            .iter()
            .find(|o| o.id == option_id && o.is_active)
    }
}
