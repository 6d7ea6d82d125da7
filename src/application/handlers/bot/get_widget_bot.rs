//! GetWidgetBotHandler - what the visitor widget shows from the bot.

use std::sync::Arc;

use crate::domain::bot::BotOption;
use crate::domain::conversation::ChatError;
use crate::domain::tenant::AccessKeyGrant;
use crate::ports::BotConfigurationRepository;

/// Welcome text and active options of an enabled bot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetBotView {
    pub enabled: bool,
    pub welcome_message: Option<String>,
    pub options: Vec<BotOption>,
}

/// Handler for the widget's bot query.
pub struct GetWidgetBotHandler {
    repository: Arc<dyn BotConfigurationRepository>,
}

impl GetWidgetBotHandler {
    pub fn new(repository: Arc<dyn BotConfigurationRepository>) -> Self {
        Self { repository }
    }

    /// A disabled or unconfigured bot yields an empty view.
    pub async fn handle(&self, grant: &AccessKeyGrant) -> Result<WidgetBotView, ChatError> {
        let Some(config) = self
            .repository
            .find_by_company(grant.company_id)
            .await?
            .filter(|c| c.enabled)
        else {
            return Ok(WidgetBotView::default());
        };

        Ok(WidgetBotView {
            enabled: true,
            welcome_message: config.welcome_message.clone(),
            options: config.active_options().into_iter().cloned().collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryBotConfigurationRepository;
    use crate::domain::bot::{BotAction, BotConfigurationUpdate, BotOptionDraft};
    use crate::domain::foundation::{AccessKeyId, CompanyId, OperatorId};

    fn grant() -> AccessKeyGrant {
        AccessKeyGrant {
            key_id: AccessKeyId::new(1),
            company_id: CompanyId::new(4),
            issuing_operator: OperatorId::new(2),
        }
    }

    fn draft(label: &str, sort_order: i32, is_active: bool) -> BotOptionDraft {
        BotOptionDraft {
            id: None,
            label: label.to_string(),
            action: BotAction::Reply,
            reply_text: None,
            link_url: None,
            sort_order,
            is_active,
        }
    }

    async fn handler_with(enabled: bool) -> GetWidgetBotHandler {
        let repo = Arc::new(InMemoryBotConfigurationRepository::new());
        repo.save(&BotConfigurationUpdate {
            company_id: CompanyId::new(4),
            enabled,
            welcome_message: Some("Hello there".to_string()),
            options: vec![draft("Second", 2, true), draft("Hidden", 0, false), draft("First", 1, true)],
        })
        .await
        .unwrap();
        GetWidgetBotHandler::new(repo)
    }

    #[tokio::test]
    async fn enabled_bot_shows_active_options_in_order() {
        let view = handler_with(true).await.handle(&grant()).await.unwrap();

        assert!(view.enabled);
        assert_eq!(view.welcome_message.as_deref(), Some("Hello there"));
        let labels: Vec<&str> = view.options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["First", "Second"]);
    }

    #[tokio::test]
    async fn disabled_bot_shows_nothing() {
        let view = handler_with(false).await.handle(&grant()).await.unwrap();
        assert_eq!(view, WidgetBotView::default());
    }
}
