//! UpdateBotConfigurationHandler - Command handler replacing a company's bot setup.

use std::sync::Arc;

use crate::domain::bot::{BotConfiguration, BotConfigurationUpdate, BotOptionDraft};
use crate::domain::conversation::ChatError;
use crate::domain::tenant::OperatorIdentity;
use crate::ports::BotConfigurationRepository;

/// Command to replace the caller's bot configuration.
#[derive(Debug, Clone)]
pub struct UpdateBotConfigurationCommand {
    pub enabled: bool,
    pub welcome_message: Option<String>,
    pub options: Vec<BotOptionDraft>,
}

/// Handler for bot configuration updates. Admins only.
pub struct UpdateBotConfigurationHandler {
    repository: Arc<dyn BotConfigurationRepository>,
}

impl UpdateBotConfigurationHandler {
    pub fn new(repository: Arc<dyn BotConfigurationRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        identity: &OperatorIdentity,
        cmd: UpdateBotConfigurationCommand,
    ) -> Result<BotConfiguration, ChatError> {
        if !identity.is_admin() {
            return Err(ChatError::forbidden(
                "Only admins may change the bot configuration",
            ));
        }

        let update = BotConfigurationUpdate {
            company_id: identity.company_id,
            enabled: cmd.enabled,
            welcome_message: cmd.welcome_message,
            options: cmd.options,
        };
        update.validate()?;

        let saved = self.repository.save(&update).await?;
        tracing::info!(
            company_id = %identity.company_id,
            enabled = saved.enabled,
            options = saved.options.len(),
            "Bot configuration updated"
        );
        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryBotConfigurationRepository;
    use crate::domain::bot::BotAction;
    use crate::domain::foundation::{CompanyId, OperatorId, OperatorRole};

    fn identity(role: OperatorRole) -> OperatorIdentity {
        OperatorIdentity::new(OperatorId::new(1), CompanyId::new(3), role)
    }

    fn command(label: &str) -> UpdateBotConfigurationCommand {
        UpdateBotConfigurationCommand {
            enabled: true,
            welcome_message: Some("Welcome".to_string()),
            options: vec![BotOptionDraft {
                id: None,
                label: label.to_string(),
                action: BotAction::Handoff,
                reply_text: None,
                link_url: None,
                sort_order: 1,
                is_active: true,
            }],
        }
    }

    #[tokio::test]
    async fn admin_replaces_configuration() {
        let repo = Arc::new(InMemoryBotConfigurationRepository::new());
        let handler = UpdateBotConfigurationHandler::new(repo.clone());

        let saved = handler
            .handle(&identity(OperatorRole::Admin), command("Talk to a human"))
            .await
            .unwrap();

        assert_eq!(saved.company_id, CompanyId::new(3));
        assert_eq!(saved.options.len(), 1);
        assert_eq!(
            repo.find_by_company(CompanyId::new(3)).await.unwrap(),
            Some(saved)
        );
    }

    #[tokio::test]
    async fn operator_is_forbidden() {
        let handler =
            UpdateBotConfigurationHandler::new(Arc::new(InMemoryBotConfigurationRepository::new()));

        let err = handler
            .handle(&identity(OperatorRole::Operator), command("Hi"))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::Forbidden(_)));
    }

    #[tokio::test]
    async fn blank_label_is_invalid() {
        let handler =
            UpdateBotConfigurationHandler::new(Arc::new(InMemoryBotConfigurationRepository::new()));

        let err = handler
            .handle(&identity(OperatorRole::Admin), command("  "))
            .await
            .unwrap_err();

        assert!(matches!(err, ChatError::InvalidArgument { ref field, .. } if field == "label"));
    }
}
