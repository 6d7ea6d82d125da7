//! BotEngine - picks the synthetic reply for a chosen bot option.

use std::sync::Arc;

use crate::domain::bot::{BotConfiguration, SyntheticReply};
use crate::domain::foundation::{BotOptionId, CompanyId, DomainError};
use crate::ports::BotConfigurationRepository;

/// Evaluates bot options against a company's stored configuration.
///
/// Options are always looked up inside the given company, so an id from
/// another company behaves like an unknown option.
#[derive(Clone)]
pub struct BotEngine {
    repository: Arc<dyn BotConfigurationRepository>,
}

impl BotEngine {
    pub fn new(repository: Arc<dyn BotConfigurationRepository>) -> Self {
        Self { repository }
    }

    /// Reply for a chosen option, if the bot answers it.
    ///
    /// Nothing is returned when the company has no configuration, the bot
    /// is disabled, or the option is unknown or inactive.
    pub async fn evaluate(
        &self,
        company_id: CompanyId,
        option_id: BotOptionId,
    ) -> Result<Option<SyntheticReply>, DomainError> {
        let Some(config) = self.enabled_configuration(company_id).await? else {
            return Ok(None);
        };

        let reply = config
            .find_active_option(option_id)
            .map(SyntheticReply::for_option);

        if reply.is_none() {
            tracing::debug!(
                company_id = %company_id,
                option_id = %option_id,
                "Bot option not available, no reply"
            );
        }
        Ok(reply)
    }

    /// Label of an active option, stored as the visitor's message when
    /// the visitor only clicked the option.
    pub async fn option_label(
        &self,
        company_id: CompanyId,
        option_id: BotOptionId,
    ) -> Result<Option<String>, DomainError> {
        Ok(self
            .enabled_configuration(company_id)
            .await?
            .and_then(|config| {
                config
                    .find_active_option(option_id)
                    .map(|option| option.label.clone())
            }))
    }

    async fn enabled_configuration(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<BotConfiguration>, DomainError> {
        Ok(self
            .repository
            .find_by_company(company_id)
            .await?
            .filter(|config| config.enabled))
    }
}
