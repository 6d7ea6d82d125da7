//! GetBotConfigurationHandler - Query handler for a company's bot setup.

use std::sync::Arc;

use crate::domain::bot::BotConfiguration;
use crate::domain::conversation::ChatError;
use crate::domain::tenant::OperatorIdentity;
use crate::ports::BotConfigurationRepository;

/// Handler for reading the caller's bot configuration.
pub struct GetBotConfigurationHandler {
    repository: Arc<dyn BotConfigurationRepository>,
}

impl GetBotConfigurationHandler {
    pub fn new(repository: Arc<dyn BotConfigurationRepository>) -> Self {
        Self { repository }
    }

    /// Configuration of the operator's company; a disabled, empty one if
    /// the company never saved any.
    pub async fn handle(&self, identity: &OperatorIdentity) -> Result<BotConfiguration, ChatError> {
        Ok(self
            .repository
            .find_by_company(identity.company_id)
            .await?
            .unwrap_or_else(|| BotConfiguration::disabled(identity.company_id)))
    }
}
