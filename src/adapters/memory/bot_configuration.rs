//! In-memory bot configuration repository.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::bot::{BotConfiguration, BotConfigurationUpdate};
use crate::domain::foundation::{BotOptionId, CompanyId, DomainError};
use crate::ports::BotConfigurationRepository;

#[derive(Debug, Default)]
struct BotState {
    configs: HashMap<CompanyId, BotConfiguration>,
    next_option_id: i64,
}

/// In-memory per-company bot configurations.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBotConfigurationRepository {
    state: Arc<RwLock<BotState>>,
}

impl InMemoryBotConfigurationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BotConfigurationRepository for InMemoryBotConfigurationRepository {
    async fn find_by_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<BotConfiguration>, DomainError> {
        Ok(self.state.read().await.configs.get(&company_id).cloned())
    }

    async fn save(&self, update: &BotConfigurationUpdate) -> Result<BotConfiguration, DomainError> {
        let mut state = self.state.write().await;

        let existing: HashSet<BotOptionId> = state
            .configs
            .get(&update.company_id)
            .map(|c| c.options.iter().map(|o| o.id).collect())
            .unwrap_or_default();

        let mut options = Vec::with_capacity(update.options.len());
        for draft in &update.options {
            let id = match draft.id {
                Some(id) if existing.contains(&id) => id,
                _ => {
                    state.next_option_id += 1;
                    BotOptionId::new(state.next_option_id)
                }
            };
            options.push(draft.clone().into_option(id));
        }

        let config = BotConfiguration {
            company_id: update.company_id,
            enabled: update.enabled,
            welcome_message: update
                .welcome_message
                .as_deref()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string),
            options,
        };
        state.configs.insert(update.company_id, config.clone());
        Ok(config)
    }
}
