//! Bot configuration repository port.

use async_trait::async_trait;

use crate::domain::bot::{BotConfiguration, BotConfigurationUpdate};
use crate::domain::foundation::{CompanyId, DomainError};

/// Persistence for per-company bot configurations.
#[async_trait]
pub trait BotConfigurationRepository: Send + Sync {
    /// Configuration of a company, `None` if it never saved one.
    async fn find_by_company(
        &self,
        company_id: CompanyId,
    ) -> Result<Option<BotConfiguration>, DomainError>;

    /// Replace a company's configuration and return what was stored.
    ///
    /// Drafts whose id names an existing option of the same company keep
    /// that id; other drafts get fresh ids. Options left out are removed.
    async fn save(&self, update: &BotConfigurationUpdate) -> Result<BotConfiguration, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bot_configuration_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn BotConfigurationRepository) {}
    }
}
