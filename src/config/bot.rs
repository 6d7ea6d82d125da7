//! Bot behaviour switches

use serde::Deserialize;

use crate::application::handlers::conversation::CoordinatorOptions;

/// Bot configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotConfig {
    /// Whether clicking a `handoff` option also flags the session for a
    /// human operator. Off by default: the option only answers.
    #[serde(default)]
    pub handoff_option_requests_handoff: bool,
}

impl BotConfig {
    pub fn coordinator_options(&self) -> CoordinatorOptions {
        CoordinatorOptions {
            handoff_option_requests_handoff: self.handoff_option_requests_handoff,
        }
    }
}
