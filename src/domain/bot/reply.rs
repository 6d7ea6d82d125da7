//! Synthetic replies produced by bot options.

use super::{BotAction, BotOption};

pub const DEFAULT_REPLY_TEXT: &str = "Thank you for your message.";
pub const DEFAULT_LINK_INTRO: &str = "Please see the following link:";
pub const HANDOFF_REPLY_TEXT: &str = "An operator will join shortly.";

/// System message the bot posts in answer to an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticReply {
    pub content: String,
    pub action: BotAction,
}

impl SyntheticReply {
    /// Composes the reply for an option.
    pub fn for_option(option: &BotOption) -> Self {
        let reply_text = option
            .reply_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        let content = match option.action {
            BotAction::Reply => reply_text.unwrap_or(DEFAULT_REPLY_TEXT).to_string(),
            BotAction::Link => {
                let url = option
                    .link_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty());
                match (reply_text, url) {
                    (Some(text), Some(url)) => format!("{}\n{}", text, url),
                    (None, Some(url)) => format!("{}\n{}", DEFAULT_LINK_INTRO, url),
                    (Some(text), None) => text.to_string(),
                    (None, None) => DEFAULT_LINK_INTRO.to_string(),
                }
            }
            BotAction::Handoff => HANDOFF_REPLY_TEXT.to_string(),
        };

        Self {
            content,
            action: option.action,
        }
    }

    pub fn is_handoff(&self) -> bool {
        self.action == BotAction::Handoff
    }
}
