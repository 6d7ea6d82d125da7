//! Bot domain module - per-company auto-reply options.
//!
//! Pure types and reply composition; loading configurations and deciding
//! when to answer lives in the application layer.

mod configuration;
mod reply;

pub use configuration::{
    BotAction, BotConfiguration, BotConfigurationUpdate, BotOption, BotOptionDraft, MAX_LABEL_LENGTH,
};
pub use reply::{SyntheticReply, DEFAULT_LINK_INTRO, DEFAULT_REPLY_TEXT, HANDOFF_REPLY_TEXT};
