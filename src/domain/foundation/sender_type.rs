//! SenderType and OperatorRole enums.
//!
//! Both used to be stored as inconsistently-cased strings. Internally they are
//! plain enums; `as_str` is the single lowercase rendering used by storage and
//! the wire, and `FromStr` accepts any casing when reading old rows.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ValidationError;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    Visitor,
    Operator,
    System,
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::Visitor => "visitor",
            SenderType::Operator => "operator",
            SenderType::System => "system",
        }
    }
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SenderType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "visitor" => Ok(SenderType::Visitor),
            "operator" => Ok(SenderType::Operator),
            "system" => Ok(SenderType::System),
            other => Err(ValidationError::invalid_format(
                "sender_type",
                format!("unknown sender type '{}'", other),
            )),
        }
    }
}

/// Role of an operator within their company.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OperatorRole {
    Admin,
    #[default]
    Operator,
}

impl OperatorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorRole::Admin => "admin",
            OperatorRole::Operator => "operator",
        }
    }

    /// Admins act on every session of their company, not only their own.
    pub fn is_admin(&self) -> bool {
        matches!(self, OperatorRole::Admin)
    }
}

impl fmt::Display for OperatorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OperatorRole {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(OperatorRole::Admin),
            "operator" => Ok(OperatorRole::Operator),
            other => Err(ValidationError::invalid_format(
                "role",
                format!("unknown operator role '{}'", other),
            )),
        }
    }
}
