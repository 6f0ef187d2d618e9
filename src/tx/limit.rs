//! Spending limits attached to restricted permissions
//!
//! Syntax: `token1:value1|token2:value2|...` where each value is a decimal
//! literal or `unlimited`. Values are validated but kept as written.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Value that lifts the limit of a token
pub const UNLIMITED: &str = "unlimited";

/// Amount limit parse errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LimitError {
    #[error("Invalid amount limit {0}: expected token:value")]
    InvalidLimitSyntax(String),
    #[error("Invalid amount limit {group}: {reason}")]
    InvalidLimitValue { group: String, reason: String },
}

/// Spending cap for one token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountLimit {
    pub token: String,
    pub value: String,
}

impl AmountLimit {
    pub fn new(token: &str, value: &str) -> Self {
        Self {
            token: token.to_string(),
            value: value.to_string(),
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.value == UNLIMITED
    }
}

/// Parse an amount limit string, preserving entry order
pub fn parse_amount_limits(limits: &str) -> Result<Vec<AmountLimit>, LimitError> {
    if limits.is_empty() {
        return Ok(Vec::new());
    }

    limits.split('|').map(parse_group).collect()
}

fn parse_group(group: &str) -> Result<AmountLimit, LimitError> {
    let parts: Vec<&str> = group.split(':').collect();
    let (token, value) = match parts.as_slice() {
        [token, value] => (*token, *value),
        _ => return Err(LimitError::InvalidLimitSyntax(group.to_string())),
    };

    if value != UNLIMITED {
        check_decimal(value).map_err(|reason| LimitError::InvalidLimitValue {
            group: group.to_string(),
            reason,
        })?;
    }

    Ok(AmountLimit::new(token, value))
}

fn check_decimal(value: &str) -> Result<(), String> {
    let number: f64 = value.parse().map_err(|e| format!("{}", e))?;
    if !number.is_finite() {
        return Err(format!("{} is not a finite number", value));
    }
    Ok(())
}
