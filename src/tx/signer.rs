//! Co-signer declarations of the form `account@permission`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Signer declaration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignerError {
    #[error("Signer {0} should contain exactly one '@'")]
    InvalidSignerFormat(String),
}

/// A declared co-signer
///
/// Only the shape is checked; empty account or permission parts are
/// accepted here and rejected later by account resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SignerSpec {
    pub account: String,
    pub permission: String,
}

impl SignerSpec {
    pub fn new(account: &str, permission: &str) -> Self {
        Self {
            account: account.to_string(),
            permission: permission.to_string(),
        }
    }
}

impl FromStr for SignerSpec {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('@');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(account), Some(permission), None) => Ok(Self::new(account, permission)),
            _ => Err(SignerError::InvalidSignerFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for SignerSpec {
    type Error = SignerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SignerSpec> for String {
    fn from(spec: SignerSpec) -> Self {
        spec.to_string()
    }
}

impl fmt::Display for SignerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.account, self.permission)
    }
}

/// Check that every entry has the `account@permission` shape
pub fn validate_signers<S: AsRef<str>>(signers: &[S]) -> Result<(), SignerError> {
    for signer in signers {
        signer.as_ref().parse::<SignerSpec>()?;
    }
    Ok(())
}

/// Parse a list of signer literals, failing on the first malformed one
pub fn parse_signers<S: AsRef<str>>(signers: &[S]) -> Result<Vec<SignerSpec>, SignerError> {
    signers.iter().map(|s| s.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_signers() {
        assert!(validate_signers(&["alice@active"]).is_ok());
        assert!(validate_signers::<&str>(&[]).is_ok());
        assert_eq!(
            validate_signers(&["alice"]),
            Err(SignerError::InvalidSignerFormat("alice".to_string()))
        );
        assert_eq!(
            validate_signers(&["a@b@c"]),
            Err(SignerError::InvalidSignerFormat("a@b@c".to_string()))
        );
    }

    #[test]
    fn test_first_bad_entry_is_reported() {
        let signers = vec![
            "alice@active".to_string(),
            "bob".to_string(),
            "carol@@owner".to_string(),
        ];
        assert_eq!(
            validate_signers(&signers),
            Err(SignerError::InvalidSignerFormat("bob".to_string()))
        );
    }

    #[test]
    fn test_empty_parts_are_shape_valid() {
        let spec: SignerSpec = "@".parse().unwrap();
        assert_eq!(spec, SignerSpec::new("", ""));
        assert!(validate_signers(&["@active", "alice@"]).is_ok());
    }

    #[test]
    fn test_parse_and_display() {
        let specs = parse_signers(&["alice@active", "bob@owner"]).unwrap();
        assert_eq!(specs[1], SignerSpec::new("bob", "owner"));
        assert_eq!(specs[0].to_string(), "alice@active");
    }

    #[test]
    fn test_serde_as_string() {
        let spec = SignerSpec::new("alice", "active");
        let json = serde_json::to_string(&spec).unwrap();
        assert_eq!(json, "\"alice@active\"");

        let back: SignerSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);

        assert!(serde_json::from_str::<SignerSpec>("\"alice\"").is_err());
    }
}
