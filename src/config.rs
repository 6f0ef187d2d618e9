//! Wallet configuration
//!
//! Carries the account directory and the account/permission/algorithm
//! selection for one invocation. Passed explicitly to every operation that
//! needs it.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::crypto::Algorithm;

/// Name of the per-user account directory under the home directory
pub const ACCOUNT_DIR_NAME: &str = ".chain_wallet";

/// Permission used for signing when none is given
pub const DEFAULT_PERMISSION: &str = "active";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine the home directory")]
    NoHomeDir,
    #[error("Please provide the account name")]
    MissingAccountName,
}

/// Wallet configuration
#[derive(Debug, Clone)]
pub struct WalletConfig {
    pub account_dir: PathBuf,
    pub account_name: Option<String>,
    pub sign_permission: String,
    pub sign_algorithm: Algorithm,
}

impl WalletConfig {
    /// Create a configuration rooted at `account_dir`
    pub fn new(account_dir: impl Into<PathBuf>) -> Self {
        Self {
            account_dir: account_dir.into(),
            account_name: None,
            sign_permission: DEFAULT_PERMISSION.to_string(),
            sign_algorithm: Algorithm::Ed25519,
        }
    }

    /// Create a configuration using `~/.chain_wallet`
    pub fn from_home() -> Result<Self, ConfigError> {
        Ok(Self::new(default_account_dir()?))
    }

    /// Set the selected account
    pub fn with_account(mut self, name: &str) -> Self {
        self.account_name = Some(name.to_string());
        self
    }

    /// Set the permission used for signing
    pub fn with_permission(mut self, permission: &str) -> Self {
        self.sign_permission = permission.to_string();
        self
    }

    /// Set the algorithm used for key files
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.sign_algorithm = algorithm;
        self
    }

    pub fn account_dir(&self) -> &Path {
        &self.account_dir
    }

    /// The selected account name, or an error if none was given
    pub fn require_account_name(&self) -> Result<&str, ConfigError> {
        match self.account_name.as_deref() {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(ConfigError::MissingAccountName),
        }
    }
}

/// Deterministic per-user account directory
pub fn default_account_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(ACCOUNT_DIR_NAME))
        .ok_or(ConfigError::NoHomeDir)
}
