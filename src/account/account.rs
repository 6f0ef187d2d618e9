//! Accounts and their per-permission key material

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::ConfigError;
use crate::crypto::{KeyError, KeyPair};

/// Account storage errors
#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Account {name} not found in {}", dir.display())]
    AccountNotFound { name: String, dir: PathBuf },
    #[error("Key for {name}@{permission} is encrypted and must be decrypted first")]
    DecryptionRequired { name: String, permission: String },
    #[error("Invalid permission {permission} for account {name}")]
    PermissionNotFound { name: String, permission: String },
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid keystore {}: {reason}", path.display())]
    InvalidKeystore { path: PathBuf, reason: String },
    #[error("Invalid key file {}: {source}", path.display())]
    InvalidKeyFile {
        path: PathBuf,
        #[source]
        source: KeyError,
    },
    #[error("Invalid account name {name:?}: must not contain path separators or '..'")]
    InvalidAccountName { name: String },
    #[error("Refusing to store the encrypted key of {name} as a plain key file")]
    EncryptedKey { name: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl AccountError {
    pub(crate) fn io(path: &Path) -> impl FnOnce(io::Error) -> AccountError + '_ {
        move |source| AccountError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A named account with one key pair per permission
#[derive(Debug, Clone)]
pub struct Account {
    pub name: String,
    pub keypairs: BTreeMap<String, KeyPair>,
}

impl Account {
    /// Create an account without any keys
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            keypairs: BTreeMap::new(),
        }
    }

    /// Create an account holding a single permission
    pub fn single(name: &str, permission: &str, key_pair: KeyPair) -> Self {
        let mut account = Self::new(name);
        account.insert(permission, key_pair);
        account
    }

    /// Add or replace the key pair of a permission
    pub fn insert(&mut self, permission: &str, key_pair: KeyPair) -> Option<KeyPair> {
        self.keypairs.insert(permission.to_string(), key_pair)
    }

    /// Look up the key pair of a permission
    pub fn key_pair(&self, permission: &str) -> Result<&KeyPair, AccountError> {
        self.keypairs
            .get(permission)
            .ok_or_else(|| AccountError::PermissionNotFound {
                name: self.name.clone(),
                permission: permission.to_string(),
            })
    }

    /// Permission names, sorted
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.keypairs.keys().map(String::as_str)
    }

    /// True when every key pair can be used without decryption
    pub fn is_decrypted(&self) -> bool {
        self.keypairs.values().all(|kp| !kp.encrypted)
    }
}
