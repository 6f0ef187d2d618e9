//! Account store
//!
//! Entry point for everything that touches the account directory. All
//! selections (account, permission, algorithm) come from the
//! [`WalletConfig`] the store was built with.

use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;

use super::account::{Account, AccountError};
use super::keystore::KeystoreFile;
use super::persistence::{
    check_account_name, key_file_path, keystore_path, load_key_file, save_key_pair,
};
use super::resolver::{resolve_account, ResolveRequest};
use crate::config::{ConfigError, WalletConfig};
use crate::crypto::{Algorithm, KeyPair};

/// Account storage rooted at the configured directory
pub struct AccountStore {
    config: WalletConfig,
}

impl AccountStore {
    /// Create a new account store
    pub fn new(config: WalletConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Resolve an account by name
    ///
    /// A plain key file account comes back with a single permission, the
    /// configured signing permission.
    pub fn resolve(&self, name: &str, require_decryptable: bool) -> Result<Account, AccountError> {
        resolve_account(&ResolveRequest {
            account_dir: &self.config.account_dir,
            name,
            permission: &self.config.sign_permission,
            require_decryptable,
        })
    }

    /// Store a key pair as plain key files
    pub fn save_key_pair(&self, name: &str, key_pair: &KeyPair) -> Result<PathBuf, AccountError> {
        save_key_pair(&self.config.account_dir, name, key_pair)
    }

    /// Store every permission of an account in a consolidated keystore
    pub fn save_keystore(&self, account: &Account) -> Result<PathBuf, AccountError> {
        check_account_name(&account.name)?;
        let path = keystore_path(&self.config.account_dir, &account.name);
        KeystoreFile::from_account(account).save(&path)?;
        log::info!("Keystore of {} saved at {}", account.name, path.display());
        Ok(path)
    }

    /// Load the plain key file of `name` for the configured algorithm
    pub fn load_key_pair(&self, name: &str) -> Result<KeyPair, AccountError> {
        if name.is_empty() {
            return Err(ConfigError::MissingAccountName.into());
        }
        check_account_name(name)?;
        let path = key_file_path(
            &self.config.account_dir,
            name,
            self.config.sign_algorithm,
        );
        load_key_file(&path, self.config.sign_algorithm)
    }

    /// Key pair of the configured account and permission, ready for signing
    pub fn load_active_key(&self) -> Result<KeyPair, AccountError> {
        let name = self.config.require_account_name()?;
        let account = self.resolve(name, true)?;
        account
            .key_pair(&self.config.sign_permission)
            .map(KeyPair::clone)
    }

    /// Names of all accounts in the directory, sorted
    pub fn list_accounts(&self) -> Result<Vec<String>, AccountError> {
        let dir = &self.config.account_dir;
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(AccountError::io(dir)(e)),
        };

        let mut names = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(AccountError::io(dir))?;
            if !entry.path().is_file() {
                continue;
            }
            let file_name = entry.file_name();
            if let Some(name) = account_name_from_file(&file_name.to_string_lossy()) {
                names.insert(name.to_string());
            }
        }

        Ok(names.into_iter().collect())
    }
}

/// Account name encoded in a keystore or private key file name
fn account_name_from_file(file_name: &str) -> Option<&str> {
    if let Some(name) = file_name.strip_suffix(".json") {
        return Some(name).filter(|n| !n.is_empty());
    }
    Algorithm::ALL
        .iter()
        .find_map(|algo| file_name.strip_suffix(&format!("_{}", algo.name())))
        .filter(|n| !n.is_empty())
}
