//! Account resolution
//!
//! Turns an account name into its key material by walking an ordered list
//! of strategies. Each strategy either resolves the account, reports that it
//! does not apply, or fails. The first strategy that resolves wins.

use std::path::Path;

use super::account::{Account, AccountError};
use super::keystore::KeystoreFile;
use super::persistence::{check_account_name, key_file_path, keystore_path, load_key_file};
use crate::crypto::Algorithm;

/// Parameters of one resolution
#[derive(Debug, Clone, Copy)]
pub struct ResolveRequest<'a> {
    pub account_dir: &'a Path,
    pub name: &'a str,
    /// Permission the single key of a plain key file is filed under
    pub permission: &'a str,
    pub require_decryptable: bool,
}

/// A way of locating an account's keys on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionStrategy {
    /// `<name>.json` holding every permission
    Keystore,
    /// `<name>_<algorithm>` plain private key, probed in algorithm order
    KeyFiles,
}

/// Strategies in the order they are tried
pub const DEFAULT_STRATEGIES: [ResolutionStrategy; 2] =
    [ResolutionStrategy::Keystore, ResolutionStrategy::KeyFiles];

impl ResolutionStrategy {
    /// Try to resolve the account, `Ok(None)` when this strategy does not apply
    pub fn resolve(&self, request: &ResolveRequest<'_>) -> Result<Option<Account>, AccountError> {
        match self {
            ResolutionStrategy::Keystore => {
                let path = keystore_path(request.account_dir, request.name);
                if !path.is_file() {
                    return Ok(None);
                }
                log::debug!("Loading keystore {}", path.display());
                let keystore = KeystoreFile::load(&path)?;
                keystore
                    .to_account(request.name, &path, request.require_decryptable)
                    .map(Some)
            }
            ResolutionStrategy::KeyFiles => {
                for algorithm in Algorithm::ALL {
                    let path = key_file_path(request.account_dir, request.name, algorithm);
                    if path.is_file() {
                        log::debug!("Loading {} key file {}", algorithm, path.display());
                        let key_pair = load_key_file(&path, algorithm)?;
                        return Ok(Some(Account::single(
                            request.name,
                            request.permission,
                            key_pair,
                        )));
                    }
                }
                Ok(None)
            }
        }
    }
}

/// Resolve an account with the default strategy order
pub fn resolve_account(request: &ResolveRequest<'_>) -> Result<Account, AccountError> {
    resolve_with(&DEFAULT_STRATEGIES, request)
}

/// Resolve an account by trying `strategies` in order
pub fn resolve_with(
    strategies: &[ResolutionStrategy],
    request: &ResolveRequest<'_>,
) -> Result<Account, AccountError> {
    check_account_name(request.name)?;
    for strategy in strategies {
        if let Some(account) = strategy.resolve(request)? {
            log::debug!("Resolved account {} via {:?}", request.name, strategy);
            return Ok(account);
        }
    }

    Err(AccountError::AccountNotFound {
        name: request.name.to_string(),
        dir: request.account_dir.to_path_buf(),
    })
}
