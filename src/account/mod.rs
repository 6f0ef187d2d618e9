//! Account key storage
//!
//! Accounts live in a per-user directory either as a consolidated keystore
//! (`<name>.json`) or as plain key files (`<name>_<algorithm>` and
//! `<name>_<algorithm>.pub`).

pub mod account;
pub mod keystore;
pub mod persistence;
pub mod resolver;
pub mod store;

pub use account::{Account, AccountError};
pub use keystore::{KeystoreFile, StoredKeyPair};
pub use persistence::{
    check_account_name, key_file_path, keystore_path, load_key_file, public_key_file_path, save_key_pair,
};
pub use resolver::{
    resolve_account, resolve_with, ResolutionStrategy, ResolveRequest, DEFAULT_STRATEGIES,
};
pub use store::AccountStore;
