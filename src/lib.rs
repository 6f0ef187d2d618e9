//! Chain-Wallet: account credentials and multi-signature authorization
//!
//! This crate provides the security-relevant core of a blockchain wallet:
//! - Algorithm-tagged key pairs (Ed25519, secp256k1)
//! - Account resolution from a consolidated keystore or plain key files
//! - Key persistence with owner-only private key files
//! - Signer (`account@permission`) and amount limit parsing
//! - Multi-signature authorization, signing locally or attaching
//!   pre-made signatures
//!
//! # Example
//!
//! ```rust,no_run
//! use chain_wallet::account::AccountStore;
//! use chain_wallet::config::WalletConfig;
//! use chain_wallet::crypto::{Algorithm, KeyPair, NativeSigner};
//! use chain_wallet::tx::{authorize, Action, KeySource, TransactionBuilder};
//!
//! let store = AccountStore::new(WalletConfig::from_home().unwrap());
//!
//! // Create and store a key
//! let key_pair = KeyPair::generate(Algorithm::Ed25519);
//! let key_path = store.save_key_pair("alice", &key_pair).unwrap();
//!
//! // Build a transaction and sign it with the key file
//! let mut tx = TransactionBuilder::new()
//!     .add_action(Action::new("token.iost", "transfer", "[]"))
//!     .build()
//!     .unwrap();
//! let sources = [KeySource::new(key_path, Algorithm::Ed25519)];
//! authorize(&mut tx, &sources, &[], &NativeSigner).unwrap();
//! assert_eq!(tx.signatures.len(), 1);
//! ```

pub mod account;
pub mod cli;
pub mod config;
pub mod crypto;
pub mod tx;

// Re-export commonly used types
pub use account::{Account, AccountError, AccountStore};
pub use config::WalletConfig;
pub use crypto::{Algorithm, KeyPair, NativeSigner, SignatureProvider};
pub use tx::{
    authorize, parse_amount_limits, validate_signers, AmountLimit, AuthError, Signature,
    SignerSpec, SigningRequest, TransactionRequest,
};
