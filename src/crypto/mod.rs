//! Cryptographic utilities for the wallet
//!
//! This module provides:
//! - SHA-256 hashing
//! - Algorithm-tagged key pairs (Ed25519, secp256k1)
//! - The sign/verify capability used by the authorizer

pub mod hash;
pub mod keys;
pub mod provider;

pub use hash::{sha256, sha256_hex};
pub use keys::{Algorithm, KeyError, KeyPair};
pub use provider::{NativeSigner, SignatureProvider};
