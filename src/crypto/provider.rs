//! Sign/verify capability consumed by the authorizer
//!
//! The authorizer never calls a signature library directly; it goes
//! through a [`SignatureProvider`] so the primitives can be swapped out
//! (hardware signers, test doubles).

use super::keys::{Algorithm, KeyError, KeyPair};

/// Signing and verification keyed by [`Algorithm`]
pub trait SignatureProvider {
    /// Sign `message` with the private half of `key_pair`
    fn sign(&self, message: &[u8], key_pair: &KeyPair) -> Result<Vec<u8>, KeyError>;

    /// Check `signature` over `message` against a raw public key
    fn verify(
        &self,
        message: &[u8],
        algorithm: Algorithm,
        public_key: &[u8],
        signature: &[u8],
    ) -> Result<bool, KeyError>;
}

/// Provider backed by `ed25519-dalek` and `secp256k1`
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSigner;

impl SignatureProvider for NativeSigner {
    fn sign(&self, message: &[u8], key_pair: &KeyPair) -> Result<Vec<u8>, KeyError> {
        key_pair.sign(message)
    }

    fn verify(
        &self,
        message: &[u8],
        algorithm: Algorithm,
        public_key: &[u8],
        signature: &[u8],
    ) -> Result<bool, KeyError> {
        algorithm.verify(message, signature, public_key)
    }
}
