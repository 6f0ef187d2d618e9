//! Key management for wallet accounts
//!
//! Key pairs are tagged with the signature algorithm they belong to.
//! Two algorithms are supported: Ed25519 and ECDSA over secp256k1.
//! Private key bytes are held in a buffer that is wiped on drop.

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::{Signer as _, SigningKey, Verifier as _, VerifyingKey};
use rand::rngs::OsRng;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

use super::hash::sha256;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid private key for {0}")]
    InvalidPrivateKey(Algorithm),
    #[error("Invalid public key for {0}")]
    InvalidPublicKey(Algorithm),
    #[error("Invalid signature for {0}")]
    InvalidSignature(Algorithm),
    #[error("Unknown signature algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("Invalid base58 encoding: {0}")]
    InvalidEncoding(#[from] bs58::decode::Error),
    #[error("Secp256k1 error: {0}")]
    Secp256k1Error(#[from] secp256k1::Error),
}

/// Signature algorithm a key pair belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Ed25519,
    Secp256k1,
}

impl Algorithm {
    /// All algorithms, in the precedence order used when probing key files
    pub const ALL: [Algorithm; 2] = [Algorithm::Ed25519, Algorithm::Secp256k1];

    /// Lowercase name, also used as the key file suffix
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Ed25519 => "ed25519",
            Algorithm::Secp256k1 => "secp256k1",
        }
    }

    /// Length in bytes of a private key
    pub fn private_key_len(&self) -> usize {
        32
    }

    /// Length in bytes of a public key (secp256k1 keys are compressed)
    pub fn public_key_len(&self) -> usize {
        match self {
            Algorithm::Ed25519 => 32,
            Algorithm::Secp256k1 => 33,
        }
    }

    /// Length in bytes of a signature (secp256k1 uses the compact form)
    pub fn signature_len(&self) -> usize {
        64
    }

    /// Derive the public key for a private key
    pub fn derive_public_key(&self, private_key: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            Algorithm::Ed25519 => Ok(ed25519_signing_key(private_key)?
                .verifying_key()
                .to_bytes()
                .to_vec()),
            Algorithm::Secp256k1 => {
                let secp = Secp256k1::new();
                let secret_key = SecretKey::from_slice(private_key)
                    .map_err(|_| KeyError::InvalidPrivateKey(*self))?;
                Ok(PublicKey::from_secret_key(&secp, &secret_key)
                    .serialize()
                    .to_vec())
            }
        }
    }

    /// Sign a message with a raw private key
    ///
    /// Ed25519 signs `message` as given. secp256k1 signs a 32 byte
    /// `message` as the digest itself and SHA-256 hashes any other length
    /// first, so a longer message and its SHA-256 digest sign the same.
    /// [`Algorithm::verify`] applies the same rule.
    pub fn sign(&self, message: &[u8], private_key: &[u8]) -> Result<Vec<u8>, KeyError> {
        match self {
            Algorithm::Ed25519 => {
                let signing_key = ed25519_signing_key(private_key)?;
                Ok(signing_key.sign(message).to_bytes().to_vec())
            }
            Algorithm::Secp256k1 => {
                let secp = Secp256k1::new();
                let secret_key = SecretKey::from_slice(private_key)
                    .map_err(|_| KeyError::InvalidPrivateKey(*self))?;
                let message = secp256k1_message(message)?;
                let signature = secp.sign_ecdsa(&message, &secret_key);
                Ok(signature.serialize_compact().to_vec())
            }
        }
    }

    /// Verify a signature against a raw public key
    ///
    /// Malformed keys or signatures are reported as errors, a well-formed
    /// signature that does not match yields `Ok(false)`.
    pub fn verify(
        &self,
        message: &[u8],
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, KeyError> {
        match self {
            Algorithm::Ed25519 => {
                let key_bytes: [u8; 32] = public_key
                    .try_into()
                    .map_err(|_| KeyError::InvalidPublicKey(*self))?;
                let verifying_key = VerifyingKey::from_bytes(&key_bytes)
                    .map_err(|_| KeyError::InvalidPublicKey(*self))?;
                let signature = ed25519_dalek::Signature::from_slice(signature)
                    .map_err(|_| KeyError::InvalidSignature(*self))?;
                Ok(verifying_key.verify(message, &signature).is_ok())
            }
            Algorithm::Secp256k1 => {
                let secp = Secp256k1::new();
                let public_key = PublicKey::from_slice(public_key)
                    .map_err(|_| KeyError::InvalidPublicKey(*self))?;
                let signature = secp256k1::ecdsa::Signature::from_compact(signature)
                    .map_err(|_| KeyError::InvalidSignature(*self))?;
                let message = secp256k1_message(message)?;
                Ok(secp.verify_ecdsa(&message, &signature, &public_key).is_ok())
            }
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Algorithm::ALL
            .into_iter()
            .find(|algo| algo.name() == s)
            .ok_or_else(|| KeyError::UnknownAlgorithm(s.to_string()))
    }
}

fn ed25519_signing_key(private_key: &[u8]) -> Result<SigningKey, KeyError> {
    let seed: &[u8; 32] = private_key
        .try_into()
        .map_err(|_| KeyError::InvalidPrivateKey(Algorithm::Ed25519))?;
    Ok(SigningKey::from_bytes(seed))
}

fn secp256k1_message(message: &[u8]) -> Result<Message, KeyError> {
    // ECDSA needs a 32 byte digest
    let hash = if message.len() == 32 {
        message.to_vec()
    } else {
        sha256(message)
    };
    Ok(Message::from_digest_slice(&hash)?)
}

/// An algorithm-tagged key pair
///
/// When `encrypted` is set the private key bytes are ciphertext produced by
/// an external keystore tool and cannot be used for signing.
#[derive(Clone)]
pub struct KeyPair {
    pub algorithm: Algorithm,
    pub public_key: Vec<u8>,
    pub private_key: Zeroizing<Vec<u8>>,
    pub encrypted: bool,
}

impl KeyPair {
    /// Generate a new random key pair
    pub fn generate(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Ed25519 => {
                let signing_key = SigningKey::generate(&mut OsRng);
                Self {
                    algorithm,
                    public_key: signing_key.verifying_key().to_bytes().to_vec(),
                    private_key: Zeroizing::new(signing_key.to_bytes().to_vec()),
                    encrypted: false,
                }
            }
            Algorithm::Secp256k1 => {
                let secp = Secp256k1::new();
                let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
                Self {
                    algorithm,
                    public_key: public_key.serialize().to_vec(),
                    private_key: Zeroizing::new(secret_key.secret_bytes().to_vec()),
                    encrypted: false,
                }
            }
        }
    }

    /// Create a key pair from raw private key bytes, deriving the public key
    pub fn from_private_key(algorithm: Algorithm, private_key: &[u8]) -> Result<Self, KeyError> {
        let public_key = algorithm.derive_public_key(private_key)?;
        Ok(Self {
            algorithm,
            public_key,
            private_key: Zeroizing::new(private_key.to_vec()),
            encrypted: false,
        })
    }

    /// Create a key pair from a base58 encoded private key
    pub fn from_private_key_base58(algorithm: Algorithm, encoded: &str) -> Result<Self, KeyError> {
        let bytes = Zeroizing::new(bs58::decode(encoded.trim()).into_vec()?);
        Self::from_private_key(algorithm, &bytes)
    }

    /// Get the public key as base58
    pub fn public_key_base58(&self) -> String {
        bs58::encode(&self.public_key).into_string()
    }

    /// Get the private key as base58
    /// WARNING: Keep this secret!
    pub fn private_key_base58(&self) -> Zeroizing<String> {
        Zeroizing::new(bs58::encode(self.private_key.as_slice()).into_string())
    }

    /// Sign a message with the private key, see [`Algorithm::sign`]
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, KeyError> {
        if self.encrypted {
            return Err(KeyError::InvalidPrivateKey(self.algorithm));
        }
        self.algorithm.sign(message, &self.private_key)
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<bool, KeyError> {
        self.algorithm.verify(message, signature, &self.public_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("algorithm", &self.algorithm)
            .field("public_key", &self.public_key_base58())
            .field("private_key", &"<redacted>")
            .field("encrypted", &self.encrypted)
            .finish()
    }
}
