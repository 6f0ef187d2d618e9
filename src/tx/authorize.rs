//! Multi-signature authorization
//!
//! A transaction gets its signatures in exactly one of two ways:
//! - signing mode: sign locally with private key files
//! - attach mode: load pre-made signature records and verify them
//!
//! The mode is decided once, when the [`SigningRequest`] is built. Nothing
//! is written to the transaction until every source has succeeded.

use std::path::PathBuf;

use thiserror::Error;

use super::signature::{RecordError, Signature};
use super::signer::SignerSpec;
use super::transaction::TransactionRequest;
use crate::account::{load_key_file, AccountError};
use crate::crypto::{Algorithm, KeyError, KeyPair, SignatureProvider};

/// Authorization errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("At least one of sign keys and attached signatures should be empty")]
    ConflictingSignatureModes,
    #[error("Sign tx with private key {} failed: {error}", path.display())]
    KeyLoadError {
        path: PathBuf,
        #[source]
        error: AccountError,
    },
    #[error("Invalid signature file {}: {error}", path.display())]
    InvalidSignatureRecord {
        path: PathBuf,
        #[source]
        error: RecordError,
    },
    #[error("Signature verification failed for {}", path.display())]
    SignatureVerificationFailed { path: PathBuf },
}

/// A private key file and the algorithm it holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySource {
    pub path: PathBuf,
    pub algorithm: Algorithm,
}

impl KeySource {
    pub fn new(path: impl Into<PathBuf>, algorithm: Algorithm) -> Self {
        Self {
            path: path.into(),
            algorithm,
        }
    }
}

/// How a transaction acquires its signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigningRequest {
    /// Sign with each private key file, in order
    Sign(Vec<KeySource>),
    /// Attach and verify each signature record file, in order
    Attach(Vec<PathBuf>),
    /// Leave the signature set empty
    None,
}

impl SigningRequest {
    /// Pick the mode from the two source lists, at most one may be non-empty
    pub fn from_sources(
        sign_keys: Vec<KeySource>,
        with_signs: Vec<PathBuf>,
    ) -> Result<Self, AuthError> {
        match (sign_keys.is_empty(), with_signs.is_empty()) {
            (false, false) => Err(AuthError::ConflictingSignatureModes),
            (false, true) => Ok(SigningRequest::Sign(sign_keys)),
            (true, false) => Ok(SigningRequest::Attach(with_signs)),
            (true, true) => Ok(SigningRequest::None),
        }
    }
}

/// Authorize `tx` from raw source lists
///
/// Fails with `ConflictingSignatureModes` without touching `tx` when both
/// lists are non-empty.
pub fn authorize(
    tx: &mut TransactionRequest,
    sign_keys: &[KeySource],
    with_signs: &[PathBuf],
    provider: &dyn SignatureProvider,
) -> Result<(), AuthError> {
    let request = SigningRequest::from_sources(sign_keys.to_vec(), with_signs.to_vec())?;
    authorize_request(tx, &request, provider)
}

/// Produce the signature set of `tx` and commit it
pub fn authorize_request(
    tx: &mut TransactionRequest,
    request: &SigningRequest,
    provider: &dyn SignatureProvider,
) -> Result<(), AuthError> {
    let message = tx.hash();

    let signatures = match request {
        SigningRequest::Sign(sources) => {
            log::info!("Signing transaction with {} key(s)", sources.len());
            sign_all(&message, sources, provider)?
        }
        SigningRequest::Attach(paths) => {
            log::info!("Attaching {} signature(s)", paths.len());
            attach_all(&message, paths, provider)?
        }
        SigningRequest::None => Vec::new(),
    };

    log::debug!(
        "Committing {} signature(s) to tx {}",
        signatures.len(),
        hex::encode(&message)
    );
    tx.set_signatures(signatures);
    Ok(())
}

fn sign_all(
    message: &[u8],
    sources: &[KeySource],
    provider: &dyn SignatureProvider,
) -> Result<Vec<Signature>, AuthError> {
    let mut signatures = Vec::with_capacity(sources.len());

    for source in sources {
        log::debug!("Signing with {}", source.path.display());
        let key_load_error = |error: AccountError| AuthError::KeyLoadError {
            path: source.path.clone(),
            error,
        };

        let key_pair = load_key_file(&source.path, source.algorithm).map_err(key_load_error)?;
        let signature = sign_message(message, &key_pair, None, provider).map_err(|e| {
            key_load_error(AccountError::InvalidKeyFile {
                path: source.path.clone(),
                source: e,
            })
        })?;
        signatures.push(signature);
    }

    Ok(signatures)
}

fn attach_all(
    message: &[u8],
    paths: &[PathBuf],
    provider: &dyn SignatureProvider,
) -> Result<Vec<Signature>, AuthError> {
    let mut signatures = Vec::with_capacity(paths.len());

    for path in paths {
        log::debug!("Verifying signature file {}", path.display());
        let signature =
            Signature::load(path).map_err(|error| AuthError::InvalidSignatureRecord {
                path: path.clone(),
                error,
            })?;

        match signature.verify(message, provider) {
            Ok(true) => signatures.push(signature),
            Ok(false) => {
                return Err(AuthError::SignatureVerificationFailed { path: path.clone() })
            }
            Err(e) => {
                log::debug!("Signature in {} is unusable: {}", path.display(), e);
                return Err(AuthError::SignatureVerificationFailed { path: path.clone() });
            }
        }
    }

    Ok(signatures)
}

fn sign_message(
    message: &[u8],
    key_pair: &KeyPair,
    signer: Option<SignerSpec>,
    provider: &dyn SignatureProvider,
) -> Result<Signature, KeyError> {
    Ok(Signature {
        algorithm: key_pair.algorithm,
        public_key: key_pair.public_key.clone(),
        signature: provider.sign(message, key_pair)?,
        signer,
    })
}

/// Sign a transaction with one key pair, for offline signers
pub fn sign_transaction(
    tx: &TransactionRequest,
    key_pair: &KeyPair,
    signer: Option<SignerSpec>,
    provider: &dyn SignatureProvider,
) -> Result<Signature, KeyError> {
    sign_message(&tx.hash(), key_pair, signer, provider)
}

/// Check one signature against a transaction
pub fn verify_transaction_signature(
    tx: &TransactionRequest,
    signature: &Signature,
    provider: &dyn SignatureProvider,
) -> bool {
    signature.verify(&tx.hash(), provider).unwrap_or(false)
}
