//! Transaction requests
//!
//! A transaction request carries contract actions, the declared co-signers
//! and spending limits, and the signature set attached by the authorizer.
//! Signing covers the canonical byte form, which excludes the signatures.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::limit::AmountLimit;
use super::signature::Signature;
use super::signer::SignerSpec;
use crate::crypto::{sha256, sha256_hex};

// =============================================================================
// Constants
// =============================================================================

/// Default chain ID
pub const DEFAULT_CHAIN_ID: u32 = 1024;

/// Default gas ratio
pub const DEFAULT_GAS_RATIO: f64 = 1.0;

/// Default gas limit
pub const DEFAULT_GAS_LIMIT: f64 = 1_000_000.0;

/// Default validity window, in seconds
pub const DEFAULT_EXPIRATION_SECS: i64 = 90;

const NANOS_PER_SEC: i64 = 1_000_000_000;

// =============================================================================
// Error Types
// =============================================================================

/// Transaction-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    #[error("Number of action args should be a multiple of 3, got {0}")]
    InvalidActionArgs(usize),
    #[error("Invalid duration: {0} seconds")]
    InvalidDuration(i64),
}

// =============================================================================
// Action
// =============================================================================

/// A contract call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub contract: String,
    pub action_name: String,
    /// JSON encoded argument list
    pub data: String,
}

impl Action {
    pub fn new(contract: &str, action_name: &str, data: &str) -> Self {
        Self {
            contract: contract.to_string(),
            action_name: action_name.to_string(),
            data: data.to_string(),
        }
    }
}

/// Build actions from a flat `contract action data ...` argument list
pub fn actions_from_args<S: AsRef<str>>(args: &[S]) -> Result<Vec<Action>, TxError> {
    if args.len() % 3 != 0 {
        return Err(TxError::InvalidActionArgs(args.len()));
    }
    Ok(args
        .chunks(3)
        .map(|c| Action::new(c[0].as_ref(), c[1].as_ref(), c[2].as_ref()))
        .collect())
}

// =============================================================================
// Transaction Request
// =============================================================================

/// A transaction waiting for authorization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Creation time, Unix nanoseconds
    pub time: i64,
    /// Expiration time, Unix nanoseconds
    pub expiration: i64,
    pub gas_ratio: f64,
    pub gas_limit: f64,
    /// Deferred execution delay, nanoseconds
    #[serde(default)]
    pub delay: i64,
    pub chain_id: u32,
    pub actions: Vec<Action>,
    #[serde(default)]
    pub amount_limit: Vec<AmountLimit>,
    #[serde(default)]
    pub signers: Vec<SignerSpec>,
    /// Set by the authorizer, not covered by the signatures themselves
    #[serde(default)]
    pub signatures: Vec<Signature>,
}

impl TransactionRequest {
    /// Deterministic byte form of everything except the signatures
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut w = CanonicalWriter::default();
        w.i64(self.time);
        w.i64(self.expiration);
        w.f64(self.gas_ratio);
        w.f64(self.gas_limit);
        w.i64(self.delay);
        w.u32(self.chain_id);

        w.len(self.actions.len());
        for action in &self.actions {
            w.str(&action.contract);
            w.str(&action.action_name);
            w.str(&action.data);
        }

        w.len(self.amount_limit.len());
        for limit in &self.amount_limit {
            w.str(&limit.token);
            w.str(&limit.value);
        }

        w.len(self.signers.len());
        for signer in &self.signers {
            w.str(&signer.to_string());
        }

        w.into_bytes()
    }

    /// SHA-256 of the canonical bytes, the message that gets signed
    pub fn hash(&self) -> Vec<u8> {
        sha256(&self.canonical_bytes())
    }

    /// Transaction hash as hex
    pub fn hash_hex(&self) -> String {
        sha256_hex(&self.canonical_bytes())
    }

    /// Whether the validity window has passed
    pub fn is_expired(&self, now_nanos: i64) -> bool {
        now_nanos > self.expiration
    }

    pub(crate) fn set_signatures(&mut self, signatures: Vec<Signature>) {
        self.signatures = signatures;
    }
}

/// Length-prefixed big-endian encoder
#[derive(Default)]
struct CanonicalWriter {
    buf: Vec<u8>,
}

impl CanonicalWriter {
    fn u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    fn f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_bits().to_be_bytes());
    }

    fn len(&mut self, n: usize) {
        self.buf.extend_from_slice(&(n as u64).to_be_bytes());
    }

    fn str(&mut self, s: &str) {
        self.len(s.len());
        self.buf.extend_from_slice(s.as_bytes());
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

// =============================================================================
// Transaction Builder
// =============================================================================

/// Builder for transaction requests
pub struct TransactionBuilder {
    time: Option<i64>,
    expiration_secs: i64,
    gas_ratio: f64,
    gas_limit: f64,
    delay_secs: i64,
    chain_id: u32,
    actions: Vec<Action>,
    amount_limit: Vec<AmountLimit>,
    signers: Vec<SignerSpec>,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self {
            time: None,
            expiration_secs: DEFAULT_EXPIRATION_SECS,
            gas_ratio: DEFAULT_GAS_RATIO,
            gas_limit: DEFAULT_GAS_LIMIT,
            delay_secs: 0,
            chain_id: DEFAULT_CHAIN_ID,
            actions: Vec::new(),
            amount_limit: Vec::new(),
            signers: Vec::new(),
        }
    }

    /// Add a contract call
    pub fn add_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Add several contract calls
    pub fn actions(mut self, actions: Vec<Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    /// Declare a co-signer
    pub fn add_signer(mut self, signer: SignerSpec) -> Self {
        self.signers.push(signer);
        self
    }

    /// Set the spending limits
    pub fn amount_limit(mut self, limits: Vec<AmountLimit>) -> Self {
        self.amount_limit = limits;
        self
    }

    pub fn gas(mut self, ratio: f64, limit: f64) -> Self {
        self.gas_ratio = ratio;
        self.gas_limit = limit;
        self
    }

    pub fn chain_id(mut self, chain_id: u32) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Validity window in seconds after creation
    pub fn expiration_secs(mut self, secs: i64) -> Self {
        self.expiration_secs = secs;
        self
    }

    /// Deferred execution delay in seconds
    pub fn delay_secs(mut self, secs: i64) -> Self {
        self.delay_secs = secs;
        self
    }

    /// Pin the creation time (Unix nanoseconds) instead of using the clock
    pub fn time(mut self, nanos: i64) -> Self {
        self.time = Some(nanos);
        self
    }

    /// Build the transaction with an empty signature set
    ///
    /// Fails with `InvalidDuration` when the expiration or delay is negative
    /// or does not fit in nanoseconds.
    pub fn build(self) -> Result<TransactionRequest, TxError> {
        let time = self
            .time
            .unwrap_or_else(|| Utc::now().timestamp_nanos_opt().unwrap_or(0));

        let expiration = secs_to_nanos(self.expiration_secs)
            .and_then(|window| time.checked_add(window))
            .ok_or(TxError::InvalidDuration(self.expiration_secs))?;
        let delay =
            secs_to_nanos(self.delay_secs).ok_or(TxError::InvalidDuration(self.delay_secs))?;

        Ok(TransactionRequest {
            time,
            expiration,
            gas_ratio: self.gas_ratio,
            gas_limit: self.gas_limit,
            delay,
            chain_id: self.chain_id,
            actions: self.actions,
            amount_limit: self.amount_limit,
            signers: self.signers,
            signatures: Vec::new(),
        })
    }
}

fn secs_to_nanos(secs: i64) -> Option<i64> {
    if secs < 0 {
        return None;
    }
    secs.checked_mul(NANOS_PER_SEC)
}

impl Default for TransactionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Algorithm;

    fn sample_tx() -> TransactionRequest {
        TransactionBuilder::new()
            .time(1_700_000_000_000_000_000)
            .add_action(Action::new("token.iost", "transfer", r#"["iost","a","b","1",""]"#))
            .add_signer(SignerSpec::new("bob", "active"))
            .amount_limit(vec![AmountLimit::new("iost", "10")])
            .build()
            .unwrap()
    }

    #[test]
    fn test_builder_defaults() {
        let tx = sample_tx();
        assert_eq!(tx.chain_id, DEFAULT_CHAIN_ID);
        assert_eq!(tx.gas_ratio, DEFAULT_GAS_RATIO);
        assert_eq!(tx.gas_limit, DEFAULT_GAS_LIMIT);
        assert_eq!(tx.expiration - tx.time, 90 * NANOS_PER_SEC);
        assert!(tx.signatures.is_empty());
        assert!(!tx.is_expired(tx.time));
        assert!(tx.is_expired(tx.expiration + 1));
    }

    #[test]
    fn test_builder_rejects_bad_durations() {
        let huge = i64::MAX / NANOS_PER_SEC + 1;

        let result = TransactionBuilder::new().time(0).expiration_secs(huge).build();
        assert_eq!(result, Err(TxError::InvalidDuration(huge)));

        let result = TransactionBuilder::new().time(0).delay_secs(-huge).build();
        assert_eq!(result, Err(TxError::InvalidDuration(-huge)));

        let result = TransactionBuilder::new().time(0).expiration_secs(-1).build();
        assert_eq!(result, Err(TxError::InvalidDuration(-1)));

        // fits in nanoseconds, but not once added to the creation time
        let result = TransactionBuilder::new()
            .time(i64::MAX - 1)
            .expiration_secs(1)
            .build();
        assert_eq!(result, Err(TxError::InvalidDuration(1)));

        let tx = TransactionBuilder::new()
            .time(0)
            .expiration_secs(0)
            .delay_secs(5)
            .build()
            .unwrap();
        assert_eq!(tx.expiration, 0);
        assert_eq!(tx.delay, 5 * NANOS_PER_SEC);
    }

    #[test]
    fn test_canonical_bytes_are_deterministic() {
        let a = sample_tx();
        let b = sample_tx();
        assert_eq!(a.canonical_bytes(), b.canonical_bytes());
        assert_eq!(a.hash().len(), 32);
        assert_eq!(a.hash_hex(), hex::encode(a.hash()));
    }

    #[test]
    fn test_signatures_do_not_change_hash() {
        let mut tx = sample_tx();
        let before = tx.hash();
        tx.set_signatures(vec![Signature {
            algorithm: Algorithm::Ed25519,
            public_key: vec![1; 32],
            signature: vec![2; 64],
            signer: None,
        }]);
        assert_eq!(tx.hash(), before);
    }

    #[test]
    fn test_content_changes_hash() {
        let base = sample_tx();

        let mut other = base.clone();
        other.gas_limit += 1.0;
        assert_ne!(other.hash(), base.hash());

        let mut other = base.clone();
        other.signers.push(SignerSpec::new("carol", "owner"));
        assert_ne!(other.hash(), base.hash());

        let mut other = base.clone();
        other.amount_limit[0].value = "11".to_string();
        assert_ne!(other.hash(), base.hash());
    }

    #[test]
    fn test_length_prefix_prevents_field_shifting() {
        let a = TransactionBuilder::new()
            .time(0)
            .add_action(Action::new("ab", "c", ""))
            .build()
            .unwrap();
        let b = TransactionBuilder::new()
            .time(0)
            .add_action(Action::new("a", "bc", ""))
            .build()
            .unwrap();
        assert_ne!(a.canonical_bytes(), b.canonical_bytes());
    }

    #[test]
    fn test_actions_from_args() {
        let actions =
            actions_from_args(&["token.iost", "transfer", "[]", "ram.iost", "buy", "[1]"]).unwrap();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[1], Action::new("ram.iost", "buy", "[1]"));

        assert!(actions_from_args::<&str>(&[]).unwrap().is_empty());
        assert_eq!(
            actions_from_args(&["a", "b"]),
            Err(TxError::InvalidActionArgs(2))
        );
    }

    #[test]
    fn test_json_round_trip_keeps_hash() {
        let tx = sample_tx();
        let json = serde_json::to_string(&tx).unwrap();
        let back: TransactionRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.hash(), tx.hash());
    }
}
