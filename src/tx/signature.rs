//! Signature records
//!
//! A signature record is a JSON file holding everything needed to verify a
//! signature independently: algorithm, public key and signature bytes, plus
//! the optional `account@permission` the signature is made for. Offline
//! signers produce them and the authorizer attaches them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::signer::SignerSpec;
use crate::crypto::{Algorithm, KeyError, SignatureProvider};

/// Signature record errors
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Malformed signature record: {0}")]
    Malformed(String),
}

/// A signature with the key material needed to check it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SignatureRecord", into = "SignatureRecord")]
pub struct Signature {
    pub algorithm: Algorithm,
    pub public_key: Vec<u8>,
    pub signature: Vec<u8>,
    pub signer: Option<SignerSpec>,
}

/// JSON form, byte fields are base58
#[derive(Debug, Serialize, Deserialize)]
struct SignatureRecord {
    algorithm: Algorithm,
    public_key: String,
    signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signer: Option<SignerSpec>,
}

impl From<Signature> for SignatureRecord {
    fn from(sig: Signature) -> Self {
        Self {
            algorithm: sig.algorithm,
            public_key: bs58::encode(&sig.public_key).into_string(),
            signature: bs58::encode(&sig.signature).into_string(),
            signer: sig.signer,
        }
    }
}

impl TryFrom<SignatureRecord> for Signature {
    type Error = RecordError;

    fn try_from(record: SignatureRecord) -> Result<Self, Self::Error> {
        let algorithm = record.algorithm;

        let public_key = bs58::decode(&record.public_key)
            .into_vec()
            .map_err(|e| RecordError::Malformed(format!("public key: {}", e)))?;
        let signature = bs58::decode(&record.signature)
            .into_vec()
            .map_err(|e| RecordError::Malformed(format!("signature: {}", e)))?;

        if public_key.len() != algorithm.public_key_len() {
            return Err(RecordError::Malformed(format!(
                "{} public key must be {} bytes, got {}",
                algorithm,
                algorithm.public_key_len(),
                public_key.len()
            )));
        }
        if signature.len() != algorithm.signature_len() {
            return Err(RecordError::Malformed(format!(
                "{} signature must be {} bytes, got {}",
                algorithm,
                algorithm.signature_len(),
                signature.len()
            )));
        }

        Ok(Self {
            algorithm,
            public_key,
            signature,
            signer: record.signer,
        })
    }
}

impl Signature {
    /// Verify this signature over `message`
    pub fn verify(
        &self,
        message: &[u8],
        provider: &dyn SignatureProvider,
    ) -> Result<bool, KeyError> {
        provider.verify(message, self.algorithm, &self.public_key, &self.signature)
    }

    /// Public key as base58
    pub fn public_key_base58(&self) -> String {
        bs58::encode(&self.public_key).into_string()
    }

    /// Serialize to a JSON signature record
    pub fn to_json(&self) -> Result<String, RecordError> {
        serde_json::to_string_pretty(self).map_err(|e| RecordError::Malformed(e.to_string()))
    }

    /// Parse a JSON signature record, checking field lengths
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        serde_json::from_str(json).map_err(|e| RecordError::Malformed(e.to_string()))
    }

    /// Load a signature record from a file
    pub fn load(path: &Path) -> Result<Self, RecordError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Save as a signature record file
    pub fn save(&self, path: &Path) -> Result<(), RecordError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{sha256, KeyPair, NativeSigner};

    fn signed(algo: Algorithm, message: &[u8]) -> Signature {
        let kp = KeyPair::generate(algo);
        Signature {
            algorithm: algo,
            public_key: kp.public_key.clone(),
            signature: kp.sign(message).unwrap(),
            signer: Some(SignerSpec::new("alice", "active")),
        }
    }

    #[test]
    fn test_record_file_keeps_fields() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("alice.sig");
        let hash = sha256(b"tx");

        for algo in Algorithm::ALL {
            let sig = signed(algo, &hash);
            sig.save(&path).unwrap();
            let loaded = Signature::load(&path).unwrap();
            assert_eq!(loaded, sig);
            assert!(loaded.verify(&hash, &NativeSigner).unwrap());
        }
    }

    #[test]
    fn test_record_is_human_readable() {
        let sig = signed(Algorithm::Secp256k1, &sha256(b"tx"));
        let json = sig.to_json().unwrap();
        assert!(json.contains("\"algorithm\": \"secp256k1\""));
        assert!(json.contains("\"signer\": \"alice@active\""));
        assert!(json.contains(&sig.public_key_base58()));
    }

    #[test]
    fn test_signer_is_optional() {
        let mut sig = signed(Algorithm::Ed25519, b"m");
        sig.signer = None;
        let json = sig.to_json().unwrap();
        assert!(!json.contains("signer"));
        assert_eq!(Signature::from_json(&json).unwrap().signer, None);
    }

    #[test]
    fn test_wrong_lengths_are_malformed() {
        let json = r#"{"algorithm":"ed25519","public_key":"2g","signature":"2g"}"#;
        assert!(matches!(
            Signature::from_json(json),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            Signature::from_json("not json"),
            Err(RecordError::Malformed(_))
        ));
        assert!(matches!(
            Signature::from_json(r#"{"algorithm":"rsa","public_key":"","signature":""}"#),
            Err(RecordError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = Signature::load(&temp_dir.path().join("missing.sig"));
        assert!(matches!(result, Err(RecordError::IoError(_))));
    }
}
