//! Consolidated keystore files
//!
//! One JSON file per account holding the key pairs of every permission.
//! Encrypted entries carry opaque ciphertext produced by an external tool;
//! they are loaded as-is and flagged so callers can decide whether a
//! decryption step is needed.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use super::account::{Account, AccountError};
use super::persistence::{ensure_account_dir, write_owner_only};
use crate::crypto::{Algorithm, KeyPair};

/// On-disk representation of one permission's key pair
#[derive(Clone, Serialize, Deserialize)]
pub struct StoredKeyPair {
    pub algorithm: Algorithm,
    /// Base58 public key
    pub public_key: String,
    /// Base58 private key, or base58 ciphertext when `encrypted`
    pub private_key: String,
    #[serde(default)]
    pub encrypted: bool,
}

impl Drop for StoredKeyPair {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// A consolidated keystore file
#[derive(Clone, Serialize, Deserialize)]
pub struct KeystoreFile {
    #[serde(default)]
    pub name: String,
    pub keypairs: BTreeMap<String, StoredKeyPair>,
}

impl KeystoreFile {
    /// Build a keystore from an account's key pairs
    pub fn from_account(account: &Account) -> Self {
        let keypairs = account
            .keypairs
            .iter()
            .map(|(permission, kp)| {
                let stored = StoredKeyPair {
                    algorithm: kp.algorithm,
                    public_key: kp.public_key_base58(),
                    private_key: kp.private_key_base58().to_string(),
                    encrypted: kp.encrypted,
                };
                (permission.clone(), stored)
            })
            .collect();

        Self {
            name: account.name.clone(),
            keypairs,
        }
    }

    /// Load a keystore from a JSON file
    pub fn load(path: &Path) -> Result<Self, AccountError> {
        let json = Zeroizing::new(fs::read_to_string(path).map_err(AccountError::io(path))?);
        serde_json::from_str(&json).map_err(|e| AccountError::InvalidKeystore {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save the keystore with owner-only permissions
    pub fn save(&self, path: &Path) -> Result<(), AccountError> {
        if let Some(parent) = path.parent() {
            ensure_account_dir(parent)?;
        }
        let mut json = serde_json::to_string_pretty(self).map_err(|e| {
            AccountError::InvalidKeystore {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;
        let result = write_owner_only(path, json.as_bytes());
        json.zeroize();
        result
    }

    /// Decode the stored key pairs into an account
    ///
    /// With `require_decryptable` every entry must be usable for signing
    /// as stored, otherwise `DecryptionRequired` names the first encrypted
    /// permission.
    pub fn to_account(
        &self,
        name: &str,
        path: &Path,
        require_decryptable: bool,
    ) -> Result<Account, AccountError> {
        let mut account = Account::new(name);

        for (permission, stored) in &self.keypairs {
            if stored.encrypted && require_decryptable {
                return Err(AccountError::DecryptionRequired {
                    name: name.to_string(),
                    permission: permission.clone(),
                });
            }
            account.insert(permission, stored.decode(path, permission)?);
        }

        Ok(account)
    }
}

impl StoredKeyPair {
    fn decode(&self, path: &Path, permission: &str) -> Result<KeyPair, AccountError> {
        let invalid = |field: &str| AccountError::InvalidKeystore {
            path: path.to_path_buf(),
            reason: format!("{} of permission {} is not valid base58", field, permission),
        };

        let public_key = bs58::decode(&self.public_key)
            .into_vec()
            .map_err(|_| invalid("public key"))?;
        let mut private_key = bs58::decode(&self.private_key)
            .into_vec()
            .map_err(|_| invalid("private key"))?;

        if public_key.len() != self.algorithm.public_key_len() {
            private_key.zeroize();
            return Err(AccountError::InvalidKeystore {
                path: path.to_path_buf(),
                reason: format!(
                    "public key of permission {} has {} bytes, {} expects {}",
                    permission,
                    public_key.len(),
                    self.algorithm,
                    self.algorithm.public_key_len()
                ),
            });
        }

        Ok(KeyPair {
            algorithm: self.algorithm,
            public_key,
            private_key: private_key.into(),
            encrypted: self.encrypted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> Account {
        let mut account = Account::new("alice");
        account.insert("owner", KeyPair::generate(Algorithm::Secp256k1));
        account.insert("active", KeyPair::generate(Algorithm::Ed25519));
        account
    }

    #[test]
    fn test_keystore_save_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("alice.json");
        let account = sample_account();

        KeystoreFile::from_account(&account).save(&path).unwrap();
        let loaded = KeystoreFile::load(&path)
            .unwrap()
            .to_account("alice", &path, true)
            .unwrap();

        assert_eq!(loaded.keypairs.len(), 2);
        for (permission, kp) in &account.keypairs {
            let other = loaded.key_pair(permission).unwrap();
            assert_eq!(other.algorithm, kp.algorithm);
            assert_eq!(other.public_key, kp.public_key);
            assert_eq!(other.private_key.as_slice(), kp.private_key.as_slice());
        }
    }

    #[test]
    fn test_encrypted_entry_requires_decryption() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("alice.json");
        let mut account = sample_account();
        let mut encrypted = KeyPair::generate(Algorithm::Ed25519);
        encrypted.encrypted = true;
        account.insert("active", encrypted);
        KeystoreFile::from_account(&account).save(&path).unwrap();

        let keystore = KeystoreFile::load(&path).unwrap();
        let result = keystore.to_account("alice", &path, true);
        assert!(matches!(
            result,
            Err(AccountError::DecryptionRequired { ref permission, .. }) if permission == "active"
        ));

        let loaded = keystore.to_account("alice", &path, false).unwrap();
        assert!(loaded.key_pair("active").unwrap().encrypted);
        assert!(!loaded.is_decrypted());
    }

    #[test]
    fn test_malformed_keystore() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let result = KeystoreFile::load(&path);
        assert!(matches!(result, Err(AccountError::InvalidKeystore { .. })));
    }

    #[test]
    fn test_wrong_public_key_length() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("short.json");
        let json = r#"{
            "name": "short",
            "keypairs": {
                "active": {
                    "algorithm": "ed25519",
                    "public_key": "2g",
                    "private_key": "2g"
                }
            }
        }"#;
        fs::write(&path, json).unwrap();

        let keystore = KeystoreFile::load(&path).unwrap();
        let result = keystore.to_account("short", &path, true);
        assert!(matches!(result, Err(AccountError::InvalidKeystore { .. })));
    }
}
