//! Key file persistence
//!
//! A plain account is stored as two files next to each other:
//! - `<name>_<algorithm>`: base58 private key, owner-only permissions
//! - `<name>_<algorithm>.pub`: base58 public key
//!
//! The owner-only mode is applied when the file is created. There is no
//! rollback: if the private key write fails after the public key was
//! written, the public key file stays and the error is returned.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use super::account::AccountError;
use crate::crypto::{Algorithm, KeyPair};

/// Reject account names that would escape the account directory
pub fn check_account_name(name: &str) -> Result<(), AccountError> {
    let escapes = name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
        || name.contains(std::path::MAIN_SEPARATOR);
    if escapes {
        return Err(AccountError::InvalidAccountName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Path of the private key file of an account
pub fn key_file_path(dir: &Path, name: &str, algorithm: Algorithm) -> PathBuf {
    dir.join(format!("{}_{}", name, algorithm.name()))
}

/// Path of the public key file of an account
pub fn public_key_file_path(dir: &Path, name: &str, algorithm: Algorithm) -> PathBuf {
    dir.join(format!("{}_{}.pub", name, algorithm.name()))
}

/// Path of the consolidated keystore of an account
pub fn keystore_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{}.json", name))
}

/// Save a key pair as a pair of key files, returning the private key path
pub fn save_key_pair(dir: &Path, name: &str, key_pair: &KeyPair) -> Result<PathBuf, AccountError> {
    check_account_name(name)?;
    if key_pair.encrypted {
        return Err(AccountError::EncryptedKey {
            name: name.to_string(),
        });
    }

    ensure_account_dir(dir)?;

    let pub_path = public_key_file_path(dir, name, key_pair.algorithm);
    fs::write(&pub_path, key_pair.public_key_base58()).map_err(AccountError::io(&pub_path))?;

    let priv_path = key_file_path(dir, name, key_pair.algorithm);
    write_owner_only(&priv_path, key_pair.private_key_base58().as_bytes())?;

    log::info!("Private key of {} saved at {}", name, priv_path.display());
    Ok(priv_path)
}

/// Load a base58 private key file, deriving the public key
pub fn load_key_file(path: &Path, algorithm: Algorithm) -> Result<KeyPair, AccountError> {
    let encoded = Zeroizing::new(fs::read_to_string(path).map_err(AccountError::io(path))?);
    KeyPair::from_private_key_base58(algorithm, &encoded).map_err(|source| {
        AccountError::InvalidKeyFile {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Create the account directory (owner-only) if it does not exist
pub(crate) fn ensure_account_dir(dir: &Path) -> Result<(), AccountError> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir).map_err(AccountError::io(dir))
}

/// Write a file that only the owner can read and write
///
/// Any existing file is removed first so a fresh inode is created with the
/// restrictive mode.
pub(crate) fn write_owner_only(path: &Path, contents: &[u8]) -> Result<(), AccountError> {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(AccountError::io(path)(e)),
    }

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path).map_err(AccountError::io(path))?;
    file.write_all(contents).map_err(AccountError::io(path))?;
    file.sync_all().map_err(AccountError::io(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_naming() {
        let dir = Path::new("/accounts");
        assert_eq!(
            key_file_path(dir, "alice", Algorithm::Ed25519),
            PathBuf::from("/accounts/alice_ed25519")
        );
        assert_eq!(
            public_key_file_path(dir, "alice", Algorithm::Secp256k1),
            PathBuf::from("/accounts/alice_secp256k1.pub")
        );
        assert_eq!(
            keystore_path(dir, "alice"),
            PathBuf::from("/accounts/alice.json")
        );
    }

    #[test]
    fn test_save_and_load_key_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("nested").join("accounts");

        for algo in Algorithm::ALL {
            let kp = KeyPair::generate(algo);
            let path = save_key_pair(&dir, "alice", &kp).unwrap();
            assert_eq!(path, key_file_path(&dir, "alice", algo));

            let public = fs::read_to_string(public_key_file_path(&dir, "alice", algo)).unwrap();
            assert_eq!(public, kp.public_key_base58());

            let loaded = load_key_file(&path, algo).unwrap();
            assert_eq!(loaded.algorithm, algo);
            assert_eq!(loaded.public_key, kp.public_key);
            assert_eq!(loaded.private_key.as_slice(), kp.private_key.as_slice());
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("accounts");
        let kp = KeyPair::generate(Algorithm::Secp256k1);

        // an existing world-readable file must not leak its mode
        ensure_account_dir(&dir).unwrap();
        let path = key_file_path(&dir, "bob", kp.algorithm);
        fs::write(&path, "old").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o666)).unwrap();

        let path = save_key_pair(&dir, "bob", &kp).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);

        let dir_mode = fs::metadata(&dir).unwrap().permissions().mode();
        assert_eq!(dir_mode & 0o077, 0);
    }

    #[test]
    fn test_save_overwrites_existing_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let kp1 = KeyPair::generate(Algorithm::Ed25519);
        let kp2 = KeyPair::generate(Algorithm::Ed25519);

        save_key_pair(temp_dir.path(), "carol", &kp1).unwrap();
        let path = save_key_pair(temp_dir.path(), "carol", &kp2).unwrap();

        let loaded = load_key_file(&path, Algorithm::Ed25519).unwrap();
        assert_eq!(loaded.public_key, kp2.public_key);
    }

    #[test]
    fn test_encrypted_key_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut kp = KeyPair::generate(Algorithm::Ed25519);
        kp.encrypted = true;

        let result = save_key_pair(temp_dir.path(), "dave", &kp);
        assert!(matches!(result, Err(AccountError::EncryptedKey { .. })));
    }

    #[test]
    fn test_unwritable_dir_reports_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        // a regular file where the directory should be
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "x").unwrap();

        let kp = KeyPair::generate(Algorithm::Ed25519);
        match save_key_pair(&blocker, "erin", &kp) {
            Err(AccountError::Io { path, .. }) => assert_eq!(path, blocker),
            other => panic!("expected Io error, got {:?}", other),
        }
    }

    #[test]
    fn test_private_key_failure_keeps_public_key() {
        let temp_dir = tempfile::tempdir().unwrap();
        let kp = KeyPair::generate(Algorithm::Ed25519);
        // a directory where the private key file should go
        let priv_path = key_file_path(temp_dir.path(), "gina", kp.algorithm);
        fs::create_dir(&priv_path).unwrap();

        match save_key_pair(temp_dir.path(), "gina", &kp) {
            Err(AccountError::Io { path, .. }) => assert_eq!(path, priv_path),
            other => panic!("expected Io error, got {:?}", other),
        }

        let pub_path = public_key_file_path(temp_dir.path(), "gina", kp.algorithm);
        assert_eq!(fs::read_to_string(pub_path).unwrap(), kp.public_key_base58());
    }

    #[test]
    fn test_account_name_cannot_escape_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("accounts");
        let kp = KeyPair::generate(Algorithm::Ed25519);

        for name in ["../x", "a/b", "..", "a\\b"] {
            assert!(matches!(
                save_key_pair(&dir, name, &kp),
                Err(AccountError::InvalidAccountName { .. })
            ));
        }
        assert!(!dir.exists());
        assert!(!temp_dir.path().join("x_ed25519").exists());

        assert!(check_account_name("alice.v2").is_ok());
        assert!(check_account_name("").is_ok());
    }

    #[test]
    fn test_load_garbage_key_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("frank_ed25519");
        fs::write(&path, "not-base58-0OIl").unwrap();

        let result = load_key_file(&path, Algorithm::Ed25519);
        assert!(matches!(result, Err(AccountError::InvalidKeyFile { .. })));
    }
}
