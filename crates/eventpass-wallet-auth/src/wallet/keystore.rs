/*
[INPUT]:  Wallet kind and key storage directory
[OUTPUT]: Persistent Ed25519 signer instances, one per wallet kind
[POS]:    Wallet layer - on-disk keys for the local keystore wallet
[UPDATE]: When key storage format or file naming conventions change
*/

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::signer::Ed25519Signer;
use crate::types::ProviderKind;

const KEY_FILE_SUFFIX: &str = "_ed25519.key";

/// Stores one Ed25519 secret per wallet kind
#[derive(Debug, Clone)]
pub struct Keystore {
    key_dir: PathBuf,
}

impl Keystore {
    /// Create a new keystore with the given storage directory
    pub fn new(key_dir: impl AsRef<Path>) -> Self {
        Self {
            key_dir: key_dir.as_ref().to_path_buf(),
        }
    }

    pub fn key_dir(&self) -> &Path {
        &self.key_dir
    }

    /// Get an existing signer or create a new one if it doesn't exist
    pub fn get_or_create_signer(&self, kind: ProviderKind) -> io::Result<Ed25519Signer> {
        if let Some(signer) = self.load_signer(kind) {
            Ok(signer)
        } else {
            let signer = Ed25519Signer::generate();
            self.save_signer(kind, &signer)?;
            Ok(signer)
        }
    }

    /// Load a signer from disk; `None` when absent or unreadable
    pub fn load_signer(&self, kind: ProviderKind) -> Option<Ed25519Signer> {
        let path = self.key_file_path(kind);
        let content = fs::read_to_string(path).ok()?;
        let bytes = STANDARD.decode(content.trim()).ok()?;
        let key_bytes: [u8; 32] = bytes.as_slice().try_into().ok()?;
        Some(Ed25519Signer::from_secret_key(&key_bytes))
    }

    /// Save a signer to disk with owner-only permissions
    pub fn save_signer(&self, kind: ProviderKind, signer: &Ed25519Signer) -> io::Result<()> {
        if !self.key_dir.exists() {
            fs::create_dir_all(&self.key_dir)?;
        }

        let path = self.key_file_path(kind);
        let encoded = STANDARD.encode(signer.secret_key_bytes());
        fs::write(&path, encoded)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Wallet kinds that have a stored key, in `ProviderKind` order
    pub fn stored_kinds(&self) -> Vec<ProviderKind> {
        let mut kinds = Vec::new();
        if let Ok(entries) = fs::read_dir(&self.key_dir) {
            for entry in entries.flatten() {
                if let Some(name) = entry.file_name().to_str() {
                    if let Some(kind) = name.strip_suffix(KEY_FILE_SUFFIX) {
                        if let Ok(kind) = kind.parse::<ProviderKind>() {
                            kinds.push(kind);
                        }
                    }
                }
            }
        }
        kinds.sort();
        kinds
    }

    /// Get the expected file path for a wallet kind's key
    pub fn key_file_path(&self, kind: ProviderKind) -> PathBuf {
        self.key_dir.join(format!("{kind}{KEY_FILE_SUFFIX}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        let mut path = env::temp_dir();
        path.push(format!("eventpass-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&path).unwrap();
        path
    }

    #[test]
    fn test_keystore_lifecycle() {
        let dir = temp_dir();
        let keystore = Keystore::new(&dir);

        let signer1 = keystore.get_or_create_signer(ProviderKind::Petra).unwrap();
        let address1 = signer1.address();

        let signer2 = keystore
            .load_signer(ProviderKind::Petra)
            .expect("Should load existing key");
        assert_eq!(signer2.address(), address1);

        let signer3 = keystore.get_or_create_signer(ProviderKind::Petra).unwrap();
        assert_eq!(signer3.address(), address1);

        assert_eq!(keystore.stored_kinds(), vec![ProviderKind::Petra]);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let metadata = fs::metadata(keystore.key_file_path(ProviderKind::Petra)).unwrap();
            assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
        }

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_kinds_are_isolated() {
        let dir = temp_dir();
        let keystore = Keystore::new(&dir);

        let petra = keystore.get_or_create_signer(ProviderKind::Petra).unwrap();
        let pontem = keystore.get_or_create_signer(ProviderKind::Pontem).unwrap();
        assert_ne!(petra.address(), pontem.address());

        fs::write(dir.join("notes.txt"), "ignored").unwrap();
        fs::write(dir.join("metamask_ed25519.key"), "ignored").unwrap();
        assert_eq!(
            keystore.stored_kinds(),
            vec![ProviderKind::Petra, ProviderKind::Pontem]
        );

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_corrupt_key_is_ignored() {
        let dir = temp_dir();
        let keystore = Keystore::new(&dir);
        fs::write(keystore.key_file_path(ProviderKind::Martian), "not base64 !!").unwrap();

        assert!(keystore.load_signer(ProviderKind::Martian).is_none());

        fs::remove_dir_all(dir).unwrap();
    }
}
