/*
[INPUT]:  String keys and values, written in batches
[OUTPUT]: Durable key-value storage surviving process restarts
[POS]:    Storage layer - client-side equivalent of browser local storage
[UPDATE]: When storage backends or the on-disk format change
*/

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("storage file is corrupt: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single write in a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KvWrite {
    Put(String, String),
    Delete(String),
}

/// Key-value store with all-or-nothing batch writes
pub trait KeyValueStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Apply every write or none of them
    fn apply(&self, batch: &[KvWrite]) -> Result<(), StoreError>;
}

fn apply_to(map: &mut BTreeMap<String, String>, batch: &[KvWrite]) {
    for write in batch {
        match write {
            KvWrite::Put(key, value) => {
                map.insert(key.clone(), value.clone());
            }
            KvWrite::Delete(key) => {
                map.remove(key);
            }
        }
    }
}

/// In-process store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn apply(&self, batch: &[KvWrite]) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        apply_to(&mut entries, batch);
        Ok(())
    }
}

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSON object on disk, rewritten atomically on every batch.
///
/// Writers in other processes never share a temp file; concurrent batches
/// from different processes resolve last-writer-wins, each landing whole.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;

        // Atomic write: write to temp file then rename
        let temp_path = self.temp_path();
        if let Err(err) = fs::write(&temp_path, content) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            let mut perms = fs::metadata(&temp_path)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&temp_path, perms)?;
        }

        if let Err(err) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(err.into());
        }
        Ok(())
    }

    /// `<file>.<pid>.<n>.tmp`, unique per process and write
    fn temp_path(&self) -> PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(format!(".{}.{counter}.tmp", std::process::id()));
        self.path.with_file_name(name)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn apply(&self, batch: &[KvWrite]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        apply_to(&mut entries, batch);
        self.save(&entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("eventpass-test-{}", Uuid::new_v4()))
            .join("session.json")
    }

    #[test]
    fn test_memory_store_batch() {
        let store = MemoryStore::new();
        store
            .apply(&[
                KvWrite::Put("a".to_string(), "1".to_string()),
                KvWrite::Put("b".to_string(), "2".to_string()),
                KvWrite::Delete("a".to_string()),
            ])
            .unwrap();

        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = temp_file();
        FileStore::new(&path)
            .apply(&[KvWrite::Put("token".to_string(), "abc".to_string())])
            .unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("token").unwrap().as_deref(), Some("abc"));
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_file_store_temp_names_are_unique() {
        let store = FileStore::new(temp_file());
        let first = store.temp_path();
        let second = store.temp_path();

        assert_ne!(first, second);
        assert_eq!(first.parent(), store.path().parent());
        assert!(first.to_string_lossy().ends_with(".tmp"));
    }

    #[test]
    fn test_independent_file_stores_write_concurrently() {
        let path = temp_file();
        let handles: Vec<_> = (0..8)
            .map(|writer| {
                let path = path.clone();
                std::thread::spawn(move || {
                    // Separate instances share no in-process lock, like two processes
                    let store = FileStore::new(&path);
                    for round in 0..20 {
                        store
                            .apply(&[
                                KvWrite::Put("token".to_string(), format!("{writer}-{round}")),
                                KvWrite::Put("user".to_string(), format!("{writer}-{round}")),
                            ])
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let store = FileStore::new(&path);
        let token = store.get("token").unwrap().unwrap();
        let user = store.get("user").unwrap().unwrap();
        assert_eq!(token, user);
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let store = FileStore::new(temp_file());
        assert_eq!(store.get("token").unwrap(), None);
    }

    #[test]
    fn test_file_store_corrupt_file_is_error() {
        let path = temp_file();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();

        let err = FileStore::new(&path).get("token").unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));

        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }
}
