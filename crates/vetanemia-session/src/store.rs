//! Key/value persistence for client state.
//!
//! The session cache never touches the filesystem directly; it goes through
//! [`KeyValueStore`], which the CLI backs with a JSON file per profile and the
//! tests back with [`MemoryStore`].

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StoreError;

/// Bearer token issued at login.
pub const TOKEN_KEY: &str = "auth_token";
/// JSON snapshot of the signed-in user.
pub const USER_KEY: &str = "auth_user";
/// JSON of the most recent prediction, in the case-history shape.
pub const LAST_PREDICTION_KEY: &str = "last_prediction";

/// Narrow string key/value interface over persisted client state.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process-local store, used by tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// Store persisted as a flat JSON object in a single file.
///
/// Every operation reads the file fresh, so two processes sharing a profile
/// see each other's logins and logouts. A missing file is an empty store;
/// removing the last key deletes the file. Writes go to a sibling temp file
/// that is renamed over the store, so readers never see a partial file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if entries.is_empty() {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp = self.temp_path();
        fs::write(&temp, serde_json::to_string_pretty(entries)?)?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = lock(&self.write_lock);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = lock(&self.write_lock);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = lock(&self.write_lock);
        let mut entries = self.load()?;
        if entries.remove(key).is_some() {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);

        store.set(TOKEN_KEY, "abc").unwrap();
        assert_eq!(store.get(TOKEN_KEY).unwrap().as_deref(), Some("abc"));

        store.remove(TOKEN_KEY).unwrap();
        assert!(store.is_empty());
        store.remove(TOKEN_KEY).unwrap();
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("session.default.json");

        let store = FileStore::new(&path);
        store.set(TOKEN_KEY, "tok-1").unwrap();
        store.set(USER_KEY, r#"{"id":1}"#).unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-1"));
        assert_eq!(reopened.get(USER_KEY).unwrap().as_deref(), Some(r#"{"id":1}"#));
    }

    #[test]
    fn test_file_store_removes_file_when_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::new(&path);

        store.set(TOKEN_KEY, "tok").unwrap();
        assert!(path.exists());

        store.remove(TOKEN_KEY).unwrap();
        assert!(!path.exists());
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(store.get(TOKEN_KEY), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn test_file_store_readers_never_see_partial_writes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let values: Vec<String> = (0..4).map(|i| i.to_string().repeat(64 * 1024)).collect();

        // Separate instances share no lock, like two processes on one profile.
        let writer = FileStore::new(&path);
        let reader = FileStore::new(&path);
        writer.set(USER_KEY, &values[0]).unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| {
                for i in 0..200 {
                    writer.set(USER_KEY, &values[i % values.len()]).unwrap();
                }
            });
            scope.spawn(|| {
                for _ in 0..200 {
                    let value = reader.get(USER_KEY).unwrap().expect("user stays set");
                    assert!(values.contains(&value));
                }
            });
        });

        assert!(!dir.path().join("session.json.tmp").exists());
    }

    #[test]
    fn test_file_store_shared_between_threads() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));

        std::thread::scope(|scope| {
            for t in 0..4 {
                let store = &store;
                scope.spawn(move || {
                    for i in 0..25 {
                        let key = format!("key-{t}");
                        store.set(&key, &i.to_string()).unwrap();
                        assert_eq!(store.get(&key).unwrap(), Some(i.to_string()));
                    }
                });
            }
        });

        assert_eq!(store.get("key-3").unwrap().as_deref(), Some("24"));
    }
}
