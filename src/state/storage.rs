//! Key-value stores backing the session cache and the durable user record.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::StateError;

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StateError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StateError>;
    fn remove(&self, key: &str) -> Result<(), StateError>;
    /// Drop every entry.
    fn clear(&self) -> Result<(), StateError>;
}

/// Process-lifetime store; the CLI equivalent of per-tab session storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let entries = self.entries.lock().map_err(|_| StateError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        let mut entries = self.entries.lock().map_err(|_| StateError::LockPoisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        let mut entries = self.entries.lock().map_err(|_| StateError::LockPoisoned)?;
        entries.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StateError> {
        let mut entries = self.entries.lock().map_err(|_| StateError::LockPoisoned)?;
        entries.clear();
        Ok(())
    }
}

/// A JSON object on disk, one entry per key. Writes go through a sibling
/// temp file and a rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StateError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StateError::ReadFailed {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content).map_err(|e| StateError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Like `read_all`, but a corrupt file is discarded so the next write
    /// can replace it.
    fn read_for_update(&self) -> Result<BTreeMap<String, String>, StateError> {
        match self.read_all() {
            Err(StateError::Corrupt { path, message }) => {
                tracing::warn!(path = %path.display(), %message, "discarding corrupt state file");
                Ok(BTreeMap::new())
            }
            other => other,
        }
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StateError> {
        let write_err = |source: std::io::Error| StateError::WriteFailed {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| write_err(std::io::Error::other(e)))?;
        write_private(&self.path, content.as_bytes()).map_err(write_err)
    }
}

/// Replace `path` with `content` through a synced sibling temp file and a
/// rename. On unix the file is readable by its owner only.
pub(crate) fn write_private(path: &Path, content: &[u8]) -> std::io::Result<()> {
    use std::io::Write;

    let tmp = path.with_extension("tmp");
    // A leftover temp file would keep its old mode.
    let _ = std::fs::remove_file(&tmp);

    let written = (|| {
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
        std::fs::rename(&tmp, path)
    })();

    if written.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    written
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let _guard = self.lock.lock().map_err(|_| StateError::LockPoisoned)?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StateError> {
        let _guard = self.lock.lock().map_err(|_| StateError::LockPoisoned)?;
        let mut entries = self.read_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StateError> {
        let _guard = self.lock.lock().map_err(|_| StateError::LockPoisoned)?;
        let mut entries = self.read_for_update()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
    fn clear(&self) -> Result<(), StateError> {
        let _guard = self.lock.lock().map_err(|_| StateError::LockPoisoned)?;
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(StateError::WriteFailed {
                path: self.path.clone(),
                source: e,
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();
        store.clear().unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("session.json");
        FileStore::new(&path).set("page_state_clients", "{}").unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get("page_state_clients").unwrap().as_deref(),
            Some("{}")
        );
        assert!(!path.with_extension("tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("user.json");
        let store = FileStore::new(&path);
        store.set("user_data", "{}").unwrap();
        store.set("user_data", "{\"name\":\"Ana\"}").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0, "mode was {:o}", mode);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn file_store_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("anything").unwrap(), None);
        store.remove("anything").unwrap();
        store.clear().unwrap();
    }

    #[test]
    fn file_store_clear_removes_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let store = FileStore::new(&path);
        store.set("page_state_clients", "{}").unwrap();

        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.get("page_state_clients").unwrap(), None);
    }

    #[test]
    fn corrupt_file_errors_on_read_and_is_replaced_on_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();
        let store = FileStore::new(&path);

        assert!(matches!(store.get("k"), Err(StateError::Corrupt { .. })));
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
