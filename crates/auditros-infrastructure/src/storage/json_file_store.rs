use std::fs;
use std::path::{Path, PathBuf};

use auditros_core::storage::KeyValueStore;
use auditros_core::{AuditrosError, Result};

use super::atomic_file::{FileLock, read_optional, write_atomically};

/// Local key-value store: each key is a `<key>.json` file in one directory.
///
/// Values are opaque strings; callers serialize their own records.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AuditrosError::data_access(format!(
                "Invalid storage key: {key:?}"
            )));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        read_optional(&self.path_for(key)?)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _lock = FileLock::acquire(&path)?;
        write_atomically(&path, value.as_bytes())
    }

    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<String>,
    ) -> Result<()> {
        let path = self.path_for(key)?;
        let _lock = FileLock::acquire(&path)?;
        let updated = f(read_optional(&path)?)?;
        write_atomically(&path, updated.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let _lock = FileLock::acquire(&path)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path().join("data"));

        assert_eq!(store.get("auditros_chat_history").unwrap(), None);

        store.set("auditros_chat_history", "[]").unwrap();
        assert_eq!(
            store.get("auditros_chat_history").unwrap().as_deref(),
            Some("[]")
        );

        store.remove("auditros_chat_history").unwrap();
        assert_eq!(store.get("auditros_chat_history").unwrap(), None);

        // Removing twice is fine
        store.remove("auditros_chat_history").unwrap();
    }

    #[test]
    fn test_concurrent_updates_are_serialized() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileStore::new(temp_dir.path()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..25 {
                        store
                            .update("counter", &mut |current| {
                                let n: u32 = current
                                    .map_or(Ok(0), |raw| raw.parse())
                                    .map_err(|e| AuditrosError::data_access(format!("{e}")))?;
                                Ok((n + 1).to_string())
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get("counter").unwrap().as_deref(), Some("200"));
    }

    #[test]
    fn test_failed_update_keeps_previous_value() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path());
        store.set("auditros_current_user", "{}").unwrap();

        let result = store.update("auditros_current_user", &mut |_| {
            Err(AuditrosError::data_access("rejected"))
        });
        assert!(result.is_err());
        assert_eq!(
            store.get("auditros_current_user").unwrap().as_deref(),
            Some("{}")
        );
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(temp_dir.path());
        assert!(store.set("../escape", "x").is_err());
        assert!(store.get("").is_err());
    }
}
