//! Atomic file operations.
//!
//! Every write goes to a uniquely named hidden temp file in the same
//! directory, is fsynced, and is renamed over the target. Writers hold an
//! exclusive `fs2` lock on a sibling `.lock` file.

use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use auditros_core::{AuditrosError, Result};

/// On-disk encoding of an [`AtomicFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Toml,
}

impl FileFormat {
    /// Picks the format from the file extension, defaulting to JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// A handle to a typed file that is replaced atomically on save.
pub struct AtomicFile<T> {
    path: PathBuf,
    format: FileFormat,
    _phantom: PhantomData<T>,
}

impl<T> AtomicFile<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Creates a handle; the format follows the file extension.
    pub fn new(path: PathBuf) -> Self {
        let format = FileFormat::from_path(&path);
        Self {
            path,
            format,
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>> {
        let Some(content) = read_optional(&self.path)? else {
            return Ok(None);
        };

        let data = match self.format {
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)?,
        };
        Ok(Some(data))
    }

    /// Serializes and writes the data atomically.
    pub fn save(&self, data: &T) -> Result<()> {
        let serialized = match self.format {
            FileFormat::Json => serde_json::to_string_pretty(data)?,
            FileFormat::Toml => toml::to_string_pretty(data)?,
        };
        write_atomically(&self.path, serialized.as_bytes())
    }
}

/// Reads a file as text. Missing or whitespace-only files yield `None`.
pub fn read_optional(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(None);
    }
    Ok(Some(content))
}

/// Replaces `path` with `bytes` via temp file + fsync + rename.
///
/// The temp file gets a unique name in the target directory, so concurrent
/// writers never share one.
pub fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| AuditrosError::io("Path has no parent directory"))?;
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_file = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        })?;
    tmp_file.write_all(bytes)?;
    tmp_file.as_file().sync_all()?;
    tmp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Exclusive advisory lock held for the guard's lifetime.
///
/// The `.lock` file stays on disk; removing it would let a waiter on the
/// old inode and a newcomer on a fresh one hold the lock at the same time.
pub struct FileLock {
    #[allow(dead_code)]
    file: File,
}

impl FileLock {
    /// Blocks until the lock next to `path` is acquired.
    pub fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        #[cfg(unix)]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                AuditrosError::data_access(format!("Failed to acquire lock: {}", e))
            })?;
        }

        Ok(FileLock { file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestConfig {
        name: String,
        count: u32,
    }

    #[test]
    fn test_save_and_load_json() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<TestConfig>::new(temp_dir.path().join("test.json"));

        let config = TestConfig {
            name: "test".to_string(),
            count: 42,
        };
        file.save(&config).unwrap();

        assert_eq!(file.load().unwrap().unwrap(), config);
    }

    #[test]
    fn test_save_and_load_toml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("test.toml");
        let file = AtomicFile::<TestConfig>::new(path.clone());

        file.save(&TestConfig {
            name: "toml".to_string(),
            count: 7,
        })
        .unwrap();

        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.contains("name = \"toml\""));
        assert_eq!(file.load().unwrap().unwrap().count, 7);
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicFile::<TestConfig>::new(temp_dir.path().join("missing.json"));
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blob.json");
        write_atomically(&path, b"[]").unwrap();

        assert!(path.exists());
        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "{leftovers:?}");
    }

    #[test]
    fn test_lock_file_survives_release() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("blob.json");

        drop(FileLock::acquire(&path).unwrap());
        assert!(temp_dir.path().join("blob.lock").exists());

        // Re-acquiring after release does not block
        drop(FileLock::acquire(&path).unwrap());
    }
}
