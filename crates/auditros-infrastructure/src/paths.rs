//! Unified path management for Auditros files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/auditros/          # Config directory
//! ├── config.toml              # Application configuration
//! ├── secret.json              # API keys
//! ├── media/                   # Generated images, audio, and video
//! └── data/                    # Local store blobs, one JSON file per key
//!     ├── auditros_chat_history.json
//!     ├── auditros_experience_base.json
//!     ├── auditros_user_registry.json
//!     └── auditros_current_user.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "auditros";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
    /// Directory creation failed.
    Io(std::io::Error),
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
            PathError::Io(e) => write!(f, "Cannot prepare directory: {}", e),
        }
    }
}

impl std::error::Error for PathError {}

/// Resolved locations of every file Auditros reads or writes.
#[derive(Debug, Clone)]
pub struct AuditrosPaths {
    base: PathBuf,
}

impl AuditrosPaths {
    /// Resolves paths under `base_path`, or the platform config directory
    /// (`~/.config/auditros` on Linux) when `None`.
    pub fn new(base_path: Option<&Path>) -> Result<Self, PathError> {
        let base = match base_path {
            Some(path) => path.to_path_buf(),
            None => dirs::config_dir()
                .ok_or(PathError::ConfigDirNotFound)?
                .join(APP_DIR_NAME),
        };
        Ok(Self { base })
    }

    pub fn config_dir(&self) -> &Path {
        &self.base
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.toml")
    }

    /// Path to the secrets file.
    ///
    /// Created with mode 600 on Unix by [`AuditrosPaths::ensure_secret_file`].
    pub fn secret_file(&self) -> PathBuf {
        self.base.join("secret.json")
    }

    /// Directory holding the local store blobs.
    pub fn data_dir(&self) -> PathBuf {
        self.base.join("data")
    }

    /// Directory where generated media is saved.
    pub fn media_dir(&self) -> PathBuf {
        self.base.join("media")
    }

    /// Creates the config and data directories if missing.
    pub fn ensure_dirs(&self) -> Result<(), PathError> {
        fs::create_dir_all(self.data_dir()).map_err(PathError::Io)
    }

    /// Writes an empty secret template if no secret file exists yet.
    pub fn ensure_secret_file(&self) -> Result<(), PathError> {
        let path = self.secret_file();
        if path.exists() {
            return Ok(());
        }

        fs::create_dir_all(&self.base).map_err(PathError::Io)?;
        fs::write(&path, "{\n  \"gemini\": {\n    \"api_key\": \"\"\n  }\n}\n")
            .map_err(PathError::Io)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
                .map_err(PathError::Io)?;
        }

        tracing::info!("[Paths] Created secret template at {}", path.display());
        Ok(())
    }
}
