//! Loads and saves `config.toml`.

use std::path::PathBuf;

use auditros_core::Result;
use auditros_core::config::AppConfig;

use crate::storage::AtomicFile;

/// Access to the application configuration file.
pub struct ConfigService {
    file: AtomicFile<AppConfig>,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: AtomicFile::new(path),
        }
    }

    /// Loads the configuration. A missing file yields the defaults; a file
    /// that does not parse is an error.
    pub fn load(&self) -> Result<AppConfig> {
        match self.file.load()? {
            Some(config) => Ok(config),
            None => {
                tracing::debug!(
                    "[ConfigService] No config at {}, using defaults",
                    self.file.path().display()
                );
                Ok(AppConfig::default())
            }
        }
    }

    pub fn save(&self, config: &AppConfig) -> Result<()> {
        self.file.save(config)
    }
}
