//! Secret service implementation.
//!
//! Reads `secret.json` once and caches it. The `GEMINI_API_KEY` (or
//! `API_KEY`) environment variable overrides the file.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use auditros_core::config::{GeminiConfig, SecretConfig};
use auditros_core::secret::SecretService;

use crate::storage::AtomicFile;

const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

#[derive(Clone)]
pub struct SecretServiceImpl {
    file: Arc<AtomicFile<SecretConfig>>,
    /// Cached secret config, filled on first access.
    secrets: Arc<RwLock<Option<SecretConfig>>>,
}

impl SecretServiceImpl {
    pub fn new(path: PathBuf) -> Self {
        Self {
            file: Arc::new(AtomicFile::new(path)),
            secrets: Arc::new(RwLock::new(None)),
        }
    }

    fn load_secrets_internal(&self) -> Result<SecretConfig, String> {
        if let Ok(read_lock) = self.secrets.read() {
            if let Some(ref cached) = *read_lock {
                return Ok(cached.clone());
            }
        }

        let from_file = self
            .file
            .load()
            .map_err(|e| format!("Failed to load secret.json: {}", e))?
            .unwrap_or_default();
        let loaded = apply_env_override(from_file, env_api_key());

        if let Ok(mut write_lock) = self.secrets.write() {
            *write_lock = Some(loaded.clone());
        }
        Ok(loaded)
    }
}

#[async_trait::async_trait]
impl SecretService for SecretServiceImpl {
    async fn load_secrets(&self) -> Result<SecretConfig, String> {
        self.load_secrets_internal()
    }
}

fn env_api_key() -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

fn apply_env_override(mut secrets: SecretConfig, env_key: Option<String>) -> SecretConfig {
    if let Some(api_key) = env_key {
        secrets.gemini = Some(GeminiConfig { api_key });
    }
    secrets
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_env_key_overrides_file() {
        let file = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "from-file".into(),
            }),
        };
        let merged = apply_env_override(file, Some("from-env".into()));
        assert_eq!(merged.gemini.unwrap().api_key, "from-env");
    }

    #[test]
    fn test_file_key_kept_without_env() {
        let file = SecretConfig {
            gemini: Some(GeminiConfig {
                api_key: "from-file".into(),
            }),
        };
        let merged = apply_env_override(file, None);
        assert_eq!(merged.gemini.unwrap().api_key, "from-file");
    }

    #[tokio::test]
    async fn test_loads_secret_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, r#"{"gemini":{"api_key":"abc"}}"#).unwrap();

        let service = SecretServiceImpl::new(path);
        let secrets = service.load_secrets().await.unwrap();
        // The environment may provide a key too; either way one is present
        assert!(secrets.gemini.is_some());
    }

    #[tokio::test]
    async fn test_malformed_secret_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("secret.json");
        std::fs::write(&path, "{ not json").unwrap();

        let service = SecretServiceImpl::new(path);
        assert!(service.load_secrets().await.is_err());
    }
}
