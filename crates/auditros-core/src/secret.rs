//! Secret management service trait.

use crate::config::SecretConfig;

/// Service for loading API keys.
///
/// Implementations must never log key material or include it in errors.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    /// Loads the secret configuration.
    async fn load_secrets(&self) -> Result<SecretConfig, String>;

    /// Returns the Gemini API key, if one is configured anywhere.
    async fn gemini_api_key(&self) -> Option<String> {
        self.load_secrets()
            .await
            .ok()
            .and_then(|secrets| secrets.gemini)
            .map(|gemini| gemini.api_key)
            .filter(|key| !key.trim().is_empty())
    }
}
