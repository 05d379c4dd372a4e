//! Application configuration types.
//!
//! `AppConfig` maps to `config.toml`; `SecretConfig` maps to `secret.json`.
//! Every section has defaults so a missing or partial file still loads.

use serde::{Deserialize, Serialize};

use crate::generation::GenerationMode;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_LIVE_MODEL: &str = "gemini-2.5-flash-native-audio-preview-12-2025";
pub const DEFAULT_LIVE_VOICE: &str = "Zephyr";
pub const DEFAULT_LIVE_INSTRUCTION: &str = "You are Auditros Live AI. Assist with real-time auditing queries via voice. Cite standards and paragraphs briefly.";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationSettings,
    pub video: VideoPollSettings,
    pub live: LiveSettings,
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationSettings {
    /// Mode used for plain messages
    pub default_mode: GenerationMode,
    /// REST endpoint root, without the `/models` suffix
    pub base_url: String,
    /// Voice used for speech synthesis
    pub speech_voice: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            default_mode: GenerationMode::Thinking,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            speech_voice: "Kore".to_string(),
        }
    }
}

/// Polling policy for long-running video jobs.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct VideoPollSettings {
    pub initial_interval_secs: u64,
    pub max_interval_secs: u64,
    pub max_attempts: u32,
}

impl Default for VideoPollSettings {
    fn default() -> Self {
        Self {
            initial_interval_secs: 10,
            max_interval_secs: 60,
            max_attempts: 30,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LiveSettings {
    pub model: String,
    pub voice: String,
    pub system_instruction: String,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_LIVE_MODEL.to_string(),
            voice: DEFAULT_LIVE_VOICE.to_string(),
            system_instruction: DEFAULT_LIVE_INSTRUCTION.to_string(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Contents of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
}
