use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Text-to-speech model.
pub const SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

const PRO_BUDGET: u32 = 32768;
const FLASH_BUDGET: u32 = 24576;

/// What the user asked the assistant to do with a prompt.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GenerationMode {
    /// Low-latency answers
    Fast,
    /// Grounded with web and maps search
    #[default]
    Search,
    /// Extended reasoning with web search
    Thinking,
    /// Strongest model, no tools
    Complex,
    Image,
    Video,
}

impl GenerationMode {
    /// Model identifier used for this mode.
    pub fn model_name(&self) -> &'static str {
        match self {
            Self::Complex | Self::Thinking => "gemini-3-pro-preview",
            Self::Search => "gemini-3-flash-preview",
            Self::Fast => "gemini-flash-lite-latest",
            Self::Image => "gemini-2.5-flash-image",
            Self::Video => "veo-3.1-fast-generate-preview",
        }
    }

    pub fn uses_google_search(&self) -> bool {
        matches!(self, Self::Search | Self::Thinking)
    }

    pub fn uses_google_maps(&self) -> bool {
        matches!(self, Self::Search)
    }

    /// Extended-reasoning budget, only for `thinking`.
    pub fn thinking_budget(&self) -> Option<u32> {
        matches!(self, Self::Thinking).then(|| thinking_budget_for(self.model_name()))
    }

    /// Image and video replies carry media rather than a technical answer.
    pub fn is_media(&self) -> bool {
        matches!(self, Self::Image | Self::Video)
    }
}

/// Reasoning budget a model accepts: the larger one for "pro" models.
pub fn thinking_budget_for(model: &str) -> u32 {
    if model.contains("pro") {
        PRO_BUDGET
    } else {
        FLASH_BUDGET
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_only_thinking_has_budget() {
        for mode in GenerationMode::iter() {
            match mode {
                GenerationMode::Thinking => assert_eq!(mode.thinking_budget(), Some(32768)),
                _ => assert_eq!(mode.thinking_budget(), None),
            }
        }
    }

    #[test]
    fn test_budget_follows_model_family() {
        assert_eq!(thinking_budget_for("gemini-3-pro-preview"), 32768);
        assert_eq!(thinking_budget_for("gemini-2.5-flash"), 24576);
    }

    #[test]
    fn test_search_tools() {
        assert!(GenerationMode::Search.uses_google_search());
        assert!(GenerationMode::Search.uses_google_maps());
        assert!(GenerationMode::Thinking.uses_google_search());
        assert!(!GenerationMode::Thinking.uses_google_maps());
        assert!(!GenerationMode::Fast.uses_google_search());
        assert!(!GenerationMode::Complex.uses_google_search());
    }

    #[test]
    fn test_parse() {
        assert_eq!(GenerationMode::from_str("THINKING").unwrap(), GenerationMode::Thinking);
        assert_eq!(GenerationMode::Fast.to_string(), "fast");
    }
}
