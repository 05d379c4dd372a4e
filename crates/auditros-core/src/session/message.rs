//! Conversation message types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A citation returned alongside a generated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// A single message in a conversation panel.
///
/// Messages are never edited after creation; a panel's order of insertion
/// is its display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Wall-clock id (epoch milliseconds).
    pub id: String,
    pub role: MessageRole,
    /// Plain text, possibly multi-line.
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<GroundingSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_searching: Option<bool>,
}

impl Message {
    fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: clock::wall_clock_id(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            sources: None,
            is_searching: None,
        }
    }

    /// Creates a user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Creates an assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// Creates an assistant message carrying grounding citations.
    ///
    /// An empty source list is stored as an empty list, not as `None`, so the
    /// transcript records that grounding was attempted.
    pub fn assistant_with_sources(
        content: impl Into<String>,
        sources: Vec<GroundingSource>,
    ) -> Self {
        let mut message = Self::new(MessageRole::Assistant, content);
        message.sources = Some(sources);
        message
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let message = Message::user("Check SA 240");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json.get("sources").is_none());
        assert!(json.get("isSearching").is_none());
    }

    #[test]
    fn test_assistant_with_sources_keeps_order() {
        let message = Message::assistant_with_sources(
            "answer",
            vec![
                GroundingSource {
                    title: "ICAI".into(),
                    uri: "https://www.icai.org".into(),
                },
                GroundingSource {
                    title: "MCA".into(),
                    uri: "https://www.mca.gov.in".into(),
                },
            ],
        );
        let sources = message.sources.unwrap();
        assert_eq!(sources[0].title, "ICAI");
        assert_eq!(sources[1].title, "MCA");
    }
}
