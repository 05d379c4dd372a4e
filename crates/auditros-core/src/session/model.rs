//! Persisted chat session.

use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::clock;
use crate::section::AuditSection;

/// Title given to a session before its first user message.
pub const DEFAULT_SESSION_TITLE: &str = "New Audit";

const TITLE_MAX_CHARS: usize = 30;
const TITLE_KEEP_CHARS: usize = 27;

/// A conversation thread within one audit module.
///
/// Stored as a whole record; every save rewrites it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    /// Wall-clock id (epoch milliseconds)
    pub id: String,
    pub title: String,
    pub section: AuditSection,
    pub messages: Vec<Message>,
    /// Epoch milliseconds of the last append
    pub last_update: i64,
}

impl ChatSession {
    /// Starts an empty session for the given module.
    pub fn new(section: AuditSection) -> Self {
        let now = clock::now_millis();
        Self {
            id: now.to_string(),
            title: DEFAULT_SESSION_TITLE.to_string(),
            section,
            messages: Vec::new(),
            last_update: now,
        }
    }

    /// Appends a message and refreshes `last_update`.
    ///
    /// The first user message names the session.
    pub fn push_message(&mut self, message: Message) {
        if message.is_user() && !self.messages.iter().any(Message::is_user) {
            self.title = derive_title(&message.content);
        }
        self.messages.push(message);
        self.last_update = clock::now_millis();
    }
}

/// Derives a session title from the first user message.
///
/// Messages longer than 30 characters are cut to 27 characters plus `...`.
pub fn derive_title(first_message: &str) -> String {
    if first_message.chars().count() > TITLE_MAX_CHARS {
        let head: String = first_message.chars().take(TITLE_KEEP_CHARS).collect();
        format!("{head}...")
    } else {
        first_message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_title_is_truncated() {
        let title = derive_title("Review the 2024 inventory valuation policy for compliance gaps");
        assert_eq!(title, "Review the 2024 inventory v...");
        assert_eq!(title.chars().count(), 30);
    }

    #[test]
    fn test_short_title_is_verbatim() {
        assert_eq!(derive_title("Check SA 240"), "Check SA 240");
    }

    #[test]
    fn test_exactly_thirty_chars_is_verbatim() {
        let message = "a".repeat(30);
        assert_eq!(derive_title(&message), message);
    }

    #[test]
    fn test_only_first_user_message_names_session() {
        let mut session = ChatSession::new(AuditSection::AuditObservation);
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);

        session.push_message(Message::assistant("MODULE AUDIT OBSERVATION LOADED."));
        assert_eq!(session.title, DEFAULT_SESSION_TITLE);

        session.push_message(Message::user("Check SA 240"));
        session.push_message(Message::user("Now check SA 500 as well"));
        assert_eq!(session.title, "Check SA 240");
        assert_eq!(session.messages.len(), 3);
    }
}
