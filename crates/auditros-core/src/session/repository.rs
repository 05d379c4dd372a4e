//! Session repository trait.

use super::model::ChatSession;
use crate::error::Result;

/// An abstract repository for chat session persistence.
///
/// Sessions are upserted whole by id. Implementations return `list_all`
/// ordered by `last_update`, most recent first.
pub trait SessionRepository: Send + Sync {
    /// Inserts the session, or replaces the stored record with the same id.
    fn save(&self, session: &ChatSession) -> Result<()>;

    /// Lists all stored sessions, most recently updated first.
    ///
    /// Unreadable storage yields an empty list.
    fn list_all(&self) -> Vec<ChatSession>;

    /// Finds a session by its id.
    fn find_by_id(&self, session_id: &str) -> Option<ChatSession> {
        self.list_all().into_iter().find(|s| s.id == session_id)
    }

    /// Removes the session with the given id. Missing ids are not an error.
    fn delete(&self, session_id: &str) -> Result<()>;
}
