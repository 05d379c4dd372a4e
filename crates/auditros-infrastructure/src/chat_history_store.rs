//! Chat session history store.

use std::sync::Arc;

use auditros_core::Result;
use auditros_core::session::{ChatSession, SessionRepository};
use auditros_core::storage::KeyValueStore;

use crate::storage::collection::{load_list, update_list};
use crate::storage::keys;

/// All chat sessions, stored as one list and upserted by id.
#[derive(Clone)]
pub struct ChatHistoryStore {
    store: Arc<dyn KeyValueStore>,
}

impl ChatHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn load_unsorted(&self) -> Vec<ChatSession> {
        load_list(self.store.as_ref(), keys::CHAT_HISTORY)
    }
}

impl SessionRepository for ChatHistoryStore {
    fn save(&self, session: &ChatSession) -> Result<()> {
        update_list(
            self.store.as_ref(),
            keys::CHAT_HISTORY,
            |sessions: &mut Vec<ChatSession>| match sessions
                .iter_mut()
                .find(|s| s.id == session.id)
            {
                Some(existing) => *existing = session.clone(),
                None => sessions.push(session.clone()),
            },
        )?;

        tracing::debug!(
            "[ChatHistoryStore] Saved session {} ({} messages)",
            session.id,
            session.messages.len()
        );
        Ok(())
    }

    fn list_all(&self) -> Vec<ChatSession> {
        let mut sessions = self.load_unsorted();
        sessions.sort_by(|a, b| b.last_update.cmp(&a.last_update));
        sessions
    }

    fn delete(&self, session_id: &str) -> Result<()> {
        update_list(
            self.store.as_ref(),
            keys::CHAT_HISTORY,
            |sessions: &mut Vec<ChatSession>| sessions.retain(|s| s.id != session_id),
        )
    }
}
