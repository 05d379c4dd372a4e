//! Institutional memory store.

use std::sync::Arc;

use auditros_core::Result;
use auditros_core::experience::{AuditExperience, EXPERIENCE_CAPACITY, ExperienceRepository};
use auditros_core::storage::KeyValueStore;

use crate::storage::collection::{load_list, update_list};
use crate::storage::keys;

/// Keeps the 50 most recent learnings across all sections.
///
/// Every save rewrites the whole collection, sorted newest first.
#[derive(Clone)]
pub struct ExperienceStore {
    store: Arc<dyn KeyValueStore>,
}

impl ExperienceStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl ExperienceRepository for ExperienceStore {
    fn save_experience(&self, experience: AuditExperience) -> Result<()> {
        let count = update_list(
            self.store.as_ref(),
            keys::EXPERIENCE_BASE,
            |all: &mut Vec<AuditExperience>| {
                all.push(experience);
                all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                all.truncate(EXPERIENCE_CAPACITY);
                all.len()
            },
        )?;

        tracing::debug!("[ExperienceStore] Persisted {} experiences", count);
        Ok(())
    }

    fn get_all(&self) -> Vec<AuditExperience> {
        load_list(self.store.as_ref(), keys::EXPERIENCE_BASE)
    }
}
