//! Whole-collection blobs.
//!
//! Reads never fail: a missing, unreadable, or undecodable blob is logged
//! and treated as an empty collection. Writes propagate errors. Changes go
//! through [`update_list`], which holds the key's lock across the whole
//! read-modify-write.

use serde::{Serialize, de::DeserializeOwned};

use auditros_core::{AuditrosError, Result};
use auditros_core::storage::KeyValueStore;

pub(crate) fn load_list<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Vec<T> {
    load_value(store, key).unwrap_or_default()
}

pub(crate) fn load_value<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("[LocalStore] Failed to read '{}': {}", key, e);
            return None;
        }
    };

    decode(key, &raw)
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("[LocalStore] Discarding unreadable '{}': {}", key, e);
            None
        }
    }
}

/// Applies `f` to the stored list under the key's lock and writes it back.
///
/// Returns whatever `f` returns. An unreadable blob is replaced.
pub(crate) fn update_list<T, R, F>(store: &dyn KeyValueStore, key: &str, f: F) -> Result<R>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce(&mut Vec<T>) -> R,
{
    let mut f = Some(f);
    let mut outcome = None;
    store.update(key, &mut |current| {
        let mut list: Vec<T> = current
            .as_deref()
            .and_then(|raw| decode(key, raw))
            .unwrap_or_default();
        if let Some(f) = f.take() {
            outcome = Some(f(&mut list));
        }
        Ok(serde_json::to_string(&list)?)
    })?;
    outcome.ok_or_else(|| AuditrosError::data_access(format!("Update of '{key}' did not run")))
}

pub(crate) fn store_value<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    let serialized = serde_json::to_string(value)?;
    store.set(key, &serialized)
}
