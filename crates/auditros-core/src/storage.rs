//! Key-value persistence seam.
//!
//! The local store keeps each record kind as one serialized blob under a
//! fixed key. Implementations decide where the blobs live.

use crate::error::Result;

/// Blob storage keyed by string.
pub trait KeyValueStore: Send + Sync {
    /// Returns the blob stored under `key`, or `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous blob.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Replaces the blob under `key` with `f(current)` while holding the
    /// key's write lock, so concurrent updates are applied one after another.
    fn update(
        &self,
        key: &str,
        f: &mut dyn FnMut(Option<String>) -> Result<String>,
    ) -> Result<()>;

    /// Removes the blob under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
