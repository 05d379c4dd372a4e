//! Storage primitives.
//!
//! - `atomic_file`: temp-file + rename writes with advisory locking
//! - `json_file_store`: the local key-value store, one JSON file per key
//! - `collection`: helpers for stores that keep a whole list under one key

pub mod atomic_file;
pub(crate) mod collection;
mod json_file_store;

pub use atomic_file::{AtomicFile, FileFormat, FileLock};
pub use json_file_store::JsonFileStore;

/// Storage keys for the persisted blobs.
pub mod keys {
    pub const EXPERIENCE_BASE: &str = "auditros_experience_base";
    pub const CHAT_HISTORY: &str = "auditros_chat_history";
    pub const USER_REGISTRY: &str = "auditros_user_registry";
    pub const CURRENT_USER: &str = "auditros_current_user";
}
