//! Infrastructure layer for Auditros.
//!
//! File-backed implementations of the core repository traits, path
//! resolution, configuration and secret loading, and evidence document
//! loading.

pub mod chat_history_store;
pub mod config_service;
pub mod document_loader;
pub mod experience_store;
pub mod paths;
pub mod secret_service;
pub mod storage;
pub mod user_registry_store;

pub use chat_history_store::ChatHistoryStore;
pub use config_service::ConfigService;
pub use document_loader::load_document;
pub use experience_store::ExperienceStore;
pub use paths::AuditrosPaths;
pub use secret_service::SecretServiceImpl;
pub use storage::JsonFileStore;
pub use user_registry_store::UserRegistryStore;
