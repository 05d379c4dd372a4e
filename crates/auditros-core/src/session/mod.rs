//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: Persisted chat session (`ChatSession`)
//! - `message`: Conversation message types (`MessageRole`, `Message`, `GroundingSource`)
//! - `repository`: Repository trait for session persistence
//!
//! # Usage
//!
//! ```ignore
//! use auditros_core::session::{ChatSession, Message, SessionRepository};
//! ```

mod message;
mod model;
mod repository;

// Re-export public API
pub use message::{GroundingSource, Message, MessageRole};
pub use model::{ChatSession, DEFAULT_SESSION_TITLE, derive_title};
pub use repository::SessionRepository;
