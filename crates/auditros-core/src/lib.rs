//! Domain layer for Auditros.
//!
//! Holds the conversation model, the institutional-memory and user records,
//! the generation request/response vocabulary shared by the client and the
//! application layer, and the repository traits the infrastructure crate
//! implements.

pub mod clock;
pub mod config;
pub mod document;
pub mod error;
pub mod experience;
pub mod generation;
pub mod secret;
pub mod section;
pub mod session;
pub mod storage;
pub mod user;

// Re-export common error type
pub use error::{AuditrosError, Result};
pub use section::AuditSection;
