//! User registry domain module.
//!
//! - `model`: Registered user record (`AuthUser`)
//! - `repository`: Registry trait with the current-user pointer

mod model;
mod repository;

pub use model::AuthUser;
pub use repository::UserRepository;
