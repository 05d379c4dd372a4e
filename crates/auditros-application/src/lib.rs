//! Application layer for Auditros.
//!
//! - `prompt`: builds text generation requests from the conversation state
//! - `learning`: distills answers into institutional memory
//! - `controller`: the session controller driven by the shell

pub mod controller;
pub mod learning;
pub mod prompt;

pub use controller::{ControllerDeps, Reply, SessionController};
pub use learning::LearningExtractor;
pub use prompt::PromptComposer;
