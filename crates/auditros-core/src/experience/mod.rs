//! Institutional memory.
//!
//! Short learned sentences recorded per audit module and replayed into
//! later prompts for the same module.

mod model;
mod repository;

pub use model::{AuditExperience, Importance, QUERY_SUMMARY_MAX_CHARS};
pub use repository::{
    EXPERIENCE_CAPACITY, ExperienceRepository, RELEVANT_CONTEXT_LIMIT, render_memory_feed,
};
