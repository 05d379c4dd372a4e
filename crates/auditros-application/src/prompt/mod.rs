//! Prompt composition for text generation.

mod composer;
mod templates;

pub use composer::{
    ComposeInput, DOCUMENT_PLACEHOLDER, NO_EVIDENCE_CONTEXT, PromptComposer, document_context,
};
