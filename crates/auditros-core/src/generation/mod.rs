//! Generation vocabulary shared by the client and the application layer.
//!
//! - `mode`: Requested mode and the model/tool choices it implies
//! - `request`: Tagged request type, one variant per generation kind
//! - `response`: Normalized output (`text`, `sources`, optional media)
//! - `error`: Structured failure classification
//! - `client`: The `GenerationClient` trait

mod client;
mod error;
mod mode;
mod request;
mod response;

pub use client::GenerationClient;
pub use error::{GenerationError, GenerationErrorKind};
pub use mode::{GenerationMode, SPEECH_MODEL, thinking_budget_for};
pub use request::{
    Content, ContentPart, GenerationRequest, ImageRequest, InlineImage, SpeechRequest,
    TextRequest, ToolSet, TurnRole, VideoRequest,
};
pub use response::{GenerationOutput, MediaPayload};
