//! Generation requests.
//!
//! Each kind of generation carries only the fields it uses, so a request
//! cannot, for example, ask for a thinking budget on a video job.

use serde::{Deserialize, Serialize};

/// Speaker of a turn, in the API's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Model,
}

/// Base64 media sent inline with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    /// Base64-encoded bytes
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Text(String),
    InlineData(InlineImage),
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    pub role: TurnRole,
    pub parts: Vec<ContentPart>,
}

impl Content {
    pub fn text(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![ContentPart::Text(text.into())],
        }
    }
}

/// Server-side tools enabled for a text request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolSet {
    pub google_search: bool,
    pub google_maps: bool,
}

impl ToolSet {
    pub fn is_empty(&self) -> bool {
        !self.google_search && !self.google_maps
    }
}

/// Text generation with optional grounding and extended reasoning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub model: String,
    /// Ordered turns, oldest first; the last one is the new user turn.
    pub contents: Vec<Content>,
    pub system_instruction: Option<String>,
    pub tools: ToolSet,
    pub thinking_budget: Option<u32>,
    /// Ask for a JSON body instead of prose.
    pub json_response: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub reference: Option<InlineImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    pub model: String,
    pub prompt: String,
    pub image: Option<InlineImage>,
    pub aspect_ratio: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub model: String,
    pub text: String,
    pub voice: String,
}

/// A request to the hosted generation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationRequest {
    Text(TextRequest),
    Image(ImageRequest),
    Video(VideoRequest),
    Speech(SpeechRequest),
}

impl GenerationRequest {
    pub fn model(&self) -> &str {
        match self {
            Self::Text(r) => &r.model,
            Self::Image(r) => &r.model,
            Self::Video(r) => &r.model,
            Self::Speech(r) => &r.model,
        }
    }

    /// Short label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Image(_) => "image",
            Self::Video(_) => "video",
            Self::Speech(_) => "speech",
        }
    }
}
