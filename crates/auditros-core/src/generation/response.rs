use crate::session::GroundingSource;

/// Media produced by image, video, or speech generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaPayload {
    /// Bytes returned in the response body (base64)
    Inline { mime_type: String, data: String },
    /// A downloadable resource. The URI carries no credentials.
    Remote { mime_type: String, uri: String },
}

impl MediaPayload {
    pub fn mime_type(&self) -> &str {
        match self {
            Self::Inline { mime_type, .. } | Self::Remote { mime_type, .. } => mime_type,
        }
    }
}

/// Every generation call is normalized to this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    pub text: String,
    /// Citations in response order
    pub sources: Vec<GroundingSource>,
    pub media: Option<MediaPayload>,
}

impl GenerationOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}
