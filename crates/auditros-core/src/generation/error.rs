use thiserror::Error;

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationErrorKind {
    QuotaExhausted,
    Http,
    Transport,
    InvalidResponse,
    VideoFailed,
    VideoTimedOut,
    Configuration,
}

/// Failure at the generation client boundary.
#[derive(Error, Debug, Clone)]
pub enum GenerationError {
    /// HTTP 429 or an API error with status `RESOURCE_EXHAUSTED`.
    #[error("Quota exhausted: {message}")]
    QuotaExhausted { message: String },

    /// Any other non-success HTTP status.
    #[error("Generation API returned {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never produced a response (connect, timeout, TLS).
    #[error("Generation request failed: {0}")]
    Transport(String),

    /// The response body could not be interpreted.
    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),

    /// The video job finished with an error.
    #[error("Video generation failed: {0}")]
    VideoFailed(String),

    /// The video job was still running after the attempt budget.
    #[error("Video generation did not finish after {attempts} polls")]
    VideoTimedOut { attempts: u32 },

    /// Missing API key or similar.
    #[error("Generation client misconfigured: {0}")]
    Configuration(String),
}

impl GenerationError {
    pub fn kind(&self) -> GenerationErrorKind {
        match self {
            Self::QuotaExhausted { .. } => GenerationErrorKind::QuotaExhausted,
            Self::Http { .. } => GenerationErrorKind::Http,
            Self::Transport(_) => GenerationErrorKind::Transport,
            Self::InvalidResponse(_) => GenerationErrorKind::InvalidResponse,
            Self::VideoFailed(_) => GenerationErrorKind::VideoFailed,
            Self::VideoTimedOut { .. } => GenerationErrorKind::VideoTimedOut,
            Self::Configuration(_) => GenerationErrorKind::Configuration,
        }
    }

    pub fn is_quota_exhausted(&self) -> bool {
        self.kind() == GenerationErrorKind::QuotaExhausted
    }
}
