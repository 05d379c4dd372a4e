//! External interaction layer for Auditros.
//!
//! - `gemini_api_client`: REST client for text, image, video, and speech generation
//! - `video_job`: polling state machine for long-running video jobs
//! - `live`: real-time voice session (PCM framing, playback scheduling, session driver)

pub mod gemini_api_client;
pub mod live;
pub mod video_job;

pub use gemini_api_client::GeminiApiClient;
pub use video_job::{VideoJobState, VideoPollPolicy};
