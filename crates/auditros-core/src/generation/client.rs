use async_trait::async_trait;

use super::error::GenerationError;
use super::request::GenerationRequest;
use super::response::GenerationOutput;

/// Access to the hosted generation API.
///
/// One instance is constructed at startup and shared by reference.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Runs a generation request to completion.
    ///
    /// Video requests return once the job is ready (or has failed).
    async fn generate(&self, request: GenerationRequest)
    -> Result<GenerationOutput, GenerationError>;

    /// Fetches a generated media resource returned as `MediaPayload::Remote`.
    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenerationError>;

    /// Replaces the API key used for subsequent requests.
    fn rotate_api_key(&self, api_key: String);
}
