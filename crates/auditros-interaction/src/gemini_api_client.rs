//! GeminiApiClient - Direct REST API implementation for Gemini.
//!
//! Covers four kinds of generation behind one `GenerationClient`:
//! text with optional grounding tools and thinking budget, image, speech,
//! and video (`predictLongRunning` plus operation polling). Every response
//! is normalized into `GenerationOutput`.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use auditros_core::config::AppConfig;
use auditros_core::generation::{
    Content, ContentPart, GenerationClient, GenerationError, GenerationOutput, GenerationRequest,
    ImageRequest, InlineImage, MediaPayload, SpeechRequest, TextRequest, TurnRole, VideoRequest,
};
use auditros_core::session::GroundingSource;

use crate::video_job::{OperationStatus, VideoPollPolicy, drive_video_job};

/// Text used when the model returns no text at all.
pub const EMPTY_RESPONSE_TEXT: &str = "SYSTEM ERROR: NO TECHNICAL DATA GENERATED.";
const DEFAULT_SOURCE_TITLE: &str = "OFFICIAL SOURCE";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for the Gemini HTTP API.
#[derive(Clone)]
pub struct GeminiApiClient {
    client: Client,
    api_key: Arc<RwLock<String>>,
    base_url: String,
    video_policy: VideoPollPolicy,
}

impl GeminiApiClient {
    /// Creates a client with the provided API key and the public endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Arc::new(RwLock::new(api_key.into())),
            base_url: auditros_core::config::DEFAULT_API_BASE_URL.to_string(),
            video_policy: VideoPollPolicy::default(),
        }
    }

    /// Creates a client using the endpoint and polling policy from `config`.
    pub fn from_config(api_key: impl Into<String>, config: &AppConfig) -> Self {
        Self::new(api_key)
            .with_base_url(config.generation.base_url.clone())
            .with_video_policy(VideoPollPolicy::from(&config.video))
    }

    /// Overrides the endpoint root (everything before `/models`).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_video_policy(mut self, policy: VideoPollPolicy) -> Self {
        self.video_policy = policy;
        self
    }

    fn current_key(&self) -> Result<String, GenerationError> {
        let key = self
            .api_key
            .read()
            .map(|key| key.clone())
            .map_err(|_| GenerationError::Configuration("API key lock poisoned".into()))?;
        if key.trim().is_empty() {
            return Err(GenerationError::Configuration(
                "No Gemini API key configured".into(),
            ));
        }
        Ok(key)
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        format!("{}/models/{model}:{method}", self.base_url)
    }

    async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
        &self,
        url: String,
        body: &B,
    ) -> Result<R, GenerationError> {
        let api_key = self.current_key()?;
        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(body)
            .send()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        read_json(response).await
    }

    async fn get_json<R: for<'de> Deserialize<'de>>(&self, url: String) -> Result<R, GenerationError> {
        let api_key = self.current_key()?;
        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        read_json(response).await
    }

    async fn generate_text(&self, request: TextRequest) -> Result<GenerationOutput, GenerationError> {
        let body = build_text_body(&request);
        let parsed: GenerateContentResponse = self
            .post_json(self.model_url(&request.model, "generateContent"), &body)
            .await?;

        Ok(GenerationOutput {
            text: extract_text(&parsed).unwrap_or_else(|| EMPTY_RESPONSE_TEXT.to_string()),
            sources: extract_sources(&parsed),
            media: None,
        })
    }

    async fn generate_image(&self, request: ImageRequest) -> Result<GenerationOutput, GenerationError> {
        let mut parts = Vec::new();
        if let Some(reference) = &request.reference {
            parts.push(WirePart::inline(reference));
        }
        parts.push(WirePart::Text {
            text: request.prompt.clone(),
        });

        let body = GenerateContentRequest {
            contents: vec![WireContent {
                role: Some("user".to_string()),
                parts,
            }],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: Some(WireGenerationConfig {
                response_modalities: Some(vec!["TEXT".into(), "IMAGE".into()]),
                ..Default::default()
            }),
        };

        let parsed: GenerateContentResponse = self
            .post_json(self.model_url(&request.model, "generateContent"), &body)
            .await?;

        let media = extract_inline_media(&parsed).ok_or_else(|| {
            GenerationError::InvalidResponse("Image response contained no image data".into())
        })?;

        Ok(GenerationOutput {
            text: extract_text(&parsed).unwrap_or_else(|| "IMAGE GENERATED.".to_string()),
            sources: Vec::new(),
            media: Some(media),
        })
    }

    async fn synthesize_speech(
        &self,
        request: SpeechRequest,
    ) -> Result<GenerationOutput, GenerationError> {
        let body = GenerateContentRequest {
            contents: vec![WireContent {
                role: Some("user".to_string()),
                parts: vec![WirePart::Text {
                    text: request.text.clone(),
                }],
            }],
            system_instruction: None,
            tools: Vec::new(),
            generation_config: Some(WireGenerationConfig {
                response_modalities: Some(vec!["AUDIO".into()]),
                speech_config: Some(SpeechConfig {
                    voice_config: VoiceConfig {
                        prebuilt_voice_config: PrebuiltVoiceConfig {
                            voice_name: request.voice.clone(),
                        },
                    },
                }),
                ..Default::default()
            }),
        };

        let parsed: GenerateContentResponse = self
            .post_json(self.model_url(&request.model, "generateContent"), &body)
            .await?;

        let media = extract_inline_media(&parsed).ok_or_else(|| {
            GenerationError::InvalidResponse("Speech response contained no audio data".into())
        })?;

        Ok(GenerationOutput {
            text: request.text,
            sources: Vec::new(),
            media: Some(media),
        })
    }

    async fn generate_video(&self, request: VideoRequest) -> Result<GenerationOutput, GenerationError> {
        let body = PredictLongRunningRequest {
            instances: vec![VideoInstance {
                prompt: request.prompt.clone(),
                image: request.image.as_ref().map(|image| VideoImage {
                    bytes_base64_encoded: image.data.clone(),
                    mime_type: image.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio.clone(),
            },
        };

        let operation: OperationResponse = self
            .post_json(self.model_url(&request.model, "predictLongRunning"), &body)
            .await?;
        tracing::info!("[GeminiApiClient] Video job submitted: {}", operation.name);

        // The submit response may already be done
        let uri = match operation_status(&operation) {
            OperationStatus::Done { uri } => uri,
            OperationStatus::Error { message } => return Err(GenerationError::VideoFailed(message)),
            OperationStatus::Pending => {
                drive_video_job(operation.name.clone(), self.video_policy, |name| {
                    self.poll_operation(name)
                })
                .await?
            }
        };

        Ok(GenerationOutput {
            text: "VIDEO RENDER COMPLETE.".to_string(),
            sources: Vec::new(),
            media: Some(MediaPayload::Remote {
                mime_type: "video/mp4".to_string(),
                uri,
            }),
        })
    }

    async fn poll_operation(&self, name: String) -> Result<OperationStatus, GenerationError> {
        let url = format!("{}/{}", self.base_url, name.trim_start_matches('/'));
        let operation: OperationResponse = self.get_json(url).await?;
        Ok(operation_status(&operation))
    }
}

#[async_trait]
impl GenerationClient for GeminiApiClient {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GenerationOutput, GenerationError> {
        tracing::info!(
            "[GeminiApiClient] {} request to {}",
            request.kind(),
            request.model()
        );

        let result = match request {
            GenerationRequest::Text(r) => self.generate_text(r).await,
            GenerationRequest::Image(r) => self.generate_image(r).await,
            GenerationRequest::Video(r) => self.generate_video(r).await,
            GenerationRequest::Speech(r) => self.synthesize_speech(r).await,
        };

        if let Err(err) = &result {
            tracing::error!("[GeminiApiClient] Generation failed: {}", err);
        }
        result
    }

    async fn download_video(&self, uri: &str) -> Result<Vec<u8>, GenerationError> {
        let api_key = self.current_key()?;
        let response = self
            .client
            .get(uri)
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| GenerationError::Transport(err.to_string()))?;
        Ok(bytes.to_vec())
    }

    fn rotate_api_key(&self, api_key: String) {
        if let Ok(mut key) = self.api_key.write() {
            *key = api_key;
            tracing::info!("[GeminiApiClient] API key rotated");
        }
    }
}

async fn read_json<R: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<R, GenerationError> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
        return Err(map_http_error(status, body));
    }

    response
        .json()
        .await
        .map_err(|err| GenerationError::InvalidResponse(format!("Failed to parse Gemini response: {err}")))
}

// ============================================================================
// Request wire format
// ============================================================================

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<WireGenerationConfig>,
}

#[derive(Serialize, Debug)]
struct WireContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<WirePart>,
}

#[derive(Serialize, Debug)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

impl WirePart {
    fn inline(image: &InlineImage) -> Self {
        Self::InlineData {
            inline_data: InlineDataPayload {
                mime_type: image.mime_type.clone(),
                data: image.data.clone(),
            },
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct WireTool {
    #[serde(skip_serializing_if = "Option::is_none")]
    google_search: Option<EmptyConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    google_maps: Option<EmptyConfig>,
}

#[derive(Serialize, Debug, Default)]
struct EmptyConfig {}

#[derive(Serialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    voice_config: VoiceConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Serialize, Debug)]
struct PredictLongRunningRequest {
    instances: Vec<VideoInstance>,
    parameters: VideoParameters,
}

#[derive(Serialize, Debug)]
struct VideoInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<VideoImage>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct VideoImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: String,
}

fn wire_content(content: &Content) -> WireContent {
    let role = match content.role {
        TurnRole::User => "user",
        TurnRole::Model => "model",
    };
    WireContent {
        role: Some(role.to_string()),
        parts: content
            .parts
            .iter()
            .map(|part| match part {
                ContentPart::Text(text) => WirePart::Text { text: text.clone() },
                ContentPart::InlineData(image) => WirePart::inline(image),
            })
            .collect(),
    }
}

fn build_text_body(request: &TextRequest) -> GenerateContentRequest {
    let tools = if request.tools.is_empty() {
        Vec::new()
    } else {
        vec![WireTool {
            google_search: request.tools.google_search.then(EmptyConfig::default),
            google_maps: request.tools.google_maps.then(EmptyConfig::default),
        }]
    };

    let generation_config = if request.thinking_budget.is_some() || request.json_response {
        Some(WireGenerationConfig {
            thinking_config: request
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            response_mime_type: request
                .json_response
                .then(|| "application/json".to_string()),
            ..Default::default()
        })
    } else {
        None
    };

    GenerateContentRequest {
        contents: request.contents.iter().map(wire_content).collect(),
        system_instruction: request.system_instruction.as_ref().map(|text| WireContent {
            role: None,
            parts: vec![WirePart::Text { text: text.clone() }],
        }),
        tools,
        generation_config,
    }
}

// ============================================================================
// Response wire format
// ============================================================================

#[derive(Deserialize, Debug)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Deserialize, Debug)]
struct ContentResponse {
    parts: Option<Vec<PartResponse>>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineDataPayload>,
    #[serde(default)]
    thought: bool,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    grounding_chunks: Option<Vec<GroundingChunk>>,
}

#[derive(Deserialize, Debug)]
struct GroundingChunk {
    web: Option<WebChunk>,
}

#[derive(Deserialize, Debug)]
struct WebChunk {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Deserialize, Debug)]
struct OperationResponse {
    name: String,
    #[serde(default)]
    done: bool,
    error: Option<ErrorBody>,
    response: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    #[allow(dead_code)]
    code: Option<i32>,
    message: Option<String>,
    status: Option<String>,
}

fn first_candidate_parts(response: &GenerateContentResponse) -> &[PartResponse] {
    response
        .candidates
        .as_ref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.as_deref())
        .unwrap_or(&[])
}

/// Concatenated non-thought text parts of the first candidate.
fn extract_text(response: &GenerateContentResponse) -> Option<String> {
    let text: String = first_candidate_parts(response)
        .iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text.as_deref())
        .collect();

    if text.trim().is_empty() { None } else { Some(text) }
}

/// Web grounding chunks of the first candidate, in response order.
fn extract_sources(response: &GenerateContentResponse) -> Vec<GroundingSource> {
    response
        .candidates
        .as_ref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.grounding_metadata.as_ref())
        .and_then(|metadata| metadata.grounding_chunks.as_ref())
        .map(|chunks| {
            chunks
                .iter()
                .filter_map(|chunk| chunk.web.as_ref())
                .map(|web| GroundingSource {
                    title: web
                        .title
                        .clone()
                        .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string()),
                    uri: web.uri.clone().unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn extract_inline_media(response: &GenerateContentResponse) -> Option<MediaPayload> {
    first_candidate_parts(response)
        .iter()
        .find_map(|part| part.inline_data.as_ref())
        .map(|inline| MediaPayload::Inline {
            mime_type: inline.mime_type.clone(),
            data: inline.data.clone(),
        })
}

fn operation_status(operation: &OperationResponse) -> OperationStatus {
    if let Some(error) = &operation.error {
        return OperationStatus::Error {
            message: error
                .message
                .clone()
                .unwrap_or_else(|| "Video operation failed".to_string()),
        };
    }
    if !operation.done {
        return OperationStatus::Pending;
    }

    let uri = operation
        .response
        .as_ref()
        .and_then(|response| response.get("generateVideoResponse"))
        .and_then(|video| video.get("generatedSamples"))
        .and_then(|samples| samples.get(0))
        .and_then(|sample| sample.get("video"))
        .and_then(|video| video.get("uri"))
        .and_then(|uri| uri.as_str());

    match uri {
        Some(uri) => OperationStatus::Done {
            uri: uri.to_string(),
        },
        None => OperationStatus::Error {
            message: "Video operation finished without a video".to_string(),
        },
    }
}

/// Maps a non-success response to a structured error.
///
/// Quota exhaustion is recognized by HTTP 429 or the API error status
/// `RESOURCE_EXHAUSTED`; the message text is never inspected.
pub fn map_http_error(status: StatusCode, body: String) -> GenerationError {
    let parsed = serde_json::from_str::<ErrorWrapper>(&body).ok();
    let api_status = parsed
        .as_ref()
        .and_then(|wrapper| wrapper.error.status.clone())
        .unwrap_or_default();
    let message = parsed
        .and_then(|wrapper| wrapper.error.message)
        .unwrap_or(body);

    if status == StatusCode::TOO_MANY_REQUESTS || api_status == "RESOURCE_EXHAUSTED" {
        return GenerationError::QuotaExhausted { message };
    }

    let message = if api_status.is_empty() {
        message
    } else {
        format!("{api_status}: {message}")
    };
    GenerationError::Http {
        status: status.as_u16(),
        message,
    }
}
