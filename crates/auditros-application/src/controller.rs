//! Session controller.
//!
//! Owns the in-memory state of the assistant (active module, per-module
//! panel transcripts, the active chat session of each module, attached
//! evidence, and the generation mode) and runs every user action against
//! the injected stores and generation client.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use strum::IntoEnumIterator;
use tokio::task::JoinHandle;

use auditros_core::AuditSection;
use auditros_core::AuditrosError;
use auditros_core::document::AuditDocument;
use auditros_core::experience::ExperienceRepository;
use auditros_core::generation::{
    GenerationClient, GenerationError, GenerationMode, GenerationOutput, GenerationRequest,
    ImageRequest, InlineImage, MediaPayload, SPEECH_MODEL, SpeechRequest, VideoRequest,
};
use auditros_core::session::{ChatSession, Message, SessionRepository};
use auditros_core::user::{AuthUser, UserRepository};
use auditros_infrastructure::load_document;

use crate::learning::LearningExtractor;
use crate::prompt::{ComposeInput, PromptComposer};

pub const INITIAL_GREETING: &str = "COMMAND SYSTEM ONLINE ----------------\nGROUNDING: ICAI, MCA, TAX PORTAL SECURE TUNNELS.\nSELECT MODULE TO INITIATE INTEL SCAN.";
pub const QUOTA_EXHAUSTED_MESSAGE: &str = "RESOURCE EXHAUSTED ----------------\nLIMIT: FREE TIER QUOTA REACHED.\nACTION: ROTATE TO A PAID API KEY TO CONTINUE HIGH-FREQUENCY AUDITING.\n[INFO: ai.google.dev/gemini-api/docs/billing]";
pub const GENERIC_FAILURE_MESSAGE: &str = "SYSTEM FAILURE: AN UNEXPECTED ERROR OCCURRED.";
pub const KEY_ROTATED_MESSAGE: &str = "API KEY ROTATED ----------------\nPROFESSIONAL TIER ENGINE INITIALIZED. QUOTA LIMITS UPDATED.";

const VIDEO_ASPECT_RATIO: &str = "16:9";
const SPEECH_READY_MESSAGE: &str = "AUDIO BRIEFING SYNTHESIZED.";

/// Banner shown when an empty module panel is opened.
pub fn module_loaded_message(section: AuditSection) -> String {
    format!("MODULE {} LOADED.", section.banner())
}

/// Maps a generation failure to the transcript text shown to the user.
pub fn failure_message(error: &GenerationError) -> &'static str {
    if error.is_quota_exhausted() {
        QUOTA_EXHAUSTED_MESSAGE
    } else {
        GENERIC_FAILURE_MESSAGE
    }
}

/// Everything the controller needs from the outside.
#[derive(Clone)]
pub struct ControllerDeps {
    pub client: Arc<dyn GenerationClient>,
    pub sessions: Arc<dyn SessionRepository>,
    pub experiences: Arc<dyn ExperienceRepository>,
    pub users: Arc<dyn UserRepository>,
    /// Mode used when a send does not name one
    pub default_mode: GenerationMode,
    pub speech_voice: String,
}

/// The assistant message appended for an action, plus any generated media.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub message: Message,
    pub media: Option<MediaPayload>,
    /// Whether the generation call succeeded
    pub succeeded: bool,
}

struct ControllerState {
    active_section: AuditSection,
    panels: HashMap<AuditSection, Vec<Message>>,
    sessions: HashMap<AuditSection, ChatSession>,
    documents: Vec<AuditDocument>,
    mode: GenerationMode,
}

impl ControllerState {
    fn panel_mut(&mut self, section: AuditSection) -> &mut Vec<Message> {
        self.panels.entry(section).or_default()
    }

    fn session_mut(&mut self, section: AuditSection) -> &mut ChatSession {
        self.sessions
            .entry(section)
            .or_insert_with(|| ChatSession::new(section))
    }
}

pub struct SessionController {
    deps: ControllerDeps,
    composer: PromptComposer,
    learning: Arc<LearningExtractor>,
    state: Mutex<ControllerState>,
    /// Held for the whole of a generation so replies land in submission order
    send_lock: tokio::sync::Mutex<()>,
    learning_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SessionController {
    pub fn new(deps: ControllerDeps) -> Result<Self> {
        let composer = PromptComposer::new().context("Failed to compile prompt templates")?;
        let learning = Arc::new(LearningExtractor::new(
            deps.client.clone(),
            deps.experiences.clone(),
        ));

        let mut panels: HashMap<AuditSection, Vec<Message>> =
            AuditSection::iter().map(|s| (s, Vec::new())).collect();
        panels
            .entry(AuditSection::AuditObservation)
            .or_default()
            .push(Message::assistant(INITIAL_GREETING));

        let state = ControllerState {
            active_section: AuditSection::AuditObservation,
            panels,
            sessions: HashMap::new(),
            documents: Vec::new(),
            mode: deps.default_mode,
        };

        Ok(Self {
            deps,
            composer,
            learning,
            state: Mutex::new(state),
            send_lock: tokio::sync::Mutex::new(()),
            learning_tasks: Mutex::new(Vec::new()),
        })
    }

    fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ============================================================================
    // Panels
    // ============================================================================

    pub fn active_section(&self) -> AuditSection {
        self.state().active_section
    }

    /// Switches modules; an empty panel gets its banner.
    pub fn select_section(&self, section: AuditSection) {
        let mut state = self.state();
        state.active_section = section;
        let panel = state.panel_mut(section);
        if panel.is_empty() {
            panel.push(Message::assistant(module_loaded_message(section)));
        }
        tracing::info!("[SessionController] Active module: {}", section);
    }

    /// Transcript of the active panel.
    pub fn messages(&self) -> Vec<Message> {
        let mut state = self.state();
        let section = state.active_section;
        state.panel_mut(section).clone()
    }

    pub fn mode(&self) -> GenerationMode {
        self.state().mode
    }

    pub fn set_mode(&self, mode: GenerationMode) {
        self.state().mode = mode;
    }

    /// Starts a fresh session in the active module.
    pub fn new_chat(&self) -> ChatSession {
        let mut state = self.state();
        let section = state.active_section;
        let session = ChatSession::new(section);
        state.sessions.insert(section, session.clone());
        *state.panel_mut(section) = vec![Message::assistant(module_loaded_message(section))];
        tracing::info!("[SessionController] New session {} in {}", session.id, section);
        session
    }

    /// The session the active module is writing to, if any message was sent.
    pub fn active_session(&self) -> Option<ChatSession> {
        let state = self.state();
        state.sessions.get(&state.active_section).cloned()
    }

    // ============================================================================
    // Messaging
    // ============================================================================

    /// Sends a user message and appends the reply.
    ///
    /// `mode` defaults to the controller's current mode. Image and video
    /// modes are routed to the media generators. Generation failures become
    /// assistant messages; only store write failures are returned as errors.
    pub async fn send_message(
        &self,
        content: &str,
        mode: Option<GenerationMode>,
        image: Option<InlineImage>,
    ) -> Result<Reply> {
        let mode = mode.unwrap_or_else(|| self.mode());
        match mode {
            GenerationMode::Image => return self.generate_image(content, image).await,
            GenerationMode::Video => return self.generate_video(content, image).await,
            _ => {}
        }

        let _turn = self.send_lock.lock().await;

        let (section, session_id, history, documents) = {
            let mut state = self.state();
            let section = state.active_section;
            let history = state.panel_mut(section).clone();
            let user_message = Message::user(content);
            state.panel_mut(section).push(user_message.clone());
            let session = state.session_mut(section);
            session.push_message(user_message);
            let session_id = session.id.clone();
            (section, session_id, history, state.documents.clone())
        };

        let memory = self.deps.experiences.get_relevant_context(section);
        tracing::info!(
            "[SessionController] Sending {} query in {} ({} prior messages, {} documents)",
            mode,
            section,
            history.len(),
            documents.len()
        );

        let composed = self.composer.compose(ComposeInput {
            section,
            history: &history,
            documents: &documents,
            memory: &memory,
            query: content,
            mode,
            image,
        });

        let result = match composed {
            Ok(request) => self.deps.client.generate(GenerationRequest::Text(request)).await,
            Err(err) => Err(GenerationError::Configuration(err.to_string())),
        };

        let reply = match result {
            Ok(output) => Reply {
                message: Message::assistant_with_sources(output.text, output.sources),
                media: None,
                succeeded: true,
            },
            Err(err) => failure_reply(&err),
        };

        self.append_reply(section, &session_id, &reply.message)?;

        if reply.succeeded {
            self.spawn_learning(section, content, &reply.message.content);
        }
        Ok(reply)
    }

    /// Generates an image from `prompt`, optionally editing `reference`.
    pub async fn generate_image(
        &self,
        prompt: &str,
        reference: Option<InlineImage>,
    ) -> Result<Reply> {
        let request = GenerationRequest::Image(ImageRequest {
            model: GenerationMode::Image.model_name().to_string(),
            prompt: prompt.to_string(),
            reference,
        });
        self.run_media(Some(prompt), request).await
    }

    /// Renders a video; returns once the job has finished or failed.
    pub async fn generate_video(&self, prompt: &str, image: Option<InlineImage>) -> Result<Reply> {
        let request = GenerationRequest::Video(VideoRequest {
            model: GenerationMode::Video.model_name().to_string(),
            prompt: prompt.to_string(),
            image,
            aspect_ratio: VIDEO_ASPECT_RATIO.to_string(),
        });
        self.run_media(Some(prompt), request).await
    }

    /// Reads `text` aloud with the configured voice.
    pub async fn synthesize_speech(&self, text: &str) -> Result<Reply> {
        let request = GenerationRequest::Speech(SpeechRequest {
            model: SPEECH_MODEL.to_string(),
            text: text.to_string(),
            voice: self.deps.speech_voice.clone(),
        });
        self.run_media(None, request).await
    }

    /// Fetches the bytes of a generated video.
    pub async fn download_video(&self, uri: &str) -> Result<Vec<u8>> {
        self.deps
            .client
            .download_video(uri)
            .await
            .context("Failed to download video")
    }

    async fn run_media(&self, prompt: Option<&str>, request: GenerationRequest) -> Result<Reply> {
        let _turn = self.send_lock.lock().await;
        let is_speech = matches!(request, GenerationRequest::Speech(_));

        let (section, session_id) = {
            let mut state = self.state();
            let section = state.active_section;
            if let Some(prompt) = prompt {
                let user_message = Message::user(prompt);
                state.panel_mut(section).push(user_message.clone());
                state.session_mut(section).push_message(user_message);
            }
            let session_id = state.session_mut(section).id.clone();
            (section, session_id)
        };

        tracing::info!(
            "[SessionController] {} generation in {}",
            request.kind(),
            section
        );

        let reply = match self.deps.client.generate(request).await {
            Ok(GenerationOutput { text, media, .. }) => Reply {
                message: Message::assistant(if is_speech {
                    SPEECH_READY_MESSAGE.to_string()
                } else {
                    text
                }),
                media,
                succeeded: true,
            },
            Err(err) => failure_reply(&err),
        };

        self.append_reply(section, &session_id, &reply.message)?;
        Ok(reply)
    }

    /// Appends the reply to the panel and, if still active, the session it
    /// answers, then persists that session.
    fn append_reply(&self, section: AuditSection, session_id: &str, message: &Message) -> Result<()> {
        let session = {
            let mut state = self.state();
            state.panel_mut(section).push(message.clone());
            match state.sessions.get_mut(&section) {
                Some(session) if session.id == session_id => {
                    session.push_message(message.clone());
                    Some(session.clone())
                }
                _ => None,
            }
        };

        match session {
            Some(session) => self
                .deps
                .sessions
                .save(&session)
                .context("Failed to persist chat session"),
            None => {
                tracing::debug!(
                    "[SessionController] Session {} was replaced before its reply arrived",
                    session_id
                );
                Ok(())
            }
        }
    }

    fn spawn_learning(&self, section: AuditSection, query: &str, answer: &str) {
        let extractor = self.learning.clone();
        let query = query.to_string();
        let answer = answer.to_string();

        let handle = tokio::spawn(async move {
            if let Err(err) = extractor.extract(section, &query, &answer).await {
                tracing::debug!("[SessionController] Learning discarded: {:#}", err);
            }
        });

        let mut tasks = self
            .learning_tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        tasks.retain(|task| !task.is_finished());
        tasks.push(handle);
    }

    /// Waits for outstanding learning extraction.
    pub async fn flush_learning(&self) {
        let tasks: Vec<JoinHandle<()>> = std::mem::take(
            &mut *self
                .learning_tasks
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for task in tasks {
            let _ = task.await;
        }
    }

    // ============================================================================
    // Evidence
    // ============================================================================

    pub fn add_document(&self, document: AuditDocument) {
        tracing::info!("[SessionController] Attached {}", document.name);
        self.state().documents.push(document);
    }

    /// Loads a file from disk and attaches it.
    pub fn upload_document(&self, path: &Path) -> Result<AuditDocument> {
        let document = load_document(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;
        self.add_document(document.clone());
        Ok(document)
    }

    /// Detaches a document; returns whether it was attached.
    pub fn remove_document(&self, id: &str) -> bool {
        let mut state = self.state();
        let before = state.documents.len();
        state.documents.retain(|doc| doc.id != id);
        state.documents.len() != before
    }

    pub fn documents(&self) -> Vec<AuditDocument> {
        self.state().documents.clone()
    }

    // ============================================================================
    // History
    // ============================================================================

    /// Stored sessions, most recently updated first.
    pub fn sessions(&self) -> Vec<ChatSession> {
        self.deps.sessions.list_all()
    }

    /// Makes a stored session active in its module and shows its transcript.
    pub fn open_session(&self, id: &str) -> Result<ChatSession> {
        let session = self
            .deps
            .sessions
            .find_by_id(id)
            .ok_or_else(|| AuditrosError::not_found("session", id))?;

        let mut state = self.state();
        let section = session.section;
        state.active_section = section;
        *state.panel_mut(section) = session.messages.clone();
        state.sessions.insert(section, session.clone());
        tracing::info!("[SessionController] Opened session {} in {}", id, section);
        Ok(session)
    }

    /// Deletes a stored session. If it was active, its module starts fresh.
    pub fn delete_session(&self, id: &str) -> Result<()> {
        self.deps
            .sessions
            .delete(id)
            .context("Failed to delete chat session")?;

        let mut state = self.state();
        let active = state
            .sessions
            .iter()
            .find(|(_, session)| session.id == id)
            .map(|(section, _)| *section);
        if let Some(section) = active {
            state.sessions.remove(&section);
            *state.panel_mut(section) = vec![Message::assistant(module_loaded_message(section))];
        }
        Ok(())
    }

    // ============================================================================
    // Account
    // ============================================================================

    pub fn login(&self, name: &str, email: &str, picture: &str) -> Result<AuthUser> {
        let user = self
            .deps
            .users
            .save_user(AuthUser::new(name, email, picture))
            .context("Failed to save user")?;
        tracing::info!("[SessionController] Signed in {}", user.email);
        Ok(user)
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.deps.users.get_current_user()
    }

    pub fn logout(&self) -> Result<()> {
        self.deps.users.logout().context("Failed to sign out")
    }

    /// Switches the generation client to a new key and notes it in the panel.
    pub fn rotate_api_key(&self, api_key: String) {
        self.deps.client.rotate_api_key(api_key);
        let mut state = self.state();
        let section = state.active_section;
        state
            .panel_mut(section)
            .push(Message::assistant(KEY_ROTATED_MESSAGE));
    }
}

fn failure_reply(error: &GenerationError) -> Reply {
    tracing::error!("[SessionController] Generation failed: {}", error);
    Reply {
        message: Message::assistant(failure_message(error)),
        media: None,
        succeeded: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_message_by_kind() {
        let quota = GenerationError::QuotaExhausted {
            message: "limit".into(),
        };
        assert_eq!(failure_message(&quota), QUOTA_EXHAUSTED_MESSAGE);

        let http = GenerationError::Http {
            status: 500,
            message: "429 in body text".into(),
        };
        assert_eq!(failure_message(&http), GENERIC_FAILURE_MESSAGE);
    }

    #[test]
    fn test_module_loaded_message() {
        assert_eq!(
            module_loaded_message(AuditSection::TaxCompliance),
            "MODULE TAX COMPLIANCE LOADED."
        );
    }
}
