//! Institutional memory capture.
//!
//! After a technical answer, a fast model distills it into one reusable
//! sentence that is replayed into later prompts of the same module.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;

use auditros_core::AuditSection;
use auditros_core::experience::{AuditExperience, ExperienceRepository, Importance};
use auditros_core::generation::{
    Content, GenerationClient, GenerationMode, GenerationRequest, TextRequest, ToolSet, TurnRole,
};

/// Longest slice of the answer sent for distillation, in characters.
const ANSWER_EXCERPT_CHARS: usize = 4000;

const EXTRACTION_INSTRUCTION: &str = "You maintain the institutional memory of an audit firm. Reply with JSON only.";

/// A distilled learning as returned by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedLearning {
    pub learning: String,
    pub importance: Importance,
}

#[derive(Deserialize)]
struct RawLearning {
    learning: String,
    #[serde(default)]
    importance: Option<String>,
}

pub struct LearningExtractor {
    client: Arc<dyn GenerationClient>,
    experiences: Arc<dyn ExperienceRepository>,
}

impl LearningExtractor {
    pub fn new(
        client: Arc<dyn GenerationClient>,
        experiences: Arc<dyn ExperienceRepository>,
    ) -> Self {
        Self {
            client,
            experiences,
        }
    }

    /// Distills `answer` and stores the result under `section`.
    pub async fn extract(
        &self,
        section: AuditSection,
        query: &str,
        answer: &str,
    ) -> Result<AuditExperience> {
        let output = self
            .client
            .generate(GenerationRequest::Text(extraction_request(
                section, query, answer,
            )))
            .await
            .context("Learning extraction request failed")?;

        let extracted = parse_learning(&output.text)
            .ok_or_else(|| anyhow!("Unusable learning payload: {}", output.text))?;

        let experience =
            AuditExperience::new(section, query, extracted.learning, extracted.importance);
        // The store does blocking file I/O under a lock
        let experiences = Arc::clone(&self.experiences);
        let stored = experience.clone();
        tokio::task::spawn_blocking(move || experiences.save_experience(stored))
            .await
            .context("Learning store task failed")?
            .context("Failed to store learning")?;

        tracing::debug!(
            "[LearningExtractor] Stored {} learning for {}",
            experience.importance,
            section
        );
        Ok(experience)
    }
}

pub fn extraction_request(section: AuditSection, query: &str, answer: &str) -> TextRequest {
    let excerpt: String = answer.chars().take(ANSWER_EXCERPT_CHARS).collect();
    let prompt = format!(
        "MODULE: {}\n\nQUERY:\n{query}\n\nANSWER:\n{excerpt}\n\n\
         Extract the single most reusable technical learning from the answer as one sentence, \
         and grade its importance for future audits.\n\
         Respond as {{\"learning\": \"<sentence>\", \"importance\": \"low|medium|high\"}}.",
        section.banner()
    );

    let mode = GenerationMode::Fast;
    TextRequest {
        model: mode.model_name().to_string(),
        contents: vec![Content::text(TurnRole::User, prompt)],
        system_instruction: Some(EXTRACTION_INSTRUCTION.to_string()),
        tools: ToolSet::default(),
        thinking_budget: None,
        json_response: true,
    }
}

/// Parses the model's JSON reply, tolerating a fenced code block.
///
/// Unknown importance grades fall back to medium; an empty learning is
/// rejected.
pub fn parse_learning(text: &str) -> Option<ExtractedLearning> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    let raw: RawLearning = serde_json::from_str(body).ok()?;
    let learning = raw.learning.trim();
    if learning.is_empty() {
        return None;
    }

    Some(ExtractedLearning {
        learning: learning.to_string(),
        importance: raw
            .importance
            .as_deref()
            .and_then(|grade| Importance::from_str(grade.trim()).ok())
            .unwrap_or_default(),
    })
}
