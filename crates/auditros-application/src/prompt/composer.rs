use minijinja::{Environment, context};
use strum::IntoEnumIterator;

use auditros_core::AuditSection;
use auditros_core::document::AuditDocument;
use auditros_core::generation::{
    Content, ContentPart, GenerationMode, InlineImage, TextRequest, ToolSet, TurnRole,
};
use auditros_core::session::{Message, MessageRole};
use auditros_core::{AuditrosError, Result};

use super::templates::{BASE_TEMPLATE, BASE_TEMPLATE_NAME, section_template};

/// Context block used when no evidence is attached.
pub const NO_EVIDENCE_CONTEXT: &str = "No specific evidence uploaded.";
/// Body used for a document whose text was not extracted.
pub const DOCUMENT_PLACEHOLDER: &str = "Attached evidence source.";

/// Everything needed to build one text request.
#[derive(Debug, Clone)]
pub struct ComposeInput<'a> {
    pub section: AuditSection,
    /// Panel transcript preceding the new query
    pub history: &'a [Message],
    pub documents: &'a [AuditDocument],
    /// Institutional memory feed; empty when nothing is relevant
    pub memory: &'a str,
    pub query: &'a str,
    pub mode: GenerationMode,
    pub image: Option<InlineImage>,
}

/// Builds generation requests from the conversation state.
///
/// Holds the compiled system instruction templates.
pub struct PromptComposer {
    env: Environment<'static>,
}

impl PromptComposer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template(BASE_TEMPLATE_NAME, BASE_TEMPLATE)
            .map_err(|e| AuditrosError::template(e.to_string()))?;
        for section in AuditSection::iter() {
            let (name, source) = section_template(section);
            env.add_template(name, source)
                .map_err(|e| AuditrosError::template(e.to_string()))?;
        }
        Ok(Self { env })
    }

    /// Renders the system instruction for a module.
    pub fn system_instruction(&self, section: AuditSection) -> Result<String> {
        let (name, _) = section_template(section);
        self.env
            .get_template(name)
            .and_then(|template| template.render(context! { section => section.as_ref() }))
            .map_err(|e| AuditrosError::template(format!("{name}: {e}")))
    }

    pub fn compose(&self, input: ComposeInput<'_>) -> Result<TextRequest> {
        let mut contents: Vec<Content> = input.history.iter().map(history_turn).collect();

        let mut parts = Vec::with_capacity(2);
        if let Some(image) = input.image {
            parts.push(ContentPart::InlineData(image));
        }
        parts.push(ContentPart::Text(user_turn_text(
            input.section,
            input.query,
            &data_context(input.memory, input.documents),
        )));
        contents.push(Content {
            role: TurnRole::User,
            parts,
        });

        let mode = input.mode;
        Ok(TextRequest {
            model: mode.model_name().to_string(),
            contents,
            system_instruction: Some(self.system_instruction(input.section)?),
            tools: ToolSet {
                google_search: mode.uses_google_search(),
                google_maps: mode.uses_google_maps(),
            },
            thinking_budget: mode.thinking_budget(),
            json_response: false,
        })
    }
}

fn history_turn(message: &Message) -> Content {
    let role = match message.role {
        MessageRole::Assistant => TurnRole::Model,
        MessageRole::User => TurnRole::User,
    };
    Content::text(role, message.content.clone())
}

/// `[FILE: name]` blocks separated by blank lines.
pub fn document_context(documents: &[AuditDocument]) -> String {
    if documents.is_empty() {
        return NO_EVIDENCE_CONTEXT.to_string();
    }
    documents
        .iter()
        .map(|doc| {
            let body = doc
                .content
                .as_deref()
                .filter(|content| !content.is_empty())
                .unwrap_or(DOCUMENT_PLACEHOLDER);
            format!("[FILE: {}]\n{}", doc.name, body)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn data_context(memory: &str, documents: &[AuditDocument]) -> String {
    let documents = document_context(documents);
    if memory.is_empty() {
        documents
    } else {
        format!("{memory}\n\n{documents}")
    }
}

fn user_turn_text(section: AuditSection, query: &str, context: &str) -> String {
    format!(
        "TECHNICAL AUDIT DATA CONTEXT:\n{context}\n\nUSER QUERY:\n[MODULE: {}]\n{query}",
        section.banner()
    )
}
