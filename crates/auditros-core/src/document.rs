//! Uploaded evidence documents.
//!
//! Documents live only as long as the controller holding them; they are not
//! written to the local store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A file attached to the active conversation as audit evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditDocument {
    pub id: String,
    pub name: String,
    /// MIME type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Human-readable size, e.g. `12.5KB`
    pub size: String,
    /// Extracted text, when the file is textual
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub upload_date: DateTime<Utc>,
}

/// Formats a byte count the way the document list shows it.
pub fn format_size(bytes: u64) -> String {
    format!("{:.1}KB", bytes as f64 / 1024.0)
}
