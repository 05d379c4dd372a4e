//! Evidence document loading.

use std::fs;
use std::path::Path;

use chrono::Utc;
use uuid::Uuid;

use auditros_core::document::{AuditDocument, format_size};
use auditros_core::{AuditrosError, Result};

/// Largest file whose text is extracted into the prompt context.
const MAX_EXTRACTED_BYTES: u64 = 512 * 1024;

/// Infers the MIME type from a filename extension using `mime_guess`.
pub fn infer_mime_type(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

/// Reads a file into an [`AuditDocument`].
///
/// Text content is extracted when the file is valid UTF-8 and no larger than
/// 512 KiB; binary evidence is attached by name only.
pub fn load_document(path: &Path) -> Result<AuditDocument> {
    let metadata = fs::metadata(path)?;
    if !metadata.is_file() {
        return Err(AuditrosError::io(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| AuditrosError::io("Path has no file name"))?;

    let content = if metadata.len() <= MAX_EXTRACTED_BYTES {
        String::from_utf8(fs::read(path)?)
            .ok()
            .filter(|text| !text.trim().is_empty())
    } else {
        None
    };

    tracing::debug!(
        "[DocumentLoader] Loaded {} ({} bytes, text: {})",
        name,
        metadata.len(),
        content.is_some()
    );

    Ok(AuditDocument {
        id: Uuid::new_v4().to_string(),
        mime_type: infer_mime_type(&name),
        size: format_size(metadata.len()),
        content,
        upload_date: Utc::now(),
        name,
    })
}
