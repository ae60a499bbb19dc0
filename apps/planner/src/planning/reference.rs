//! Reference PDF → prompt context.
//!
//! Extraction never fails a request: a PDF that cannot be read degrades to a
//! placeholder context and is reported back as `ReferenceStatus::Failed`.

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::planning::prompts::{NO_PDF_CONTEXT, UNREADABLE_PDF_CONTEXT};

/// Characters of extracted text echoed back to the client as a preview.
pub const SNIPPET_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    /// No PDF was uploaded.
    None,
    Extracted,
    /// A PDF was uploaded but yielded no text.
    Failed,
}

/// Reference context for the prompt plus what the client is told about it.
#[derive(Debug, Clone)]
pub struct ReferenceContext {
    pub status: ReferenceStatus,
    pub text: String,
}

impl ReferenceContext {
    pub fn snippet(&self) -> Option<String> {
        (self.status == ReferenceStatus::Extracted).then(|| snippet(&self.text))
    }
}

/// All page text in order, or `None` if the document cannot be parsed.
///
/// `pdf-extract` may panic on malformed input; the panic is contained here.
/// CPU-bound: call through `load_reference`.
pub fn extract_reference_text(bytes: &[u8]) -> Option<String> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes)));
    match result {
        Ok(Ok(text)) => Some(text),
        Ok(Err(e)) => {
            warn!("Error reading PDF file: {e}");
            None
        }
        Err(_) => {
            warn!("PDF parser panicked on the uploaded document");
            None
        }
    }
}

/// Builds the prompt's reference context from an optional upload.
pub async fn load_reference(upload: Option<Bytes>) -> Result<ReferenceContext, AppError> {
    let Some(bytes) = upload else {
        return Ok(ReferenceContext {
            status: ReferenceStatus::None,
            text: NO_PDF_CONTEXT.to_string(),
        });
    };

    let size = bytes.len();
    let extracted = tokio::task::spawn_blocking(move || extract_reference_text(&bytes))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
        })?;

    Ok(match extracted {
        Some(text) if !text.trim().is_empty() => {
            info!(bytes = size, chars = text.chars().count(), "Reference PDF read");
            ReferenceContext {
                status: ReferenceStatus::Extracted,
                text,
            }
        }
        _ => {
            warn!(bytes = size, "Reference PDF yielded no text; using placeholder context");
            ReferenceContext {
                status: ReferenceStatus::Failed,
                text: UNREADABLE_PDF_CONTEXT.to_string(),
            }
        }
    })
}

/// First `SNIPPET_CHARS` characters, with `...` appended when truncated.
pub fn snippet(text: &str) -> String {
    let mut chars = text.char_indices();
    match chars.nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
