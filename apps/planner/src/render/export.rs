//! Export formats and download filenames.

use serde::{Deserialize, Serialize};

const FILENAME_PREFIX: &str = "lesson_plan";
/// Replaces whitespace in subject names.
const SEPARATOR: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Pdf,
    Txt,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Txt => "txt",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Txt => "text/plain; charset=utf-8",
        }
    }
}

/// Whether the client should display the document or save it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    #[default]
    Attachment,
    Inline,
}

impl Disposition {
    pub fn header_value(self, filename: &str) -> String {
        let kind = match self {
            Disposition::Attachment => "attachment",
            Disposition::Inline => "inline",
        };
        format!("{kind}; filename=\"{filename}\"")
    }
}

/// Subject name safe for a filename and a `Content-Disposition` header.
///
/// Whitespace becomes `_`; anything other than ASCII letters, digits, `-`, `_` and `.`
/// is dropped.
pub fn sanitize_subject(subject: &str) -> String {
    subject
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(SEPARATOR)
            } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                Some(c)
            } else {
                None
            }
        })
        .collect()
}

/// `lesson_plan_{seq}_{subject}.{ext}`, or `lesson_plan_{seq}.{ext}` for an empty subject.
pub fn export_filename(seq: u64, subject: &str, format: ExportFormat) -> String {
    let subject = sanitize_subject(subject);
    let ext = format.extension();
    if subject.is_empty() {
        format!("{FILENAME_PREFIX}_{seq}.{ext}")
    } else {
        format!("{FILENAME_PREFIX}_{seq}_{subject}.{ext}")
    }
}
