// Document rendering: layout output → downloadable bytes.
// CPU-bound: async callers run `render_plan` inside tokio::task::spawn_blocking.

pub mod export;
pub mod pdf;

use tracing::{info, warn};

use crate::layout::{layout_document, parse_plan, LayoutConfig, LayoutWarning};

pub use export::{export_filename, Disposition, ExportFormat};

/// A rendered plan document plus everything the caller should know about how it went.
#[derive(Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub warnings: Vec<LayoutWarning>,
}

/// Parses, lays out and renders plan text in the requested format.
///
/// Text export returns the plan unchanged; it never paginates.
pub fn render_plan(
    plan_text: &str,
    title: &str,
    format: ExportFormat,
    config: &LayoutConfig,
) -> RenderedDocument {
    match format {
        ExportFormat::Txt => RenderedDocument {
            bytes: plan_text.as_bytes().to_vec(),
            page_count: 1,
            warnings: Vec::new(),
        },
        ExportFormat::Pdf => {
            let blocks = parse_plan(plan_text);
            let output = layout_document(config, title, &blocks);
            for warning in &output.warnings {
                warn!(%warning, "Degraded PDF rendering");
            }
            let bytes = pdf::write_pdf(&output, config);
            info!(
                blocks = blocks.len(),
                pages = output.pages.len(),
                bytes = bytes.len(),
                "Rendered plan PDF"
            );
            RenderedDocument {
                bytes,
                page_count: output.pages.len(),
                warnings: output.warnings,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plan_text_is_passthrough() {
        let doc = render_plan("# Plan\n✨", "T", ExportFormat::Txt, &LayoutConfig::default());
        assert_eq!(doc.bytes, "# Plan\n✨".as_bytes());
        assert!(doc.warnings.is_empty());
    }

    #[test]
    fn test_render_plan_pdf_reports_warnings() {
        let doc = render_plan(
            "### Plan ✨\n| a | b | c | d | e |",
            "Institute",
            ExportFormat::Pdf,
            &LayoutConfig::default(),
        );
        assert!(doc.bytes.starts_with(b"%PDF-"));
        assert_eq!(doc.page_count, 1);
        assert_eq!(doc.warnings.len(), 2);
    }
}
