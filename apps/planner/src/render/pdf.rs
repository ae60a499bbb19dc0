//! Laid-out pages → PDF bytes.
//!
//! Everything is positioned by the layout engine; this module only flips the top-down
//! coordinates into PDF user space and writes content streams. Text uses the base-14
//! Helvetica faces with WinAnsiEncoding, so no font program is embedded.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::layout::font_metrics::{encode_win_ansi, FontStyle};
use crate::layout::paginator::{Rect as LayoutRect, TextRun};
use crate::layout::{LayoutConfig, LayoutOutput};

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");
const BORDER_WIDTH_PT: f32 = 0.5;

/// Sequential object-id allocator.
struct RefAlloc(i32);

impl RefAlloc {
    fn next(&mut self) -> Ref {
        let r = Ref::new(self.0);
        self.0 += 1;
        r
    }
}

/// Writes every page of `output` into a single PDF document.
pub fn write_pdf(output: &LayoutOutput, config: &LayoutConfig) -> Vec<u8> {
    let mut pdf = Pdf::new();
    let mut alloc = RefAlloc(1);

    let catalog_id = alloc.next();
    let tree_id = alloc.next();
    let regular_id = alloc.next();
    let bold_id = alloc.next();
    let info_id = alloc.next();

    let page_ids: Vec<(Ref, Ref)> = output
        .pages
        .iter()
        .map(|_| (alloc.next(), alloc.next()))
        .collect();

    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    pdf.type1_font(regular_id)
        .base_font(Name(FontStyle::Regular.base_font().as_bytes()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(FontStyle::Bold.base_font().as_bytes()))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    let media_box = Rect::new(0.0, 0.0, config.page_width_pt, config.page_height_pt);

    for (page, (page_id, content_id)) in output.pages.iter().zip(&page_ids) {
        let mut content = Content::new();

        draw_run(&mut content, &page.header, config);
        for block in &page.blocks {
            if !block.borders.is_empty() {
                content.set_line_width(BORDER_WIDTH_PT);
                for border in &block.borders {
                    draw_border(&mut content, border, config);
                }
                content.stroke();
            }
            for run in &block.runs {
                draw_run(&mut content, run, config);
            }
        }
        draw_run(&mut content, &page.footer, config);

        let mut pdf_page = pdf.page(*page_id);
        pdf_page.media_box(media_box);
        pdf_page.parent(tree_id);
        pdf_page.contents(*content_id);
        pdf_page
            .resources()
            .fonts()
            .pair(REGULAR_FONT, regular_id)
            .pair(BOLD_FONT, bold_id);
        pdf_page.finish();

        pdf.stream(*content_id, &content.finish());
    }

    if let Some(first) = output.pages.first() {
        pdf.document_info(info_id)
            .title(TextStr(&first.title))
            .producer(TextStr(concat!("planner ", env!("CARGO_PKG_VERSION"))));
    }

    pdf.finish()
}

fn draw_run(content: &mut Content, run: &TextRun, config: &LayoutConfig) {
    if run.text.is_empty() {
        return;
    }
    let font = match run.style {
        FontStyle::Regular => REGULAR_FONT,
        FontStyle::Bold => BOLD_FONT,
    };
    let bytes = encode_win_ansi(&run.text);
    content.begin_text();
    content.set_font(font, run.font_size);
    content.next_line(run.x, config.page_height_pt - run.baseline_y);
    content.show(Str(&bytes));
    content.end_text();
}

fn draw_border(content: &mut Content, border: &LayoutRect, config: &LayoutConfig) {
    let bottom = config.page_height_pt - border.y - border.height;
    content.rect(border.x, bottom, border.width, border.height);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_document, parse_plan, LayoutConfig};

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    #[test]
    fn test_write_pdf_produces_pdf_header() {
        let config = LayoutConfig::default();
        let output = layout_document(&config, "Institute", &parse_plan("# Plan\nBody"));
        let bytes = write_pdf(&output, &config);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"Helvetica-Bold"));
        assert!(contains(&bytes, b"(Page 1)"));
    }

    #[test]
    fn test_write_pdf_stamps_every_page_footer() {
        let config = LayoutConfig::default();
        let text = "A line of the lesson plan.\n".repeat(150);
        let output = layout_document(&config, "Institute", &parse_plan(&text));
        assert!(output.pages.len() >= 3);
        let bytes = write_pdf(&output, &config);
        for page in &output.pages {
            let footer = format!("(Page {})", page.number);
            assert!(contains(&bytes, footer.as_bytes()), "missing {footer}");
        }
    }

    #[test]
    fn test_write_pdf_strokes_table_borders() {
        let config = LayoutConfig::default();
        let output = layout_document(&config, "Institute", &parse_plan("| a | b | c |"));
        let bytes = write_pdf(&output, &config);
        assert!(contains(&bytes, b" re"));
    }
}
