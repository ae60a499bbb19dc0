//! Pagination — lays a block sequence out on fixed-size pages.
//!
//! # Model
//! - One `LayoutEngine` owns a cursor `(x, y)` and the page being filled for a single
//!   render call. Nothing is shared between calls.
//! - Pages are opened lazily, when the first block needs somewhere to go, and finalized
//!   (footer stamped) when the next page opens or the document ends.
//! - Header and footer are pure functions of (title, page number).
//!
//! # Break policy
//! Before a block is drawn its full height is measured. If it does not fit in the space
//! left on the current page, the page is finalized and the block goes to a fresh one.
//! Blocks are never split, with one exception: a heading or paragraph taller than an
//! entire empty page is continued line by line onto following pages. A table row that
//! tall is clipped instead. Both cases produce a `LayoutWarning`.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::layout::font_metrics::{get_metrics, substitute_unsupported, FontStyle};
use crate::layout::geometry::{LayoutConfig, RowShape};
use crate::layout::markdown::{display_text, Block, Cell};

/// Baseline offset from the top of the glyph box, as a fraction of font size.
const BASELINE_RATIO: f32 = 0.8;
/// Slack for float comparisons against the page bottom.
const FIT_EPSILON: f32 = 0.01;
/// Distinct replaced characters kept for the warning message.
const MAX_REPLACED_SAMPLE: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

/// A line of text at an absolute position. `baseline_y` is top-down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextRun {
    pub x: f32,
    pub baseline_y: f32,
    pub font_size: f32,
    pub style: FontStyle,
    pub text: String,
}

/// Axis-aligned rectangle, top-down coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacedKind {
    Heading,
    Paragraph,
    TableRow,
}

/// A block after layout: where it sits on its page and what gets drawn.
#[derive(Debug, Clone, Serialize)]
pub struct PlacedBlock {
    /// Index of the source block in the input sequence.
    pub source_index: usize,
    pub kind: PlacedKind,
    pub top: f32,
    pub height: f32,
    pub runs: Vec<TextRun>,
    /// One border per table cell, all `height` tall. Empty for non-table blocks.
    pub borders: Vec<Rect>,
    /// Column profile used, for table rows.
    pub shape: Option<RowShape>,
}

/// A finalized page.
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// 1-based.
    pub number: u32,
    pub title: String,
    pub header: TextRun,
    pub footer: TextRun,
    pub blocks: Vec<PlacedBlock>,
}

/// Degraded-rendering conditions reported to the caller. None of them abort the render.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// Characters the base fonts cannot encode were drawn as `?`.
    UnsupportedCharacters { count: usize, sample: String },
    /// A table row with a cell count outside the recognized shapes used the fallback
    /// two-column profile.
    UnrecognizedRowShape { block_index: usize, cells: usize },
    /// A heading or paragraph taller than a page was continued across pages.
    OversizedBlock { block_index: usize, pages: usize },
    /// A table row taller than a page was clipped.
    ClippedRow { block_index: usize, lines_dropped: usize },
}

impl LayoutWarning {
    /// Stable identifier, same as the serialized `kind` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            LayoutWarning::UnsupportedCharacters { .. } => "unsupported_characters",
            LayoutWarning::UnrecognizedRowShape { .. } => "unrecognized_row_shape",
            LayoutWarning::OversizedBlock { .. } => "oversized_block",
            LayoutWarning::ClippedRow { .. } => "clipped_row",
        }
    }
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::UnsupportedCharacters { count, sample } => write!(
                f,
                "{count} character(s) not supported by the PDF font were replaced ({sample})"
            ),
            LayoutWarning::UnrecognizedRowShape { block_index, cells } => write!(
                f,
                "table row {block_index} has {cells} cell(s); used the two-column fallback layout"
            ),
            LayoutWarning::OversizedBlock { block_index, pages } => write!(
                f,
                "block {block_index} is taller than a page and was continued over {pages} pages"
            ),
            LayoutWarning::ClippedRow {
                block_index,
                lines_dropped,
            } => write!(
                f,
                "table row {block_index} is taller than a page; {lines_dropped} line(s) dropped"
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutOutput {
    pub pages: Vec<Page>,
    pub warnings: Vec<LayoutWarning>,
}

// ────────────────────────────────────────────────────────────────────────────
// Header / footer
// ────────────────────────────────────────────────────────────────────────────

/// The running header: title centered in the header band, bold. A title wider than the
/// usable width is cut and ends in `...`.
pub fn header_run(config: &LayoutConfig, title: &str) -> TextRun {
    let size = config.header_font_size_pt;
    let text = truncate_to_width(title, FontStyle::Bold, size, config.usable_width());
    TextRun {
        x: centered_x(config, &text, FontStyle::Bold, size),
        baseline_y: config.margin_top_pt + size * BASELINE_RATIO,
        font_size: size,
        style: FontStyle::Bold,
        text,
    }
}

/// The footer: `"Page N"` centered in the footer band.
pub fn footer_run(config: &LayoutConfig, page_number: u32) -> TextRun {
    let size = config.footer_font_size_pt;
    let text = format!("Page {page_number}");
    TextRun {
        x: centered_x(config, &text, FontStyle::Regular, size),
        baseline_y: config.page_height_pt - config.margin_bottom_pt - size * (1.0 - BASELINE_RATIO),
        font_size: size,
        style: FontStyle::Regular,
        text,
    }
}

const ELLIPSIS: &str = "...";

fn truncate_to_width(text: &str, style: FontStyle, size: f32, max_width: f32) -> String {
    let metrics = get_metrics(style);
    if metrics.width_pt(text, size) <= max_width + FIT_EPSILON {
        return text.to_string();
    }
    let budget = max_width - metrics.width_pt(ELLIPSIS, size);
    let mut out = String::new();
    let mut width = 0.0;
    for c in text.chars() {
        let mut buf = [0u8; 4];
        let w = metrics.width_pt(c.encode_utf8(&mut buf), size);
        if width + w > budget + FIT_EPSILON {
            break;
        }
        out.push(c);
        width += w;
    }
    let mut out = out.trim_end().to_string();
    out.push_str(ELLIPSIS);
    out
}

/// Centers within the page, never left of the left margin.
fn centered_x(config: &LayoutConfig, text: &str, style: FontStyle, size: f32) -> f32 {
    let width = get_metrics(style).width_pt(text, size);
    ((config.page_width_pt - width) / 2.0).max(config.margin_left_pt)
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

struct OpenPage {
    number: u32,
    blocks: Vec<PlacedBlock>,
}

/// Single-use layout engine. Feed blocks with [`push_block`](Self::push_block) and call
/// [`finish`](Self::finish), or use [`layout`](Self::layout) for a whole document.
pub struct LayoutEngine<'a> {
    config: &'a LayoutConfig,
    title: String,
    pages: Vec<Page>,
    current: Option<OpenPage>,
    cursor_x: f32,
    cursor_y: f32,
    emphasis: FontStyle,
    warnings: Vec<LayoutWarning>,
    replaced_count: usize,
    replaced_sample: Vec<char>,
}

impl<'a> LayoutEngine<'a> {
    pub fn new(config: &'a LayoutConfig, title: &str) -> Self {
        let mut engine = Self {
            config,
            title: String::new(),
            pages: Vec::new(),
            current: None,
            cursor_x: config.margin_left_pt,
            cursor_y: config.content_top(),
            emphasis: FontStyle::Regular,
            warnings: Vec::new(),
            replaced_count: 0,
            replaced_sample: Vec::new(),
        };
        engine.title = engine.sanitize(title);
        engine
    }

    /// Lays out a whole document.
    pub fn layout(mut self, blocks: &[Block]) -> LayoutOutput {
        for (index, block) in blocks.iter().enumerate() {
            self.push_block(index, block);
        }
        self.finish()
    }

    /// Current emphasis state. `Regular` between blocks.
    #[cfg(test)]
    pub fn emphasis(&self) -> FontStyle {
        self.emphasis
    }

    pub fn push_block(&mut self, index: usize, block: &Block) {
        match block {
            Block::Heading { level, text } => self.place_heading(index, *level, text),
            Block::Paragraph { text } => self.place_paragraph(index, text),
            Block::TableRow { cells } => self.place_row(index, cells),
        }
    }

    /// Finalizes the last page and returns every page plus collected warnings.
    ///
    /// An empty document still produces one page with header and footer.
    pub fn finish(mut self) -> LayoutOutput {
        self.ensure_page();
        self.close_page();

        if self.replaced_count > 0 {
            let sample: String = self.replaced_sample.iter().collect();
            self.warnings.insert(
                0,
                LayoutWarning::UnsupportedCharacters {
                    count: self.replaced_count,
                    sample,
                },
            );
        }

        debug!(
            pages = self.pages.len(),
            warnings = self.warnings.len(),
            "Layout complete"
        );

        LayoutOutput {
            pages: self.pages,
            warnings: self.warnings,
        }
    }

    // ── block placement ─────────────────────────────────────────────────────

    fn place_heading(&mut self, index: usize, level: u8, text: &str) {
        let (size, line_height) = self.config.heading_metrics(level);
        self.emphasis = FontStyle::Bold;

        let text = self.sanitize(&display_text(text));
        let mut lines =
            get_metrics(self.emphasis).wrap(&text, size, self.config.usable_width());
        if lines.is_empty() {
            // An empty heading still takes its line.
            lines.push(String::new());
        }
        self.place_lines(index, PlacedKind::Heading, lines, size, line_height);

        self.emphasis = FontStyle::Regular;
    }

    fn place_paragraph(&mut self, index: usize, text: &str) {
        let size = self.config.body_font_size_pt;
        let line_height = self.config.line_height_pt;

        if text.trim().is_empty() {
            self.place_blank();
            return;
        }

        let text = self.sanitize(&display_text(text));
        let lines = get_metrics(FontStyle::Regular).wrap(&text, size, self.config.usable_width());
        self.place_lines(index, PlacedKind::Paragraph, lines, size, line_height);
    }

    /// Empty source line: vertical space only. At the bottom of a page the space is
    /// absorbed rather than opening a new page.
    fn place_blank(&mut self) {
        self.ensure_page();
        let bottom = self.config.content_bottom();
        self.cursor_y = (self.cursor_y + self.config.blank_line_pt).min(bottom);
    }

    /// Places wrapped lines as one block, or continues them over several pages when they
    /// cannot fit on any single page.
    fn place_lines(
        &mut self,
        index: usize,
        kind: PlacedKind,
        lines: Vec<String>,
        size: f32,
        line_height: f32,
    ) {
        let height = lines.len() as f32 * line_height;

        if height <= self.config.usable_height() + FIT_EPSILON {
            let top = self.reserve(height);
            let runs = self.line_runs(&lines, self.cursor_x, top, size, line_height);
            self.commit(PlacedBlock {
                source_index: index,
                kind,
                top,
                height,
                runs,
                borders: Vec::new(),
                shape: None,
            });
            return;
        }

        let mut remaining: &[String] = &lines;
        let mut pages_used = 0;
        while !remaining.is_empty() {
            self.ensure_page();
            let fit = ((self.config.content_bottom() - self.cursor_y + FIT_EPSILON) / line_height)
                .floor()
                .max(0.0) as usize;
            if fit == 0 {
                self.break_page();
                continue;
            }
            let take = fit.min(remaining.len());
            let (chunk, rest) = remaining.split_at(take);
            let chunk_height = take as f32 * line_height;
            let top = self.cursor_y;
            let runs = self.line_runs(chunk, self.cursor_x, top, size, line_height);
            self.commit(PlacedBlock {
                source_index: index,
                kind,
                top,
                height: chunk_height,
                runs,
                borders: Vec::new(),
                shape: None,
            });
            pages_used += 1;
            remaining = rest;
            if !remaining.is_empty() {
                self.break_page();
            }
        }

        self.warnings.push(LayoutWarning::OversizedBlock {
            block_index: index,
            pages: pages_used,
        });
    }

    fn place_row(&mut self, index: usize, cells: &[Cell]) {
        let size = self.config.body_font_size_pt;
        let line_height = self.config.line_height_pt;
        let padding = self.config.cell_padding_pt;

        let (shape, widths) = self.config.column_widths(cells.len());
        if cells.len() != widths.len() {
            self.warnings.push(LayoutWarning::UnrecognizedRowShape {
                block_index: index,
                cells: cells.len(),
            });
        }
        let cells = fit_cells_to_columns(cells, widths.len());

        // Measure every cell at its own column width.
        let mut cell_lines: Vec<(FontStyle, Vec<String>)> = Vec::with_capacity(cells.len());
        for (cell, width) in cells.iter().zip(&widths) {
            let style = if cell.emphasized {
                FontStyle::Bold
            } else {
                FontStyle::Regular
            };
            let text = self.sanitize(&cell.text);
            let inner_width = (width - 2.0 * padding).max(0.0);
            cell_lines.push((style, get_metrics(style).wrap(&text, size, inner_width)));
        }

        let mut line_count = cell_lines
            .iter()
            .map(|(_, lines)| lines.len())
            .max()
            .unwrap_or(0)
            .max(1);

        let max_lines = ((self.config.usable_height() + FIT_EPSILON) / line_height)
            .floor()
            .max(1.0) as usize;
        if line_count > max_lines {
            let lines_dropped = cell_lines
                .iter_mut()
                .map(|(_, lines)| {
                    let dropped = lines.len().saturating_sub(max_lines);
                    lines.truncate(max_lines);
                    dropped
                })
                .sum();
            self.warnings.push(LayoutWarning::ClippedRow {
                block_index: index,
                lines_dropped,
            });
            line_count = max_lines;
        }

        let height = line_count as f32 * line_height;
        let top = self.reserve(height);

        let mut runs = Vec::new();
        let mut borders = Vec::with_capacity(widths.len());
        for ((style, lines), width) in cell_lines.iter().zip(&widths) {
            self.emphasis = *style;
            runs.extend(self.line_runs(lines, self.cursor_x + padding, top, size, line_height));
            borders.push(Rect {
                x: self.cursor_x,
                y: top,
                width: *width,
                height,
            });
            self.cursor_x += width;
        }
        self.emphasis = FontStyle::Regular;

        self.commit(PlacedBlock {
            source_index: index,
            kind: PlacedKind::TableRow,
            top,
            height,
            runs,
            borders,
            shape: Some(shape),
        });
    }

    // ── page management ─────────────────────────────────────────────────────

    /// Makes room for `height` and returns the top y of the reserved space.
    fn reserve(&mut self, height: f32) -> f32 {
        self.ensure_page();
        let overflows = self.cursor_y + height > self.config.content_bottom() + FIT_EPSILON;
        let page_has_content = self.cursor_y > self.config.content_top() + FIT_EPSILON;
        if overflows && page_has_content {
            self.break_page();
        }
        self.cursor_y
    }

    fn commit(&mut self, block: PlacedBlock) {
        self.cursor_y = block.top + block.height;
        self.cursor_x = self.config.margin_left_pt;
        if let Some(page) = self.current.as_mut() {
            page.blocks.push(block);
        }
    }

    fn ensure_page(&mut self) {
        if self.current.is_none() {
            let number = self.pages.len() as u32 + 1;
            self.current = Some(OpenPage {
                number,
                blocks: Vec::new(),
            });
            self.cursor_x = self.config.margin_left_pt;
            self.cursor_y = self.config.content_top();
        }
    }

    fn close_page(&mut self) {
        if let Some(open) = self.current.take() {
            self.pages.push(Page {
                number: open.number,
                title: self.title.clone(),
                header: header_run(self.config, &self.title),
                footer: footer_run(self.config, open.number),
                blocks: open.blocks,
            });
        }
    }

    fn break_page(&mut self) {
        self.close_page();
        self.ensure_page();
    }

    // ── helpers ─────────────────────────────────────────────────────────────

    fn line_runs(
        &self,
        lines: &[String],
        x: f32,
        top: f32,
        size: f32,
        line_height: f32,
    ) -> Vec<TextRun> {
        lines
            .iter()
            .enumerate()
            .filter(|(_, line)| !line.is_empty())
            .map(|(i, line)| TextRun {
                x,
                baseline_y: baseline(top + i as f32 * line_height, size, line_height),
                font_size: size,
                style: self.emphasis,
                text: line.clone(),
            })
            .collect()
    }

    /// Replaces unencodable characters and records them for the final warning.
    fn sanitize(&mut self, text: &str) -> String {
        let (clean, replaced) = substitute_unsupported(text);
        if !replaced.is_empty() {
            self.replaced_count += replaced.len();
            for c in replaced {
                if self.replaced_sample.len() < MAX_REPLACED_SAMPLE
                    && !self.replaced_sample.contains(&c)
                {
                    self.replaced_sample.push(c);
                }
            }
        }
        clean.into_owned()
    }
}

/// Baseline for a line whose box starts at `line_top`, text vertically centered.
fn baseline(line_top: f32, size: f32, line_height: f32) -> f32 {
    line_top + (line_height - size) / 2.0 + size * BASELINE_RATIO
}

/// Matches a row to a column profile. Missing cells are padded with empty ones; extra
/// cells are merged into the last column, joined by `" | "`.
fn fit_cells_to_columns(cells: &[Cell], columns: usize) -> Vec<Cell> {
    if cells.len() <= columns {
        let mut out = cells.to_vec();
        out.resize_with(columns, || Cell::plain(""));
        return out;
    }

    let keep = columns.saturating_sub(1);
    let mut out = cells[..keep].to_vec();
    let rest = &cells[keep..];
    out.push(Cell {
        text: rest
            .iter()
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" | "),
        emphasized: rest.iter().any(|c| c.emphasized),
    });
    out
}

/// Convenience wrapper: one engine, one document.
pub fn layout_document(config: &LayoutConfig, title: &str, blocks: &[Block]) -> LayoutOutput {
    LayoutEngine::new(config, title).layout(blocks)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::geometry::{default_layout_config, PaperSize};
    use crate::layout::markdown::parse_plan;

    const TITLE: &str = "Institute of Technology";

    fn config() -> LayoutConfig {
        default_layout_config(PaperSize::A4)
    }

    fn row(cells: &[&str]) -> Block {
        Block::TableRow {
            cells: cells.iter().map(|c| Cell::parse(c)).collect(),
        }
    }

    fn all_blocks(output: &LayoutOutput) -> Vec<&PlacedBlock> {
        output.pages.iter().flat_map(|p| p.blocks.iter()).collect()
    }

    // ── pages, header, footer ───────────────────────────────────────────────

    #[test]
    fn test_empty_document_has_one_stamped_page() {
        let output = layout_document(&config(), TITLE, &[]);
        assert_eq!(output.pages.len(), 1);
        assert_eq!(output.pages[0].number, 1);
        assert_eq!(output.pages[0].header.text, TITLE);
        assert_eq!(output.pages[0].footer.text, "Page 1");
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_long_document_paginates_with_constant_header() {
        let text = (0..200)
            .map(|i| format!("Paragraph {i} about variables and data types."))
            .collect::<Vec<_>>()
            .join("\n");
        let output = layout_document(&config(), TITLE, &parse_plan(&text));

        assert!(output.pages.len() > 1);
        for (i, page) in output.pages.iter().enumerate() {
            assert_eq!(page.number, i as u32 + 1);
            assert_eq!(page.title, TITLE);
            assert_eq!(page.header.text, TITLE);
            assert_eq!(page.footer.text, format!("Page {}", i + 1));
        }
        // Every source paragraph lands exactly once.
        assert_eq!(all_blocks(&output).len(), 200);
    }

    #[test]
    fn test_header_and_footer_are_centered() {
        let config = config();
        let header = header_run(&config, "Short");
        let width = get_metrics(FontStyle::Bold).width_pt("Short", header.font_size);
        assert!((header.x + width / 2.0 - config.page_width_pt / 2.0).abs() < 0.01);

        let footer = footer_run(&config, 12);
        assert_eq!(footer.text, "Page 12");
        assert!(footer.baseline_y > config.content_bottom());
    }

    #[test]
    fn test_blocks_stay_inside_content_area() {
        let config = config();
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(&format!("# Heading {i}\n| a | b | c | d |\nSome paragraph text.\n\n"));
        }
        let output = layout_document(&config, TITLE, &parse_plan(&text));
        for page in &output.pages {
            for block in &page.blocks {
                assert!(block.top >= config.content_top() - FIT_EPSILON);
                assert!(block.top + block.height <= config.content_bottom() + FIT_EPSILON);
            }
        }
    }

    #[test]
    fn test_long_header_title_is_truncated_to_usable_width() {
        let config = config();
        let title = "Department of Computer Science and Engineering, ".repeat(4);
        let header = header_run(&config, &title);

        assert!(header.text.ends_with("..."));
        assert!(header.text.len() < title.len());
        let width = get_metrics(FontStyle::Bold).width_pt(&header.text, header.font_size);
        assert!(width <= config.usable_width() + FIT_EPSILON);
        assert!(header.x >= config.margin_left_pt);
        assert!(header.x + width <= config.page_width_pt - config.margin_right_pt + FIT_EPSILON);
    }

    #[test]
    fn test_short_header_title_is_kept() {
        assert_eq!(header_run(&config(), TITLE).text, TITLE);
    }

    // ── page breaks ─────────────────────────────────────────────────────────

    #[test]
    fn test_paragraph_that_does_not_fit_moves_to_page_two() {
        let config = config();
        let line_height = config.line_height_pt;
        // Fill page 1 until exactly two lines of space remain.
        let filler_lines = (config.usable_height() / line_height).floor() as usize - 2;
        let mut blocks: Vec<Block> = (0..filler_lines).map(|_| Block::paragraph("filler")).collect();
        // A paragraph that wraps to well over two lines.
        blocks.push(Block::paragraph(&"lesson ".repeat(120)));

        let output = layout_document(&config, TITLE, &blocks);
        assert_eq!(output.pages.len(), 2);
        assert_eq!(output.pages[1].number, 2);
        assert_eq!(output.pages[1].header.text, output.pages[0].header.text);

        let moved = &output.pages[1].blocks[0];
        assert_eq!(moved.source_index, filler_lines);
        assert!((moved.top - config.content_top()).abs() < FIT_EPSILON);
        assert_eq!(output.pages[0].blocks.len(), filler_lines);
    }

    #[test]
    fn test_table_row_is_never_split_across_pages() {
        let config = config();
        let filler_lines = (config.usable_height() / config.line_height_pt).floor() as usize - 1;
        let mut blocks: Vec<Block> = (0..filler_lines).map(|_| Block::paragraph("filler")).collect();
        let tall_cell = "word ".repeat(60);
        blocks.push(row(&["0-10", &tall_cell, "Quiz"]));

        let output = layout_document(&config, TITLE, &blocks);
        assert_eq!(output.pages.len(), 2);
        let placed = &output.pages[1].blocks[0];
        assert_eq!(placed.kind, PlacedKind::TableRow);
        assert!(placed.height > config.line_height_pt);
    }

    #[test]
    fn test_oversized_paragraph_continues_across_pages() {
        let config = config();
        let huge = "objective ".repeat(3000);
        let output = layout_document(&config, TITLE, &[Block::paragraph(&huge)]);

        assert!(output.pages.len() > 1);
        assert!(output
            .warnings
            .iter()
            .any(|w| matches!(w, LayoutWarning::OversizedBlock { block_index: 0, .. })));
        for page in &output.pages {
            for block in &page.blocks {
                assert!(block.top + block.height <= config.content_bottom() + FIT_EPSILON);
            }
        }
    }

    #[test]
    fn test_oversized_row_is_clipped_to_one_page() {
        let config = config();
        let huge = "objective ".repeat(3000);
        let output = layout_document(&config, TITLE, &[row(&["a", &huge, "c"])]);

        assert_eq!(output.pages.len(), 1);
        assert!(output
            .warnings
            .iter()
            .any(|w| matches!(w, LayoutWarning::ClippedRow { block_index: 0, .. })));
        let placed = &output.pages[0].blocks[0];
        assert!(placed.height <= config.usable_height() + FIT_EPSILON);
    }

    #[test]
    fn test_blank_lines_add_space_without_runs() {
        let config = config();
        let output = layout_document(
            &config,
            TITLE,
            &[Block::paragraph("a"), Block::paragraph(""), Block::paragraph("b")],
        );
        let blocks = all_blocks(&output);
        assert_eq!(blocks.len(), 2);
        let gap = blocks[1].top - (blocks[0].top + blocks[0].height);
        assert!((gap - config.blank_line_pt).abs() < FIT_EPSILON);
    }

    // ── headings ────────────────────────────────────────────────────────────

    #[test]
    fn test_heading_is_bold_and_restores_regular() {
        let config = config();
        let mut engine = LayoutEngine::new(&config, TITLE);
        engine.push_block(0, &Block::heading(1, "Lesson Plan"));
        assert_eq!(engine.emphasis(), FontStyle::Regular);
        engine.push_block(1, &Block::paragraph("Body"));
        let output = engine.finish();

        let blocks = all_blocks(&output);
        assert_eq!(blocks[0].runs[0].style, FontStyle::Bold);
        assert_eq!(blocks[1].runs[0].style, FontStyle::Regular);
    }

    #[test]
    fn test_level1_heading_taller_than_level3() {
        let output = layout_document(
            &config(),
            TITLE,
            &[Block::heading(1, "Big"), Block::heading(3, "Small")],
        );
        let blocks = all_blocks(&output);
        assert!(blocks[0].height > blocks[1].height);
        assert!(blocks[0].runs[0].font_size > blocks[1].runs[0].font_size);
    }

    #[test]
    fn test_heading_bold_markers_not_drawn() {
        let output = layout_document(&config(), TITLE, &[Block::heading(3, "**1. Objectives:**")]);
        assert_eq!(all_blocks(&output)[0].runs[0].text, "1. Objectives:");
    }

    // ── table rows ──────────────────────────────────────────────────────────

    #[test]
    fn test_row_uses_three_column_profile() {
        let config = config();
        let output = layout_document(&config, TITLE, &[row(&["a", "b", "c"])]);
        let placed = all_blocks(&output)[0];
        assert_eq!(placed.shape, Some(RowShape::ThreeColumns));
        let widths: Vec<f32> = placed.borders.iter().map(|b| b.width).collect();
        assert_eq!(widths, config.columns.three);
        assert!((placed.borders[0].x - config.margin_left_pt).abs() < FIT_EPSILON);
    }

    #[test]
    fn test_row_height_is_tallest_cell_and_shared_by_borders() {
        let config = config();
        let long = "reinforce learning with a small case study drawn from the reference document";
        let output = layout_document(&config, TITLE, &[row(&["10 mins", long, "Slides", "Quiz"])]);
        let placed = all_blocks(&output)[0];

        let inner = config.columns.four[1] - 2.0 * config.cell_padding_pt;
        let expected_lines = get_metrics(FontStyle::Regular)
            .wrap(long, config.body_font_size_pt, inner)
            .len();
        assert!(expected_lines > 1);
        assert!((placed.height - expected_lines as f32 * config.line_height_pt).abs() < 1e-3);
        assert_eq!(placed.borders.len(), 4);
        for border in &placed.borders {
            assert_eq!(border.height, placed.height);
            assert_eq!(border.y, placed.top);
        }
    }

    #[test]
    fn test_emphasized_cell_is_bold_siblings_regular() {
        let config = config();
        let mut engine = LayoutEngine::new(&config, TITLE);
        engine.push_block(0, &row(&["**Time**", "Activity", "Notes"]));
        assert_eq!(engine.emphasis(), FontStyle::Regular);
        let output = engine.finish();
        let placed = all_blocks(&output)[0];

        let time = placed.runs.iter().find(|r| r.text == "Time").unwrap();
        let activity = placed.runs.iter().find(|r| r.text == "Activity").unwrap();
        let notes = placed.runs.iter().find(|r| r.text == "Notes").unwrap();
        assert_eq!(time.style, FontStyle::Bold);
        assert_eq!(activity.style, FontStyle::Regular);
        assert_eq!(notes.style, FontStyle::Regular);
        assert!(placed.runs.iter().all(|r| !r.text.contains("**")));
        assert!(placed.borders.iter().all(|b| b.height == placed.height));
    }

    #[test]
    fn test_cursor_returns_to_left_margin_after_row() {
        let config = config();
        let output = layout_document(
            &config,
            TITLE,
            &[row(&["a", "b", "c", "d"]), Block::paragraph("after")],
        );
        let blocks = all_blocks(&output);
        assert_eq!(blocks[1].runs[0].x, config.margin_left_pt);
        assert!((blocks[1].top - (blocks[0].top + blocks[0].height)).abs() < FIT_EPSILON);
    }

    #[test]
    fn test_unrecognized_shape_uses_fallback_and_warns() {
        let config = config();
        let output = layout_document(&config, TITLE, &[row(&["a", "b", "c", "d", "e"])]);
        let placed = all_blocks(&output)[0];
        assert_eq!(placed.shape, Some(RowShape::Fallback));
        assert_eq!(placed.borders.len(), config.columns.fallback.len());
        assert!(placed.runs.iter().any(|r| r.text.contains("b | c | d | e")));
        assert_eq!(
            output.warnings,
            vec![LayoutWarning::UnrecognizedRowShape { block_index: 0, cells: 5 }]
        );
    }

    #[test]
    fn test_two_cell_row_is_fallback_without_warning() {
        let output = layout_document(&config(), TITLE, &[row(&["Course", "Intro to Python"])]);
        assert_eq!(all_blocks(&output)[0].shape, Some(RowShape::Fallback));
        assert!(output.warnings.is_empty());
    }

    #[test]
    fn test_row_widths_within_usable_width_for_every_shape() {
        let config = config();
        for n in 1..=6 {
            let cells: Vec<String> = (0..n).map(|i| format!("c{i}")).collect();
            let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
            let output = layout_document(&config, TITLE, &[row(&refs)]);
            let placed = all_blocks(&output)[0];
            let total: f32 = placed.borders.iter().map(|b| b.width).sum();
            assert!(total <= config.usable_width() + 1e-3);
        }
    }

    #[test]
    fn test_fit_cells_pads_and_merges() {
        let padded = fit_cells_to_columns(&[Cell::plain("only")], 2);
        assert_eq!(padded, vec![Cell::plain("only"), Cell::plain("")]);

        let merged = fit_cells_to_columns(
            &[Cell::plain("a"), Cell::plain("b"), Cell::parse("**c**")],
            2,
        );
        assert_eq!(merged[0], Cell::plain("a"));
        assert_eq!(merged[1].text, "b | c");
        assert!(merged[1].emphasized);
    }

    // ── degraded rendering ──────────────────────────────────────────────────

    #[test]
    fn test_unsupported_characters_replaced_with_warning() {
        let output = layout_document(
            &config(),
            "🎓 Institute",
            &[Block::paragraph("Great work ✨✨"), row(&["😀", "ok", "x"])],
        );
        assert_eq!(output.pages[0].header.text, "? Institute");
        let blocks = all_blocks(&output);
        assert_eq!(blocks[0].runs[0].text, "Great work ??");
        match &output.warnings[0] {
            LayoutWarning::UnsupportedCharacters { count, sample } => {
                assert_eq!(*count, 4);
                assert_eq!(sample, "🎓✨😀");
            }
            other => panic!("unexpected warning {other:?}"),
        }
    }
}
