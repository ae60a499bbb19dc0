//! Page geometry and column-width profiles for the layout engine.
//!
//! All values are PDF points (1/72 inch). Layout coordinates are top-down: `y = 0` is the
//! top edge of the page. The PDF renderer flips them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Paper size
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperSize {
    #[default]
    A4,
    Letter,
}

impl PaperSize {
    /// (width, height) in points.
    pub fn dimensions_pt(self) -> (f32, f32) {
        match self {
            PaperSize::A4 => (595.28, 841.89),
            PaperSize::Letter => (612.0, 792.0),
        }
    }
}

impl FromStr for PaperSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PaperSize::A4),
            "letter" | "us-letter" => Ok(PaperSize::Letter),
            other => Err(format!("unknown paper size '{other}' (expected a4 or letter)")),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Column profiles
// ────────────────────────────────────────────────────────────────────────────

/// Which column profile a table row was laid out with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowShape {
    FourColumns,
    ThreeColumns,
    /// Default two-column split, used for every other cell count.
    Fallback,
}

impl RowShape {
    pub fn for_cell_count(cells: usize) -> Self {
        match cells {
            4 => RowShape::FourColumns,
            3 => RowShape::ThreeColumns,
            _ => RowShape::Fallback,
        }
    }
}

/// Fixed column widths keyed by row shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTable {
    pub four: Vec<f32>,
    pub three: Vec<f32>,
    pub fallback: Vec<f32>,
}

impl ColumnTable {
    pub fn widths(&self, shape: RowShape) -> &[f32] {
        match shape {
            RowShape::FourColumns => &self.four,
            RowShape::ThreeColumns => &self.three,
            RowShape::Fallback => &self.fallback,
        }
    }
}

impl Default for ColumnTable {
    /// Profiles sized for the narrowest supported usable width (A4 with 0.5" margins, 523pt).
    fn default() -> Self {
        Self {
            // Time | Activity | Description | Resources
            four: vec![78.0, 110.0, 225.0, 110.0],
            // Phase | Description | Assessment
            three: vec![110.0, 263.0, 150.0],
            fallback: vec![160.0, 363.0],
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout configuration
// ────────────────────────────────────────────────────────────────────────────

/// Geometry constants for one render. Passed once at the render-call boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub paper: PaperSize,
    pub page_width_pt: f32,
    pub page_height_pt: f32,
    pub margin_left_pt: f32,
    pub margin_right_pt: f32,
    pub margin_top_pt: f32,
    pub margin_bottom_pt: f32,
    /// Band below the top margin reserved for the running header.
    pub header_height_pt: f32,
    /// Band above the bottom margin reserved for the page-number footer.
    pub footer_height_pt: f32,
    pub header_font_size_pt: f32,
    pub footer_font_size_pt: f32,
    pub body_font_size_pt: f32,
    /// Base line height for paragraphs and table rows.
    pub line_height_pt: f32,
    pub heading1_font_size_pt: f32,
    pub heading1_line_height_pt: f32,
    pub heading3_font_size_pt: f32,
    pub heading3_line_height_pt: f32,
    /// Vertical space consumed by an empty source line.
    pub blank_line_pt: f32,
    /// Horizontal inset of cell text from its border.
    pub cell_padding_pt: f32,
    pub columns: ColumnTable,
}

/// Returns the default layout for the given paper size: 0.5" margins, Helvetica 10pt body.
pub fn default_layout_config(paper: PaperSize) -> LayoutConfig {
    let (page_width_pt, page_height_pt) = paper.dimensions_pt();
    LayoutConfig {
        paper,
        page_width_pt,
        page_height_pt,
        margin_left_pt: 36.0,
        margin_right_pt: 36.0,
        margin_top_pt: 36.0,
        margin_bottom_pt: 36.0,
        header_height_pt: 28.0,
        footer_height_pt: 24.0,
        header_font_size_pt: 12.0,
        footer_font_size_pt: 8.0,
        body_font_size_pt: 10.0,
        line_height_pt: 14.0,
        heading1_font_size_pt: 16.0,
        heading1_line_height_pt: 22.0,
        heading3_font_size_pt: 12.0,
        heading3_line_height_pt: 17.0,
        blank_line_pt: 7.0,
        cell_padding_pt: 3.0,
        columns: ColumnTable::default(),
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        default_layout_config(PaperSize::A4)
    }
}

impl LayoutConfig {
    pub fn usable_width(&self) -> f32 {
        self.page_width_pt - self.margin_left_pt - self.margin_right_pt
    }

    /// Height of the content area between the header band and the footer band.
    pub fn usable_height(&self) -> f32 {
        self.content_bottom() - self.content_top()
    }

    /// First y position below the header band.
    pub fn content_top(&self) -> f32 {
        self.margin_top_pt + self.header_height_pt
    }

    /// Last y position above the footer band.
    pub fn content_bottom(&self) -> f32 {
        self.page_height_pt - self.margin_bottom_pt - self.footer_height_pt
    }

    /// `(font size, line height)` for a heading level. Level 1 is the large style; every
    /// other level uses the level-3 style.
    pub fn heading_metrics(&self, level: u8) -> (f32, f32) {
        if level <= 1 {
            (self.heading1_font_size_pt, self.heading1_line_height_pt)
        } else {
            (self.heading3_font_size_pt, self.heading3_line_height_pt)
        }
    }

    /// Column widths for a row with `cell_count` cells.
    ///
    /// A profile wider than the usable width (custom geometry) is scaled down
    /// proportionally, so a row never extends past the right margin.
    pub fn column_widths(&self, cell_count: usize) -> (RowShape, Vec<f32>) {
        let shape = RowShape::for_cell_count(cell_count);
        let widths = self.columns.widths(shape);
        let total: f32 = widths.iter().sum();
        let usable = self.usable_width();
        let widths = if total > usable && total > 0.0 {
            let scale = usable / total;
            widths.iter().map(|w| w * scale).collect()
        } else {
            widths.to_vec()
        };
        (shape, widths)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
