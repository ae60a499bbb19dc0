//! Plan text → block sequence.
//!
//! Each input line becomes at most one block. Classification order:
//! 1. `"# "`  → level-1 heading
//! 2. `"### "` → level-3 heading
//! 3. `'|'`   → table row (alignment separator rows are dropped)
//! 4. blank   → empty paragraph (keeps the source's vertical spacing)
//! 5. else    → paragraph, verbatim
//!
//! Multi-line table cells are not supported: a cell containing a line break is split into
//! two unrelated lines by construction.

use serde::{Deserialize, Serialize};

const H1_MARKER: &str = "# ";
const H3_MARKER: &str = "### ";
const ROW_DELIMITER: char = '|';
/// Inline bold marker. Stripped from cells (setting `emphasized`) and from rendered text.
pub const BOLD_MARKER: &str = "**";

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    pub emphasized: bool,
}

impl Cell {
    /// Builds a cell from a raw field between two pipes.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.contains(BOLD_MARKER) {
            Cell {
                text: raw.replace(BOLD_MARKER, "").trim().to_string(),
                emphasized: true,
            }
        } else {
            Cell {
                text: raw.to_string(),
                emphasized: false,
            }
        }
    }

    pub fn plain(text: &str) -> Self {
        Cell {
            text: text.to_string(),
            emphasized: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, text: String },
    TableRow { cells: Vec<Cell> },
    Paragraph { text: String },
}

impl Block {
    pub fn heading(level: u8, text: &str) -> Self {
        Block::Heading {
            level,
            text: text.to_string(),
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Block::Paragraph {
            text: text.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Parsing
// ────────────────────────────────────────────────────────────────────────────

/// Parses generated plan text into an ordered block sequence.
pub fn parse_plan(text: &str) -> Vec<Block> {
    text.lines().filter_map(parse_line).collect()
}

/// Classifies one line. Returns `None` only for rows that must not be rendered
/// (alignment separators and pipe lines without cells).
pub fn parse_line(line: &str) -> Option<Block> {
    let lead = line.trim_start();

    if let Some(rest) = lead.strip_prefix(H1_MARKER) {
        return Some(Block::heading(1, rest.trim()));
    }
    if let Some(rest) = lead.strip_prefix(H3_MARKER) {
        return Some(Block::heading(3, rest.trim()));
    }
    if lead.starts_with(ROW_DELIMITER) {
        return parse_row(lead);
    }
    if lead.trim_end().is_empty() {
        return Some(Block::paragraph(""));
    }
    Some(Block::paragraph(line))
}

fn parse_row(line: &str) -> Option<Block> {
    let mut fields: Vec<&str> = line.split(ROW_DELIMITER).collect();
    // Field 0 is whatever precedes the opening pipe: always empty here.
    fields.remove(0);
    // Closing boundary. Rows without a closing pipe keep their last cell.
    if fields.last().is_some_and(|f| f.trim().is_empty()) {
        fields.pop();
    }

    if fields.is_empty() || is_separator_row(&fields) {
        return None;
    }

    Some(Block::TableRow {
        cells: fields.into_iter().map(Cell::parse).collect(),
    })
}

/// True for alignment rows such as `|---|:---:|--:|`.
fn is_separator_row(fields: &[&str]) -> bool {
    fields.iter().all(|f| {
        let f = f.trim();
        !f.is_empty() && f.contains('-') && f.chars().all(|c| matches!(c, '-' | ':' | ' '))
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Serialization
// ────────────────────────────────────────────────────────────────────────────

/// Writes blocks back to plan text. `parse_plan(&serialize_blocks(b)) == b` for any
/// block sequence produced by `parse_plan`.
///
/// Every block is newline-terminated: `str::lines` drops a final empty line, so a
/// plain join would lose trailing blank paragraphs.
#[cfg(test)]
pub fn serialize_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(|block| format!("{}\n", serialize_block(block)))
        .collect()
}

#[cfg(test)]
fn serialize_block(block: &Block) -> String {
    match block {
        Block::Heading { level, text } => {
            let marker = if *level <= 1 { H1_MARKER } else { H3_MARKER };
            format!("{marker}{text}")
        }
        Block::TableRow { cells } => {
            let inner: Vec<String> = cells
                .iter()
                .map(|c| {
                    if c.emphasized {
                        format!(" {BOLD_MARKER}{}{BOLD_MARKER} ", c.text)
                    } else {
                        format!(" {} ", c.text)
                    }
                })
                .collect();
            format!("|{}|", inner.join("|"))
        }
        Block::Paragraph { text } => text.clone(),
    }
}

/// Text as drawn on the page: inline bold markers removed.
pub fn display_text(text: &str) -> String {
    text.replace(BOLD_MARKER, "")
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
