//! Sequential page layout at a fixed display width

use unicode_width::UnicodeWidthChar;

use super::extract::PageText;

/// Columns every page is laid out to. Narrower panes clip.
pub const DISPLAY_WIDTH: usize = 88;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowKind {
    /// Separator announcing a page (0-indexed)
    PageHeader(usize),
    /// Document text belonging to a page
    Text { page: usize, continues: bool },
    Blank,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutRow {
    pub kind: RowKind,
    pub text: String,
}

impl LayoutRow {
    pub fn is_text(&self) -> bool {
        matches!(self.kind, RowKind::Text { .. })
    }

    /// Display width of the row's text in terminal columns
    pub fn width(&self) -> usize {
        self.text.chars().map(char_width).sum()
    }

    /// Index of the character drawn at `column`, if any
    pub fn char_at_column(&self, column: usize) -> Option<usize> {
        let mut start = 0;
        for (idx, ch) in self.text.chars().enumerate() {
            let end = start + char_width(ch);
            if column < end {
                return Some(idx);
            }
            start = end;
        }
        None
    }

    /// First display column occupied by character `idx`
    pub fn column_of(&self, idx: usize) -> usize {
        self.text.chars().take(idx).map(char_width).sum()
    }

    /// Column just past character `idx`
    pub fn column_after(&self, idx: usize) -> usize {
        self.text.chars().take(idx + 1).map(char_width).sum()
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn slice(&self, from: usize, to_inclusive: usize) -> String {
        self.text
            .chars()
            .skip(from)
            .take((to_inclusive + 1).saturating_sub(from))
            .collect()
    }
}

fn char_width(ch: char) -> usize {
    ch.width().unwrap_or(0)
}

/// All pages flattened into display rows
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentLayout {
    rows: Vec<LayoutRow>,
    page_count: usize,
}

impl DocumentLayout {
    #[must_use]
    pub fn build(pages: &[PageText]) -> Self {
        Self::build_with_width(pages, DISPLAY_WIDTH)
    }

    #[must_use]
    pub fn build_with_width(pages: &[PageText], width: usize) -> Self {
        let mut rows = Vec::new();

        for (page, page_text) in pages.iter().enumerate() {
            rows.push(LayoutRow {
                kind: RowKind::PageHeader(page),
                text: page_header(page, width),
            });

            for line in &page_text.lines {
                if line.trim().is_empty() {
                    rows.push(LayoutRow {
                        kind: RowKind::Blank,
                        text: String::new(),
                    });
                    continue;
                }
                for (i, piece) in textwrap::wrap(line, width).into_iter().enumerate() {
                    rows.push(LayoutRow {
                        kind: RowKind::Text {
                            page,
                            continues: i > 0,
                        },
                        text: piece.into_owned(),
                    });
                }
            }

            rows.push(LayoutRow {
                kind: RowKind::Blank,
                text: String::new(),
            });
        }

        Self {
            rows,
            page_count: pages.len(),
        }
    }

    pub fn rows(&self) -> &[LayoutRow] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&LayoutRow> {
        self.rows.get(idx)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

fn page_header(page: usize, width: usize) -> String {
    let label = format!(" Page {} ", page + 1);
    let side = width.saturating_sub(label.len()) / 2;
    format!("{}{}{}", "─".repeat(side), label, "─".repeat(side))
}
