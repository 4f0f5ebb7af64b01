//! Text selection state and the highlight it produces

use super::layout::{DocumentLayout, RowKind};

/// A character position in the laid-out document
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct DocPoint {
    /// Layout row
    pub row: usize,
    /// Character index within the row
    pub idx: usize,
}

/// Highlight rectangle in cells, relative to the document's content origin
/// (row 0 is the first layout row, regardless of scroll).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HighlightRect {
    pub top: usize,
    pub left: usize,
    pub width: usize,
    pub height: usize,
}

/// Anchor/cursor selection driven by mouse press, drag and release
#[derive(Clone, Debug, Default)]
pub struct TextSelection {
    /// Where the press landed
    pub anchor: Option<DocPoint>,
    /// Where the pointer is now
    pub cursor: Option<DocPoint>,
    /// Whether a drag is in progress
    pub is_selecting: bool,
    /// The pointer moved while pressed, even if it came back to the anchor
    pub dragged: bool,
}

impl TextSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_at(&mut self, point: DocPoint) {
        self.anchor = Some(point);
        self.cursor = Some(point);
        self.is_selecting = true;
        self.dragged = false;
    }

    pub fn update_cursor(&mut self, point: DocPoint) {
        if self.is_selecting {
            self.cursor = Some(point);
        }
    }

    /// Pointer motion with the button held
    pub fn drag_to(&mut self, point: DocPoint) {
        if self.is_selecting {
            self.cursor = Some(point);
            self.dragged = true;
        }
    }

    pub fn finish(&mut self) {
        self.is_selecting = false;
    }

    /// Collapse the selection
    pub fn clear(&mut self) {
        self.anchor = None;
        self.cursor = None;
        self.is_selecting = false;
        self.dragged = false;
    }

    /// A press and release without any drag in between selects nothing
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.cursor && !self.dragged
    }

    /// Ordered (start, end) points, end inclusive
    #[must_use]
    pub fn ordered_bounds(&self) -> Option<(DocPoint, DocPoint)> {
        match (self.anchor, self.cursor) {
            (Some(a), Some(c)) if a != c || self.dragged => Some((a.min(c), a.max(c))),
            _ => None,
        }
    }

    /// Selected text, with wrapped rows rejoined by spaces and source lines
    /// kept apart by newlines. Not trimmed.
    #[must_use]
    pub fn selected_text(&self, layout: &DocumentLayout) -> String {
        let Some((start, end)) = self.ordered_bounds() else {
            return String::new();
        };

        let mut text = String::new();
        let mut first = true;
        for row_idx in start.row..=end.row {
            let Some(row) = layout.row(row_idx) else {
                break;
            };
            let continues = match row.kind {
                RowKind::Text { continues, .. } => continues,
                RowKind::Blank => {
                    if !first {
                        text.push('\n');
                    }
                    continue;
                }
                RowKind::PageHeader(_) => continue,
            };
            let Some((from, to)) = row_span(row.char_count(), row_idx, start, end) else {
                continue;
            };

            if !first {
                text.push(if continues { ' ' } else { '\n' });
            }
            text.push_str(&row.slice(from, to));
            first = false;
        }
        text
    }

    /// Bounding rectangle of the selected glyphs
    #[must_use]
    pub fn bounding_rect(&self, layout: &DocumentLayout) -> Option<HighlightRect> {
        let (start, end) = self.ordered_bounds()?;

        let mut top = None;
        let mut bottom = 0;
        let mut left = usize::MAX;
        let mut right = 0;

        for row_idx in start.row..=end.row {
            let Some(row) = layout.row(row_idx) else {
                break;
            };
            if !row.is_text() {
                continue;
            }
            let Some((from, to)) = row_span(row.char_count(), row_idx, start, end) else {
                continue;
            };
            top.get_or_insert(row_idx);
            bottom = row_idx;
            left = left.min(row.column_of(from));
            right = right.max(row.column_after(to));
        }

        let top = top?;
        Some(HighlightRect {
            top,
            left,
            width: right.saturating_sub(left),
            height: bottom - top + 1,
        })
    }
}

/// Selected character range (inclusive) of one row
fn row_span(
    char_count: usize,
    row_idx: usize,
    start: DocPoint,
    end: DocPoint,
) -> Option<(usize, usize)> {
    if char_count == 0 {
        return None;
    }
    let last = char_count - 1;
    let from = if row_idx == start.row { start.idx } else { 0 };
    let to = if row_idx == end.row { end.idx.min(last) } else { last };
    (from <= to).then_some((from, to))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewer::extract::PageText;

    fn layout() -> DocumentLayout {
        // rows: 0 header, 1 "Deductible: $1,500", 2 blank,
        //       3 "Coinsurance: 20% after deductible", 4 "Copay: $30", 5 blank
        DocumentLayout::build(&[PageText::new([
            "Deductible: $1,500",
            "",
            "Coinsurance: 20% after deductible",
            "Copay: $30",
        ])])
    }

    fn select(from: (usize, usize), to: (usize, usize)) -> TextSelection {
        let mut selection = TextSelection::new();
        selection.start_at(DocPoint {
            row: from.0,
            idx: from.1,
        });
        selection.update_cursor(DocPoint {
            row: to.0,
            idx: to.1,
        });
        selection.finish();
        selection
    }

    #[test]
    fn test_press_without_drag_is_collapsed() {
        let selection = select((1, 3), (1, 3));
        assert!(selection.is_collapsed());
        assert!(selection.selected_text(&layout()).is_empty());
        assert!(selection.bounding_rect(&layout()).is_none());
    }

    #[test]
    fn test_drag_back_onto_anchor_selects_one_glyph() {
        let mut selection = TextSelection::new();
        let percent = DocPoint { row: 3, idx: 15 };
        selection.start_at(percent);
        selection.drag_to(DocPoint { row: 3, idx: 18 });
        selection.drag_to(percent);
        selection.update_cursor(percent);
        selection.finish();

        let layout = layout();
        assert!(!selection.is_collapsed());
        assert_eq!(selection.selected_text(&layout), "%");
        assert_eq!(
            selection.bounding_rect(&layout),
            Some(HighlightRect {
                top: 3,
                left: 15,
                width: 1,
                height: 1
            })
        );
    }

    #[test]
    fn test_new_press_forgets_previous_drag() {
        let mut selection = TextSelection::new();
        selection.start_at(DocPoint { row: 3, idx: 0 });
        selection.drag_to(DocPoint { row: 3, idx: 6 });
        selection.start_at(DocPoint { row: 1, idx: 2 });
        selection.finish();
        assert!(selection.is_collapsed());
    }

    #[test]
    fn test_single_row_selection() {
        let selection = select((3, 0), (3, 32));
        let layout = layout();
        assert_eq!(selection.selected_text(&layout), "Coinsurance: 20% after deductible");
        assert_eq!(
            selection.bounding_rect(&layout),
            Some(HighlightRect {
                top: 3,
                left: 0,
                width: 33,
                height: 1
            })
        );
    }

    #[test]
    fn test_backwards_drag_is_normalized() {
        let forward = select((3, 13), (3, 15));
        let backward = select((3, 15), (3, 13));
        let layout = layout();
        assert_eq!(forward.selected_text(&layout), "20%");
        assert_eq!(backward.selected_text(&layout), "20%");
        assert_eq!(
            backward.bounding_rect(&layout),
            Some(HighlightRect {
                top: 3,
                left: 13,
                width: 3,
                height: 1
            })
        );
    }

    #[test]
    fn test_multi_row_selection_spans_blank_rows() {
        let selection = select((1, 12), (4, 4));
        let layout = layout();
        assert_eq!(
            selection.selected_text(&layout),
            "$1,500\n\nCoinsurance: 20% after deductible\nCopay"
        );
        let rect = selection.bounding_rect(&layout).unwrap();
        assert_eq!(rect.top, 1);
        assert_eq!(rect.height, 4);
        assert_eq!(rect.left, 0);
        assert_eq!(rect.width, 33);
    }

    #[test]
    fn test_cursor_past_line_end_is_clamped() {
        let selection = select((4, 0), (4, 200));
        assert_eq!(selection.selected_text(&layout()), "Copay: $30");
    }

    #[test]
    fn test_clear_collapses() {
        let mut selection = select((1, 0), (1, 5));
        selection.clear();
        assert!(selection.ordered_bounds().is_none());
        assert!(!selection.is_selecting);
    }
}
