//! Document viewer: loads a PDF, lays out its pages and turns pointer input
//! into selection events.

mod document;
mod extract;
mod layout;
pub mod loader;
mod selection;

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use log::{error, info};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

pub use document::{DocumentHandle, is_pdf_path};
#[cfg(feature = "pdf")]
pub use extract::MupdfExtractor;
pub use extract::{DocumentError, PageText, PdfTextExtractor, UnavailableExtractor};
pub use layout::{DISPLAY_WIDTH, DocumentLayout, LayoutRow, RowKind};
pub use loader::{ViewerCapability, ViewerSlot};
pub use selection::{DocPoint, HighlightRect, TextSelection};

use crate::theme::Base16Palette;

/// What the viewer reports to its owner
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewerEvent {
    /// Non-empty trimmed selection text
    SelectionMade(String),
    SelectionCleared,
    /// A new file was opened (display name)
    FileLoaded(String),
}

pub struct DocumentViewer {
    extractor: Box<dyn PdfTextExtractor>,
    document: Option<DocumentHandle>,
    layout: DocumentLayout,
    page_count: Option<usize>,
    selection: TextSelection,
    highlight: Option<HighlightRect>,
    scroll_offset: usize,
    /// Inner content area from the last draw, used for hit testing
    last_inner_area: Option<Rect>,
}

impl DocumentViewer {
    pub fn new(extractor: Box<dyn PdfTextExtractor>) -> Self {
        Self {
            extractor,
            document: None,
            layout: DocumentLayout::default(),
            page_count: None,
            selection: TextSelection::new(),
            highlight: None,
            scroll_offset: 0,
            last_inner_area: None,
        }
    }

    /// Open a PDF from disk.
    ///
    /// Only an unreadable or non-PDF path is an error; in that case nothing
    /// changes. Otherwise an active highlight is cleared (and reported) before
    /// the new file is announced, and the previous document copy is released
    /// before the new one is created. Extraction failures are logged and leave
    /// the viewer empty, but the file still counts as loaded.
    pub fn open_file(&mut self, path: &Path) -> Result<Vec<ViewerEvent>, DocumentError> {
        let (file_name, bytes) = DocumentHandle::read_source(path)?;
        info!("Opening {file_name}");

        let mut events = Vec::new();
        let had_highlight = self.highlight.is_some();
        self.clear_highlight();
        if had_highlight {
            events.push(ViewerEvent::SelectionCleared);
        }

        self.document = None;
        self.layout = DocumentLayout::default();
        self.page_count = None;
        self.scroll_offset = 0;

        match DocumentHandle::create(file_name.clone(), &bytes) {
            Ok(handle) => {
                match self.extractor.extract_pages(handle.path()) {
                    Ok(pages) => {
                        info!("Loaded {file_name}: {} pages", pages.len());
                        self.page_count = Some(pages.len());
                        self.layout = DocumentLayout::build(&pages);
                    }
                    Err(e) => {
                        error!("Failed to load PDF {file_name}: {e}");
                    }
                }
                self.document = Some(handle);
            }
            Err(e) => {
                error!("Failed to stage {file_name} for viewing: {e}");
            }
        }

        events.push(ViewerEvent::FileLoaded(file_name));
        Ok(events)
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Vec<ViewerEvent> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.handle_mouse_down(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => {
                self.handle_mouse_drag(mouse.column, mouse.row);
                vec![]
            }
            MouseEventKind::Up(MouseButton::Left) => self.handle_mouse_up(mouse.column, mouse.row),
            MouseEventKind::ScrollDown => {
                self.scroll_by(3);
                vec![]
            }
            MouseEventKind::ScrollUp => {
                self.scroll_by(-3);
                vec![]
            }
            _ => vec![],
        }
    }

    fn handle_mouse_down(&mut self, x: u16, y: u16) -> Vec<ViewerEvent> {
        if !self.contains(x, y) {
            return vec![];
        }

        match self.hit_text(x, y) {
            Some(point) => {
                self.selection.start_at(point);
                vec![]
            }
            None => {
                self.clear_highlight();
                vec![ViewerEvent::SelectionCleared]
            }
        }
    }

    fn handle_mouse_drag(&mut self, x: u16, y: u16) {
        if !self.selection.is_selecting {
            return;
        }
        if let Some(point) = self.nearest_point(x, y) {
            self.selection.drag_to(point);
        }
    }

    fn handle_mouse_up(&mut self, x: u16, y: u16) -> Vec<ViewerEvent> {
        if !self.selection.is_selecting {
            return vec![];
        }
        if let Some(point) = self.nearest_point(x, y) {
            self.selection.update_cursor(point);
        }
        self.selection.finish();

        let text = self.selection.selected_text(&self.layout);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return vec![];
        }

        self.highlight = self.selection.bounding_rect(&self.layout);
        vec![ViewerEvent::SelectionMade(trimmed.to_string())]
    }

    fn clear_highlight(&mut self) {
        self.highlight = None;
        self.selection.clear();
    }

    /// Keyboard scrolling. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let page = self.visible_height().max(1) as isize;
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_by(page / 2)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.scroll_by(-page / 2)
            }
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(page),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::Char('g') | KeyCode::Home => self.scroll_offset = 0,
            KeyCode::Char('G') | KeyCode::End => self.scroll_offset = self.max_scroll(),
            _ => return false,
        }
        true
    }

    fn scroll_by(&mut self, delta: isize) {
        let target = self.scroll_offset as isize + delta;
        self.scroll_offset = target.clamp(0, self.max_scroll() as isize) as usize;
    }

    fn visible_height(&self) -> usize {
        self.last_inner_area.map_or(0, |area| area.height as usize)
    }

    fn max_scroll(&self) -> usize {
        self.layout.len().saturating_sub(self.visible_height().max(1))
    }

    fn contains(&self, x: u16, y: u16) -> bool {
        self.last_inner_area.is_some_and(|area| {
            x >= area.x && x < area.x + area.width && y >= area.y && y < area.y + area.height
        })
    }

    /// Document position under a screen cell, only if a glyph is drawn there
    fn hit_text(&self, x: u16, y: u16) -> Option<DocPoint> {
        let area = self.last_inner_area?;
        let row = (y - area.y) as usize + self.scroll_offset;
        let column = (x - area.x) as usize;
        let layout_row = self.layout.row(row)?;
        if !layout_row.is_text() {
            return None;
        }
        let idx = layout_row.char_at_column(column)?;
        Some(DocPoint { row, idx })
    }

    /// Document position for a drag, clamped into the document
    fn nearest_point(&self, x: u16, y: u16) -> Option<DocPoint> {
        let area = self.last_inner_area?;
        if self.layout.is_empty() {
            return None;
        }
        let rel_y = y.clamp(area.y, area.y + area.height.saturating_sub(1)) - area.y;
        let row = (rel_y as usize + self.scroll_offset).min(self.layout.len() - 1);
        let column = x.saturating_sub(area.x) as usize;
        let layout_row = self.layout.row(row)?;
        let idx = layout_row
            .char_at_column(column)
            .unwrap_or_else(|| layout_row.char_count().saturating_sub(1));
        Some(DocPoint { row, idx })
    }

    pub fn highlight(&self) -> Option<HighlightRect> {
        self.highlight
    }

    pub fn page_count(&self) -> Option<usize> {
        self.page_count
    }

    pub fn file_name(&self) -> Option<&str> {
        self.document.as_ref().map(DocumentHandle::file_name)
    }

    /// Location of the private copy currently held, if any
    pub fn document_path(&self) -> Option<&Path> {
        self.document.as_ref().map(DocumentHandle::path)
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn inner_area(&self) -> Option<Rect> {
        self.last_inner_area
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, palette: &Base16Palette, focused: bool) {
        let title = match (self.file_name(), self.page_count) {
            (Some(name), Some(1)) => format!(" {name} · 1 page "),
            (Some(name), Some(pages)) => format!(" {name} · {pages} pages "),
            (Some(name), None) => format!(" {name} "),
            (None, _) => " Document ".to_string(),
        };
        let border_color = if focused {
            palette.base_0d
        } else {
            palette.base_03
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(title);
        let inner = block.inner(area);
        self.last_inner_area = Some(inner);
        self.scroll_offset = self.scroll_offset.min(self.max_scroll());

        let lines: Vec<Line> = if self.document.is_none() {
            vec![Line::from(Span::styled(
                "Press o to open a PDF",
                Style::default().fg(palette.base_03),
            ))]
        } else {
            self.layout
                .rows()
                .iter()
                .skip(self.scroll_offset)
                .take(inner.height as usize)
                .map(|row| styled_row(row, palette))
                .collect()
        };

        frame.render_widget(Paragraph::new(lines).block(block), area);
        self.paint_highlight(frame, inner, palette);
    }

    /// Overlay the highlight as a background patch. Input never targets it.
    fn paint_highlight(&self, frame: &mut Frame, inner: Rect, palette: &Base16Palette) {
        let Some(rect) = self.highlight else {
            return;
        };
        let buf = frame.buffer_mut();
        for doc_row in rect.top..rect.top + rect.height {
            let Some(screen_row) = doc_row.checked_sub(self.scroll_offset) else {
                continue;
            };
            if screen_row >= inner.height as usize {
                break;
            }
            let y = inner.y + screen_row as u16;
            for col in rect.left..rect.left + rect.width {
                if col >= inner.width as usize {
                    break;
                }
                let x = inner.x + col as u16;
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_bg(palette.base_0a);
                    cell.set_fg(palette.base_00);
                }
            }
        }
    }
}

fn styled_row(row: &LayoutRow, palette: &Base16Palette) -> Line<'static> {
    match row.kind {
        RowKind::PageHeader(_) => Line::from(Span::styled(
            row.text.clone(),
            Style::default()
                .fg(palette.base_03)
                .add_modifier(Modifier::DIM),
        )),
        RowKind::Text { .. } => Line::from(Span::styled(
            row.text.clone(),
            Style::default().fg(palette.base_05),
        )),
        RowKind::Blank => Line::default(),
    }
}
