//! Top-level screen: wires the document viewer to the backend and renders
//! the overview and highlight panels.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::event_source::{Event, EventSource};
use crate::inputs::{InputOutcome, LineInput};
use crate::notification::NotificationManager;
use crate::rag::{Endpoint, RagBackend, RagReply, RagService};
use crate::session::{HighlightSession, OverviewSession};
use crate::theme::{Base16Palette, ThemeId};
use crate::viewer::{DocumentViewer, ViewerCapability, ViewerEvent, ViewerSlot, loader};
use crate::widget::{render_highlight_panel, render_overview_panel};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FocusedPanel {
    Viewer,
    FollowUp,
    OpenFile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppAction {
    Quit,
}

pub struct App {
    viewer: ViewerSlot,
    overview: OverviewSession,
    highlight: HighlightSession,
    rag: RagService,
    pub focused_panel: FocusedPanel,
    follow_up_input: LineInput,
    open_file_input: LineInput,
    pub notifications: NotificationManager,
    /// File requested before the viewer was ready
    pending_open: Option<PathBuf>,
    side_scroll: u16,
    theme: ThemeId,
}

impl App {
    /// The viewer stays pending until [`App::resolve_viewer`] runs.
    pub fn new(backend: Arc<dyn RagBackend>) -> Self {
        Self::with_slot(backend, ViewerSlot::Pending)
    }

    pub fn with_viewer(backend: Arc<dyn RagBackend>, viewer: DocumentViewer) -> Self {
        Self::with_slot(backend, ViewerSlot::ready(viewer))
    }

    fn with_slot(backend: Arc<dyn RagBackend>, viewer: ViewerSlot) -> Self {
        Self {
            viewer,
            overview: OverviewSession::new(),
            highlight: HighlightSession::new(),
            rag: RagService::new(backend),
            focused_panel: FocusedPanel::Viewer,
            follow_up_input: LineInput::new(),
            open_file_input: LineInput::new(),
            notifications: NotificationManager::new(),
            pending_open: None,
            side_scroll: 0,
            theme: ThemeId::OceanicNext,
        }
    }

    pub fn set_theme(&mut self, theme: ThemeId) {
        self.theme = theme;
    }

    fn palette(&self) -> &'static Base16Palette {
        self.theme.palette()
    }

    pub fn overview(&self) -> &OverviewSession {
        &self.overview
    }

    pub fn highlight(&self) -> &HighlightSession {
        &self.highlight
    }

    pub fn viewer(&self) -> Option<&DocumentViewer> {
        self.viewer.viewer()
    }

    /// Scroll of the side panel, clamped to its content on each draw
    pub fn side_scroll(&self) -> u16 {
        self.side_scroll
    }

    pub fn viewer_pending(&self) -> bool {
        self.viewer.is_pending()
    }

    /// Build the viewer for this platform and open anything queued meanwhile
    pub fn resolve_viewer(&mut self, capability: &ViewerCapability) {
        self.viewer.resolve(capability);
        if let Some(path) = self.pending_open.take() {
            self.open_document(&path);
        }
    }

    /// Open a PDF, as if picked in the file prompt.
    pub fn open_document(&mut self, path: &Path) {
        if path.as_os_str().is_empty() {
            return;
        }
        let Some(viewer) = self.viewer.viewer_mut() else {
            debug!("Viewer not ready, queueing {path:?}");
            self.pending_open = Some(path.to_path_buf());
            return;
        };

        match viewer.open_file(path) {
            Ok(events) => {
                let page_count = viewer.page_count();
                self.apply_viewer_events(events);
                match page_count {
                    Some(1) => self.notifications.info("Loaded 1 page"),
                    Some(pages) => self.notifications.info(format!("Loaded {pages} pages")),
                    None => self.notifications.warn("Could not read this PDF"),
                }
            }
            Err(e) => {
                warn!("Cannot open {path:?}: {e}");
                self.notifications.error(e.to_string());
            }
        }
    }

    fn apply_viewer_events(&mut self, events: Vec<ViewerEvent>) {
        for event in events {
            match event {
                ViewerEvent::FileLoaded(file_name) => self.on_file_loaded(&file_name),
                ViewerEvent::SelectionMade(text) => self.on_selection_made(&text),
                ViewerEvent::SelectionCleared => self.on_selection_cleared(),
            }
        }
    }

    fn on_file_loaded(&mut self, file_name: &str) {
        self.highlight.clear();
        self.follow_up_input.clear();
        self.side_scroll = 0;
        if self.focused_panel == FocusedPanel::FollowUp {
            self.focused_panel = FocusedPanel::Viewer;
        }

        let id = self.rag.next_id();
        let request = self.overview.begin(file_name, id);
        self.rag.send(id, Endpoint::Overview, request);
    }

    fn on_selection_made(&mut self, text: &str) {
        let id = self.rag.next_id();
        if let Some(request) = self.highlight.select(text, id) {
            info!("Asking about selection of {} chars", text.chars().count());
            self.side_scroll = 0;
            self.rag.send(id, Endpoint::Highlight, request);
        }
    }

    fn on_selection_cleared(&mut self) {
        self.highlight.clear();
        self.follow_up_input.clear();
        self.side_scroll = 0;
        if self.focused_panel == FocusedPanel::FollowUp {
            self.focused_panel = FocusedPanel::Viewer;
        }
    }

    /// Send a follow-up question about the current selection.
    /// Blank questions, or questions with nothing selected, are ignored.
    pub fn submit_follow_up(&mut self, question: &str) {
        let id = self.rag.next_id();
        if let Some(request) = self.highlight.follow_up(question, id) {
            self.rag.send(id, Endpoint::Highlight, request);
        }
    }

    /// Apply settled backend replies. Returns true if anything changed.
    pub fn poll_backend(&mut self) -> bool {
        let replies = self.rag.poll_replies();
        let mut changed = false;
        for RagReply {
            id,
            endpoint,
            result,
        } in replies
        {
            changed |= match endpoint {
                Endpoint::Overview => self.overview.resolve(id, result),
                Endpoint::Highlight => self.highlight.resolve(id, result),
            };
        }
        changed
    }

    pub fn handle_event(&mut self, event: &Event) -> Option<AppAction> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => self.handle_key(*key),
            Event::Mouse(mouse) => {
                if matches!(
                    mouse.kind,
                    MouseEventKind::ScrollLeft | MouseEventKind::ScrollRight
                ) {
                    return None;
                }
                if let Some(viewer) = self.viewer.viewer_mut() {
                    let events = viewer.handle_mouse(*mouse);
                    self.apply_viewer_events(events);
                }
                None
            }
            _ => None,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(AppAction::Quit);
        }

        match self.focused_panel {
            FocusedPanel::OpenFile => {
                match self.open_file_input.handle_key(key) {
                    InputOutcome::Submitted(path) => {
                        self.focused_panel = FocusedPanel::Viewer;
                        let path = path.trim();
                        if !path.is_empty() {
                            self.open_document(&expand_home(path));
                        }
                    }
                    InputOutcome::Cancelled => {
                        self.open_file_input.clear();
                        self.focused_panel = FocusedPanel::Viewer;
                    }
                    InputOutcome::Edited | InputOutcome::Ignored => {}
                }
                None
            }
            FocusedPanel::FollowUp => {
                match self.follow_up_input.handle_key(key) {
                    InputOutcome::Submitted(question) => self.submit_follow_up(&question),
                    InputOutcome::Cancelled => self.focused_panel = FocusedPanel::Viewer,
                    InputOutcome::Edited | InputOutcome::Ignored => {}
                }
                None
            }
            FocusedPanel::Viewer => self.handle_viewer_key(key),
        }
    }

    fn handle_viewer_key(&mut self, key: KeyEvent) -> Option<AppAction> {
        match key.code {
            KeyCode::Char('q') => return Some(AppAction::Quit),
            KeyCode::Char('o') => {
                self.open_file_input.clear();
                self.focused_panel = FocusedPanel::OpenFile;
            }
            KeyCode::Char('i') | KeyCode::Tab if self.highlight.selected().is_some() => {
                self.focused_panel = FocusedPanel::FollowUp;
            }
            KeyCode::Char('J') => self.side_scroll = self.side_scroll.saturating_add(1),
            KeyCode::Char('K') => self.side_scroll = self.side_scroll.saturating_sub(1),
            _ => {
                if let Some(viewer) = self.viewer.viewer_mut() {
                    viewer.handle_key(key);
                }
            }
        }
        None
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let palette = self.palette();
        let [main_area, status_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());
        let [viewer_area, side_area] =
            Layout::horizontal([Constraint::Percentage(58), Constraint::Percentage(42)])
                .areas(main_area);

        self.viewer.render(
            frame,
            viewer_area,
            palette,
            self.focused_panel == FocusedPanel::Viewer,
        );

        self.side_scroll = if self.highlight.selected().is_some() {
            render_highlight_panel(
                frame,
                side_area,
                &self.highlight,
                &self.follow_up_input,
                self.focused_panel == FocusedPanel::FollowUp,
                palette,
                self.side_scroll,
            )
        } else {
            render_overview_panel(frame, side_area, &self.overview, palette, self.side_scroll)
        };

        self.draw_status_line(frame, status_area, palette);
    }

    fn draw_status_line(&self, frame: &mut Frame, area: Rect, palette: &Base16Palette) {
        if self.focused_panel == FocusedPanel::OpenFile {
            let prompt = "Open PDF: ";
            let line = Line::from(vec![
                Span::styled(
                    prompt,
                    Style::default()
                        .fg(palette.base_0d)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    self.open_file_input.value().to_string(),
                    Style::default().fg(palette.base_05),
                ),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            let x = area.x + prompt.len() as u16 + self.open_file_input.cursor() as u16;
            frame.set_cursor_position(Position::new(x.min(area.right().saturating_sub(1)), area.y));
            return;
        }

        if let Some(notification) = self.notifications.current() {
            frame.render_widget(Paragraph::new(notification.styled_line(palette)), area);
            return;
        }

        let hints = match self.focused_panel {
            FocusedPanel::FollowUp => "Enter send · Esc back to document",
            _ if self.highlight.selected().is_some() => {
                "drag to select · click blank space to clear · i ask follow-up · J/K scroll answer · o open · q quit"
            }
            _ => "o open PDF · drag to select text · j/k scroll · J/K scroll overview · q quit",
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hints, Style::default().fg(palette.base_03))),
            area,
        );
    }
}

fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

pub fn run_app_with_event_source<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_source: &mut dyn EventSource,
) -> Result<()>
where
    B::Error: Send + Sync + 'static,
{
    let tick_rate = Duration::from_millis(50);
    let mut last_tick = std::time::Instant::now();
    let mut first_render = true; // Ensure we always render at least once on startup
    loop {
        let mut events_processed = 0;
        let mut should_quit = false;
        while event_source.poll(Duration::from_millis(0))? && events_processed < 50 {
            let event = event_source.read()?;
            events_processed += 1;

            if app.handle_event(&event) == Some(AppAction::Quit) {
                should_quit = true;
                break;
            }
        }

        if should_quit {
            return Ok(());
        }

        let mut needs_redraw = events_processed > 0;

        if first_render {
            terminal.draw(|f| app.draw(f))?;
            first_render = false;
            // the placeholder is on screen; now probe and build the real viewer
            if app.viewer_pending() {
                app.resolve_viewer(&loader::probe());
            }
            needs_redraw = true;
        }

        if last_tick.elapsed() >= tick_rate {
            if app.notifications.update() {
                needs_redraw = true;
            }
            last_tick = std::time::Instant::now();
        }

        if app.poll_backend() {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| app.draw(f))?;
        }

        // If no events were processed, wait a bit to avoid busy-waiting
        if events_processed == 0 {
            let timeout = tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_secs(0));
            let _ = event_source.poll(timeout);
        }
    }
}
