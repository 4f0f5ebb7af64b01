//! Deferred viewer construction.
//!
//! The viewer is only built once the platform has been probed; until then the
//! document pane shows a neutral placeholder.

use log::{info, warn};
use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
};

use super::DocumentViewer;
#[cfg(feature = "pdf")]
use super::extract::MupdfExtractor;
use super::extract::{PdfTextExtractor, UnavailableExtractor};
use crate::theme::Base16Palette;

/// What the running platform can do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewerCapability {
    /// A PDF engine was compiled in
    pub pdf_engine: bool,
    /// Terminal size, if stdout is a terminal
    pub screen: Option<(u16, u16)>,
}

/// Inspect the platform once at startup
pub fn probe() -> ViewerCapability {
    let capability = ViewerCapability {
        pdf_engine: cfg!(feature = "pdf"),
        screen: crossterm::terminal::size().ok(),
    };
    info!("Viewer capability: {capability:?}");
    capability
}

fn extractor_for(capability: &ViewerCapability) -> Box<dyn PdfTextExtractor> {
    #[cfg(feature = "pdf")]
    if capability.pdf_engine {
        return Box::new(MupdfExtractor);
    }

    warn!("No PDF engine available ({capability:?}); documents will open empty");
    Box::new(UnavailableExtractor)
}

pub enum ViewerSlot {
    Pending,
    Ready(DocumentViewer),
}

impl ViewerSlot {
    pub fn ready(viewer: DocumentViewer) -> Self {
        ViewerSlot::Ready(viewer)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ViewerSlot::Pending)
    }

    /// Build the viewer for this platform. No-op once ready.
    pub fn resolve(&mut self, capability: &ViewerCapability) {
        if self.is_pending() {
            *self = ViewerSlot::Ready(DocumentViewer::new(extractor_for(capability)));
        }
    }

    pub fn viewer(&self) -> Option<&DocumentViewer> {
        match self {
            ViewerSlot::Ready(viewer) => Some(viewer),
            ViewerSlot::Pending => None,
        }
    }

    pub fn viewer_mut(&mut self) -> Option<&mut DocumentViewer> {
        match self {
            ViewerSlot::Ready(viewer) => Some(viewer),
            ViewerSlot::Pending => None,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, palette: &Base16Palette, focused: bool) {
        match self {
            ViewerSlot::Ready(viewer) => viewer.render(frame, area, palette, focused),
            ViewerSlot::Pending => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(palette.base_03))
                    .title(" Document ");
                let placeholder = Paragraph::new("Loading viewer…")
                    .style(Style::default().fg(palette.base_03))
                    .block(block);
                frame.render_widget(placeholder, area);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_builds_viewer_once() {
        let mut slot = ViewerSlot::Pending;
        assert!(slot.viewer().is_none());

        let capability = ViewerCapability {
            pdf_engine: false,
            screen: None,
        };
        slot.resolve(&capability);
        assert!(!slot.is_pending());
        assert!(slot.viewer().is_some());

        slot.resolve(&capability);
        assert!(slot.viewer().is_some());
    }
}
