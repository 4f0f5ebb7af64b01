pub mod highlight_panel;
pub mod overview_panel;

pub use highlight_panel::{conversation_lines, render_highlight_panel};
pub use overview_panel::{render_overview_panel, sources_footer};

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Paragraph, Wrap},
};

/// Largest useful scroll for `lines` wrapped into `inner`
pub fn clamp_scroll(lines: &[Line<'_>], inner: Rect, scroll: u16) -> u16 {
    let rows = Paragraph::new(lines.to_vec())
        .wrap(Wrap { trim: false })
        .line_count(inner.width);
    let max = rows.saturating_sub(inner.height as usize);
    scroll.min(u16::try_from(max).unwrap_or(u16::MAX))
}
