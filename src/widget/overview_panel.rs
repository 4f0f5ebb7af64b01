use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::clamp_scroll;
use crate::markdown_renderer::MarkdownRenderer;
use crate::session::{OverviewPhase, OverviewSession};
use crate::theme::Base16Palette;

/// Read-only pane showing the document overview. Returns the scroll
/// offset actually used.
pub fn render_overview_panel(
    frame: &mut Frame,
    area: Rect,
    session: &OverviewSession,
    palette: &Base16Palette,
    scroll: u16,
) -> u16 {
    let title = match session.file_name() {
        Some(name) => format!(" Overview · {name} "),
        None => " Overview ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.base_03))
        .title(title);

    let muted = Style::default().fg(palette.base_03);
    let lines: Vec<Line> = match session.phase() {
        OverviewPhase::NoDocument => vec![
            Line::from(Span::styled("Open a PDF to get an overview.", muted)),
            Line::default(),
            Line::from(Span::styled(
                "Select text in the document to ask about a specific passage.",
                muted,
            )),
        ],
        OverviewPhase::Loading => vec![Line::from(Span::styled(
            format!(
                "Generating overview for {}…",
                session.file_name().unwrap_or("document")
            ),
            Style::default()
                .fg(palette.base_0a)
                .add_modifier(Modifier::ITALIC),
        ))],
        OverviewPhase::Ready(text) => {
            let mut lines = MarkdownRenderer::new(palette).render(text);
            if let Some(footer) = sources_footer(session.source_pages(), palette) {
                lines.push(Line::default());
                lines.push(footer);
            }
            lines
        }
        OverviewPhase::Failed(message) => vec![Line::from(Span::styled(
            message.clone(),
            Style::default().fg(palette.base_08),
        ))],
    };

    let scroll = clamp_scroll(&lines, block.inner(area), scroll);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
    scroll
}

/// "Sources: p. 2, 4" line for cited pages
pub fn sources_footer(pages: &[u32], palette: &Base16Palette) -> Option<Line<'static>> {
    if pages.is_empty() {
        return None;
    }
    let list = pages
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Some(Line::from(Span::styled(
        format!("Sources: p. {list}"),
        Style::default()
            .fg(palette.base_03)
            .add_modifier(Modifier::ITALIC),
    )))
}
