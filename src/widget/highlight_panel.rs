use ratatui::{
    Frame,
    layout::{Constraint, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::clamp_scroll;
use super::overview_panel::sources_footer;
use crate::inputs::LineInput;
use crate::markdown_renderer::MarkdownRenderer;
use crate::session::{HighlightSession, Role};
use crate::theme::Base16Palette;

/// Conversation about the selected passage plus the follow-up form.
/// Returns the conversation scroll offset actually used.
pub fn render_highlight_panel(
    frame: &mut Frame,
    area: Rect,
    session: &HighlightSession,
    input: &LineInput,
    input_focused: bool,
    palette: &Base16Palette,
    scroll: u16,
) -> u16 {
    let [conversation_area, input_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(3)]).areas(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.base_03))
        .title(" Ask about this passage ");

    let lines = conversation_lines(session, palette);
    let scroll = clamp_scroll(&lines, block.inner(conversation_area), scroll);
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, conversation_area);

    render_follow_up_input(frame, input_area, input, input_focused, palette);
    scroll
}

pub fn conversation_lines(session: &HighlightSession, palette: &Base16Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Selected text:",
        Style::default()
            .fg(palette.base_0d)
            .add_modifier(Modifier::BOLD),
    ))];
    if let Some(selected) = session.selected() {
        for text in selected.lines() {
            lines.push(Line::from(Span::styled(
                format!("│ {text}"),
                Style::default()
                    .fg(palette.base_04)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
    }

    let renderer = MarkdownRenderer::new(palette);
    for message in session.messages() {
        lines.push(Line::default());
        match message.role {
            Role::User => {
                lines.push(Line::from(Span::styled(
                    "You",
                    Style::default()
                        .fg(palette.base_0b)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(Span::styled(
                    message.content.clone(),
                    Style::default().fg(palette.base_05),
                )));
            }
            Role::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Assistant",
                    Style::default()
                        .fg(palette.base_0e)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.extend(renderer.render(&message.content));
                if let Some(footer) = sources_footer(&message.sources, palette) {
                    lines.push(footer);
                }
            }
        }
    }

    if session.is_waiting() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Thinking…",
            Style::default()
                .fg(palette.base_0a)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_follow_up_input(
    frame: &mut Frame,
    area: Rect,
    input: &LineInput,
    focused: bool,
    palette: &Base16Palette,
) {
    let border = if focused {
        palette.base_0d
    } else {
        palette.base_03
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(" Follow-up (i) ");
    let inner = block.inner(area);

    let content = if input.value().is_empty() && !focused {
        Span::styled("Ask a question about the selection…", Style::default().fg(palette.base_03))
    } else {
        Span::styled(input.value().to_string(), Style::default().fg(palette.base_05))
    };
    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);

    if focused && inner.width > 0 {
        let x = inner.x + (input.cursor() as u16).min(inner.width - 1);
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}
