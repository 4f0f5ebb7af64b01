use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use crate::theme::Base16Palette;

/// Renders backend markdown answers into styled terminal lines.
///
/// Supports the subset answers actually use: headings, paragraphs, emphasis,
/// strong, strikethrough, inline code, code blocks, ordered/unordered lists
/// and rules. Anything else is rendered as plain text. Wrapping is left to
/// the widget that displays the lines.
pub struct MarkdownRenderer<'a> {
    palette: &'a Base16Palette,
    base: Style,
}

struct RenderState {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<Option<u64>>,
    in_code_block: bool,
}

impl RenderState {
    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| !l.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let style = self.style().patch(patch);
        self.styles.push(style);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }
}

impl<'a> MarkdownRenderer<'a> {
    pub fn new(palette: &'a Base16Palette) -> Self {
        Self {
            palette,
            base: Style::default().fg(palette.base_05),
        }
    }

    pub fn render(&self, markdown: &str) -> Vec<Line<'static>> {
        let mut state = RenderState {
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![self.base],
            lists: Vec::new(),
            in_code_block: false,
        };

        let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
        for event in parser {
            match event {
                Event::Start(tag) => self.start_tag(tag, &mut state),
                Event::End(tag) => self.end_tag(tag, &mut state),
                Event::Text(text) => {
                    if state.in_code_block {
                        let style = state.style();
                        for line in text.lines() {
                            state
                                .lines
                                .push(Line::from(Span::styled(format!("  {line}"), style)));
                        }
                    } else {
                        let style = state.style();
                        state.current.push(Span::styled(text.into_string(), style));
                    }
                }
                Event::Code(code) => {
                    let style = state
                        .style()
                        .fg(self.palette.base_0c)
                        .bg(self.palette.base_01);
                    state.current.push(Span::styled(code.into_string(), style));
                }
                Event::SoftBreak => {
                    let style = state.style();
                    state.current.push(Span::styled(" ", style));
                }
                Event::HardBreak => state.flush(),
                Event::Rule => {
                    state.flush();
                    state.lines.push(Line::from(Span::styled(
                        "─".repeat(24),
                        Style::default().fg(self.palette.base_03),
                    )));
                }
                _ => {}
            }
        }

        state.flush();
        while state.lines.last().is_some_and(|l| l.spans.is_empty()) {
            state.lines.pop();
        }
        state.lines
    }

    fn start_tag(&self, tag: Tag, state: &mut RenderState) {
        match tag {
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                state.flush();
                state.blank_line();
                let color = match level {
                    HeadingLevel::H1 | HeadingLevel::H2 => self.palette.base_0d,
                    _ => self.palette.base_0e,
                };
                state.push_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
            }
            Tag::CodeBlock(_) => {
                state.flush();
                state.in_code_block = true;
                state.push_style(Style::default().fg(self.palette.base_0c));
            }
            Tag::List(start) => {
                state.flush();
                state.lists.push(start);
            }
            Tag::Item => {
                state.flush();
                let depth = state.lists.len().saturating_sub(1);
                let marker = match state.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                state.current.push(Span::styled(
                    format!("{}{marker}", "  ".repeat(depth)),
                    Style::default().fg(self.palette.base_09),
                ));
            }
            Tag::Emphasis => state.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => state.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                state.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            _ => {}
        }
    }

    fn end_tag(&self, tag: TagEnd, state: &mut RenderState) {
        match tag {
            TagEnd::Paragraph => {
                state.flush();
                if state.lists.is_empty() {
                    state.lines.push(Line::default());
                }
            }
            TagEnd::Heading(_) => {
                state.flush();
                state.pop_style();
            }
            TagEnd::CodeBlock => {
                state.in_code_block = false;
                state.pop_style();
                state.lines.push(Line::default());
            }
            TagEnd::List(_) => {
                state.flush();
                state.lists.pop();
                if state.lists.is_empty() {
                    state.lines.push(Line::default());
                }
            }
            TagEnd::Item => state.flush(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => state.pop_style(),
            _ => {}
        }
    }
}

/// Plain text of rendered lines, for tests and logging
pub fn lines_to_string(lines: &[Line]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeId;

    fn render(markdown: &str) -> Vec<Line<'static>> {
        MarkdownRenderer::new(ThemeId::OceanicNext.palette()).render(markdown)
    }

    #[test]
    fn test_plain_paragraphs() {
        let lines = render("This is a Summary of Benefits.\n\nSecond paragraph.");
        assert_eq!(
            lines_to_string(&lines),
            "This is a Summary of Benefits.\n\nSecond paragraph."
        );
    }

    #[test]
    fn test_strong_text_is_bold() {
        let lines = render("You pay **20%** after the deductible.");
        let bold = lines[0]
            .spans
            .iter()
            .find(|span| span.content == "20%")
            .unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));

        let plain = lines[0]
            .spans
            .iter()
            .find(|span| span.content.starts_with("You pay"))
            .unwrap();
        assert!(!plain.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_heading_and_lists() {
        let lines = render("## Costs\n\n- Deductible: $1,500\n- Copay: $30\n\n1. First\n2. Second\n");
        let text = lines_to_string(&lines);
        assert!(text.starts_with("Costs\n"));
        assert!(text.contains("• Deductible: $1,500\n• Copay: $30"));
        assert!(text.contains("1. First\n2. Second"));
        assert!(lines[0].spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_code_block_lines_are_indented() {
        let lines = render("```\nline one\nline two\n```");
        assert_eq!(lines_to_string(&lines), "  line one\n  line two");
    }

    #[test]
    fn test_empty_input() {
        assert!(render("").is_empty());
    }
}
