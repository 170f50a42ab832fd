use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Accumulates spans into lines while walking the markdown events.
#[derive(Default)]
struct Renderer {
    lines: Vec<Line<'static>>,
    pending: Vec<Span<'static>>,
    styles: Vec<Style>,
    list_depth: usize,
    in_code_block: bool,
}

impl Renderer {
    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, modifier: Modifier) {
        let style = self.style().add_modifier(modifier);
        self.styles.push(style);
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.pending)));
        }
    }

    fn blank(&mut self) {
        self.flush();
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::from(""));
        }
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Paragraph) => self.flush(),
            Event::End(TagEnd::Paragraph) => {
                if self.list_depth == 0 {
                    self.blank();
                } else {
                    self.flush();
                }
            }
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush();
                let color = if level == HeadingLevel::H1 {
                    Color::Cyan
                } else {
                    Color::White
                };
                self.styles
                    .push(Style::default().fg(color).add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.styles.pop();
                self.blank();
            }
            Event::Start(Tag::Strong) => self.push_style(Modifier::BOLD),
            Event::Start(Tag::Emphasis) => self.push_style(Modifier::ITALIC),
            Event::Start(Tag::Strikethrough) => self.push_style(Modifier::CROSSED_OUT),
            Event::End(TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough) => {
                self.styles.pop();
            }
            Event::Start(Tag::List(_)) => {
                self.flush();
                self.list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => {
                self.list_depth = self.list_depth.saturating_sub(1);
                if self.list_depth == 0 {
                    self.blank();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let indent = "  ".repeat(self.list_depth);
                self.pending.push(Span::raw(format!("{}• ", indent)));
            }
            Event::End(TagEnd::Item) => self.flush(),
            Event::Start(Tag::CodeBlock(_)) => {
                self.flush();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.in_code_block = false;
                self.blank();
            }
            Event::Text(text) if self.in_code_block => {
                let code = Style::default().fg(Color::Green);
                self.lines.extend(
                    text.lines()
                        .map(|l| Line::from(Span::styled(format!("  {}", l), code))),
                );
            }
            Event::Text(text) => {
                let style = self.style();
                self.pending.push(Span::styled(text.into_string(), style));
            }
            Event::Code(code) => {
                self.pending
                    .push(Span::styled(code.into_string(), Style::default().fg(Color::Yellow)));
            }
            Event::SoftBreak => self.pending.push(Span::raw(" ")),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(40),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}

/// Renders portal markdown (descriptions, prompts) into styled lines.
pub fn markdown_to_lines(text: &str) -> Vec<Line<'static>> {
    let mut renderer = Renderer::default();
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        renderer.event(event);
    }
    renderer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_paragraph_and_list() {
        let lines = markdown_to_lines("Read **carefully**.\n\n- one\n- two");
        let text = plain(&lines);
        assert_eq!(text[0], "Read carefully.");
        assert!(text.contains(&"  • one".to_string()));
        assert!(text.contains(&"  • two".to_string()));
    }

    #[test]
    fn test_soft_break_joins_words() {
        let text = plain(&markdown_to_lines("first line\nsecond line"));
        assert_eq!(text, vec!["first line second line".to_string()]);
    }

    #[test]
    fn test_code_block_lines_are_indented() {
        let lines = markdown_to_lines("```\nlet x = 1;\nlet y = 2;\n```");
        let text = plain(&lines);
        assert_eq!(text[0], "  let x = 1;");
        assert_eq!(text[1], "  let y = 2;");
    }

    #[test]
    fn test_no_trailing_blank_lines() {
        let lines = markdown_to_lines("# Title\n\nBody.\n");
        assert_eq!(plain(&lines), vec!["Title", "", "Body."]);
    }
}
