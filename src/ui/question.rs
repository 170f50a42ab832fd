use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::model::{Question, QuestionKind};
use crate::state::{AppState, InputMode};
use crate::ui::markdown::markdown_to_lines;

/// Content lines that start each choice, for mouse handling.
pub struct QuestionHitMap {
    /// (first_content_line, choice_index) for each choice.
    pub choice_lines: Vec<(usize, usize)>,
    pub end_line: usize,
}

impl QuestionHitMap {
    pub fn choice_at(&self, content_line: usize) -> Option<usize> {
        self.choice_lines
            .iter()
            .enumerate()
            .find_map(|(i, &(start, idx))| {
                let end = self
                    .choice_lines
                    .get(i + 1)
                    .map_or(self.end_line, |next| next.0);
                (content_line >= start && content_line < end).then_some(idx)
            })
    }
}

/// Mirrors `build_lines` so clicks land on the choice that is drawn there.
pub fn compute_hit_map(state: &AppState, area: Rect) -> Option<QuestionHitMap> {
    let question = state.current_question()?;
    let mut line_count = HEADER_LINES + prompt_lines(question, area.width).len();

    let mut choice_lines = Vec::new();
    if question.is_choice() {
        line_count += 1;
        for (i, choice) in question.choices().iter().enumerate() {
            choice_lines.push((line_count, i));
            let text_width = (area.width as usize).saturating_sub(CHOICE_PREFIX_LEN);
            line_count += wrap_text(&choice.text, text_width).len();
        }
    }

    Some(QuestionHitMap {
        choice_lines,
        end_line: line_count,
    })
}

const CHOICE_PREFIX_LEN: usize = 9; // "  (●) A. "
const HEADER_LINES: usize = 2;

fn prompt_lines(question: &Question, width: u16) -> Vec<Line<'static>> {
    let wrap_width = (width as usize).saturating_sub(4);
    markdown_to_lines(&question.prompt)
        .into_iter()
        .flat_map(|line| wrap_styled_line(line, wrap_width))
        .map(|wline| {
            Line::from(
                std::iter::once(Span::raw("  "))
                    .chain(wline.spans)
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}

/// Wrap a styled Line at `width`, preserving span styles across breaks.
fn wrap_styled_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line];
    }

    let mut chars: Vec<(char, Style)> = Vec::new();
    for span in &line.spans {
        for c in span.content.chars() {
            chars.push((c, span.style));
        }
    }
    if chars.len() <= width {
        return vec![line];
    }

    let mut result: Vec<Line<'static>> = Vec::new();
    let mut pos = 0;

    while pos < chars.len() {
        if chars.len() - pos <= width {
            result.push(styled_chars_to_line(&chars[pos..]));
            break;
        }

        let chunk_end = pos + width;
        let break_at = if chars[chunk_end].0 == ' ' {
            chunk_end
        } else {
            match chars[pos..chunk_end].iter().rposition(|(c, _)| *c == ' ') {
                Some(sp) if sp > 0 => pos + sp,
                _ => chunk_end,
            }
        };

        result.push(styled_chars_to_line(&chars[pos..break_at]));
        pos = break_at;
        if pos < chars.len() && chars[pos].0 == ' ' {
            pos += 1;
        }
    }

    result
}

/// Rebuild a Line from (char, style) pairs, grouping consecutive same-style chars into spans.
fn styled_chars_to_line(chars: &[(char, Style)]) -> Line<'static> {
    let Some(&(_, first)) = chars.first() else {
        return Line::from("");
    };

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut current_text = String::new();
    let mut current_style = first;

    for &(c, style) in chars {
        if style != current_style && !current_text.is_empty() {
            spans.push(Span::styled(std::mem::take(&mut current_text), current_style));
        }
        current_style = style;
        current_text.push(c);
    }
    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, current_style));
    }

    Line::from(spans)
}

/// Wrap text to fit within `width` columns, breaking at word boundaries.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let mut result = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            result.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        result.push(current);
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

fn build_lines(state: &AppState, question: &Question, area: Rect) -> Vec<Line<'static>> {
    let Some(attempt) = &state.attempt else {
        return Vec::new();
    };
    let number = attempt.navigator.current() + 1;
    let mut lines: Vec<Line<'static>> = Vec::new();

    let points = if question.points == 1.0 {
        "1 point".to_string()
    } else {
        format!("{} points", question.points)
    };
    lines.push(Line::from(vec![
        Span::styled(
            format!("  Question {} of {}", number, attempt.quiz.questions.len()),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("   {} · {}", question.kind.label(), points),
            Style::default().fg(Color::DarkGray),
        ),
    ]));
    lines.push(Line::from(""));
    lines.extend(prompt_lines(question, area.width));

    match &question.kind {
        QuestionKind::SingleChoice(choices) | QuestionKind::TrueFalse(choices) => {
            lines.push(Line::from(""));
            let selected = attempt.buffer.selected_option(question.id);
            for (i, choice) in choices.iter().enumerate() {
                let is_selected = selected == Some(choice.id);
                let letter = (b'A' + (i % 26) as u8) as char;
                let radio = if is_selected { "(●)" } else { "( )" };
                let style = if is_selected {
                    Style::default().fg(Color::Green)
                } else if i == state.choice_cursor {
                    Style::default().add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };

                let prefix = format!("  {} {}. ", radio, letter);
                let text_width = (area.width as usize).saturating_sub(CHOICE_PREFIX_LEN);
                for (li, wline) in wrap_text(&choice.text, text_width).into_iter().enumerate() {
                    let lead = if li == 0 {
                        prefix.clone()
                    } else {
                        " ".repeat(CHOICE_PREFIX_LEN)
                    };
                    lines.push(Line::from(vec![
                        Span::styled(lead, style),
                        Span::styled(wline, style),
                    ]));
                }
            }
        }
        QuestionKind::ShortAnswer => {
            lines.push(Line::from(""));
            let editing = state.input_mode == InputMode::TextInput;
            let dashes = area.width.saturating_sub(6) as usize;
            let inner = area.width.saturating_sub(8) as usize;
            let border = if editing {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };

            lines.push(Line::from(Span::styled(
                format!("  ┌{}┐", "─".repeat(dashes)),
                border,
            )));

            // Keep the cursor inside the visible window of the box.
            let chars: Vec<char> = state.text_input.chars().collect();
            let start = state.text_cursor.saturating_sub(inner.saturating_sub(1));
            let mut content = Vec::new();
            for (i, c) in chars.iter().enumerate().skip(start).take(inner) {
                let style = if editing && i == state.text_cursor {
                    Style::default().add_modifier(Modifier::REVERSED)
                } else {
                    Style::default()
                };
                content.push(Span::styled(c.to_string(), style));
            }
            let mut used = chars.len().saturating_sub(start).min(inner);
            if editing && state.text_cursor >= chars.len() && used < inner {
                content.push(Span::styled(
                    " ",
                    Style::default().add_modifier(Modifier::REVERSED),
                ));
                used += 1;
            }

            let mut row = vec![Span::styled("  │ ", border)];
            row.extend(content);
            row.push(Span::raw(" ".repeat(inner.saturating_sub(used))));
            row.push(Span::styled(" │", border));
            lines.push(Line::from(row));

            lines.push(Line::from(Span::styled(
                format!("  └{}┘", "─".repeat(dashes)),
                border,
            )));
            if !editing {
                lines.push(Line::from(Span::styled(
                    "  [Enter] edit answer",
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }

    lines
}

pub fn draw_question(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(question) = state.current_question() else {
        let p = Paragraph::new("This assessment has no questions.")
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
        return;
    };

    let lines = build_lines(state, question, area);

    let total_content_lines = lines.len();
    let visible_height = area.height as usize;
    let scroll = state
        .question_scroll
        .min(total_content_lines.saturating_sub(visible_height));
    let display_lines: Vec<Line> = lines.into_iter().skip(scroll).collect();

    f.render_widget(Paragraph::new(display_lines), area);

    if total_content_lines > visible_height {
        let mut scrollbar_state = ScrollbarState::new(total_content_lines)
            .position(scroll)
            .viewport_content_length(visible_height);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_breaks_on_words() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick".to_string(), "brown fox".to_string()]
        );
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn test_wrap_styled_line_keeps_styles() {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let line = Line::from(vec![Span::raw("plain words "), Span::styled("bold words", bold)]);
        let wrapped = wrap_styled_line(line, 12);
        assert_eq!(wrapped.len(), 2);
        assert_eq!(wrapped[1].spans[0].style, bold);
    }

    #[test]
    fn test_hit_map_choice_ranges() {
        let map = QuestionHitMap {
            choice_lines: vec![(4, 0), (5, 1), (7, 2)],
            end_line: 8,
        };
        assert_eq!(map.choice_at(3), None);
        assert_eq!(map.choice_at(5), Some(1));
        assert_eq!(map.choice_at(6), Some(1));
        assert_eq!(map.choice_at(7), Some(2));
        assert_eq!(map.choice_at(8), None);
    }
}
