use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;

use crate::navigator::Indicator;
use crate::state::AppState;

/// First visible row so that `current` stays on screen.
pub fn scroll_offset(current: usize, visible: usize) -> usize {
    if visible == 0 {
        return current;
    }
    current.saturating_sub(visible - 1)
}

pub fn draw_sidebar(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(attempt) = &state.attempt else {
        return;
    };
    let quiz = &attempt.quiz;
    let nav = &attempt.navigator;

    let visible = area.height.saturating_sub(1) as usize; // title row
    let offset = scroll_offset(nav.current(), visible);
    let mut lines: Vec<Line> = Vec::new();

    for (idx, q) in quiz.questions.iter().enumerate().skip(offset).take(visible) {
        let indicator = nav.indicator(idx, quiz, &attempt.buffer);
        let answered = attempt.buffer.is_answered(q.id);
        let (icon, color) = match (indicator, answered) {
            (Indicator::Current, true) => ("●", Color::Green),
            (Indicator::Current, false) => ("○", Color::White),
            (Indicator::Answered, _) => ("●", Color::Green),
            (Indicator::Unanswered, _) => ("○", Color::DarkGray),
        };

        let is_current = indicator == Indicator::Current;
        let style = if is_current {
            Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        lines.push(Line::from(vec![
            Span::styled(if is_current { " ▸ " } else { "   " }, style),
            Span::styled(format!("{} ", icon), style.fg(color)),
            Span::styled(format!("Question {:>2}", idx + 1), style),
        ]));
    }

    let title = format!(
        " {}/{} answered ",
        attempt.buffer.completed_count(),
        quiz.questions.len()
    );
    let block = Block::default()
        .borders(Borders::RIGHT)
        .title(title)
        .title_style(Style::default().add_modifier(Modifier::BOLD));

    f.render_widget(Paragraph::new(lines).block(block), area);

    if quiz.questions.len() > visible {
        let scrollbar_area = Rect {
            x: area.x,
            y: area.y + 1,
            width: area.width,
            height: visible as u16,
        };
        let mut scrollbar_state = ScrollbarState::new(quiz.questions.len().saturating_sub(1))
            .position(nav.current())
            .viewport_content_length(3);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}
