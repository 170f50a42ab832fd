use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::{AppState, Screen};
use crate::timer::format_duration;

fn title_for(state: &AppState) -> String {
    if let Some(attempt) = &state.attempt {
        return attempt.quiz.title.clone();
    }
    match (&state.screen, &state.preview) {
        (Screen::Preamble, Some(quiz)) => quiz.title.clone(),
        (Screen::Results, _) => "My Results".to_string(),
        _ => "Assessments".to_string(),
    }
}

pub fn draw_titlebar(f: &mut Frame, area: Rect, state: &AppState) {
    let remaining = state.attempt.as_ref().and_then(|a| a.remaining_seconds);

    let timer_text = if let Some(secs) = remaining {
        let formatted = format!(" {} remaining ", format_duration(secs));
        let urgent = state.warn_at.is_some_and(|w| secs <= w);
        if urgent {
            Span::styled(
                formatted,
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(formatted, Style::default().fg(Color::Rgb(200, 200, 120)))
        }
    } else if let Some(name) = &state.learner {
        Span::styled(format!(" {} ", name), Style::default().fg(Color::Gray))
    } else {
        Span::raw("")
    };

    let title_text = format!("[ {} ]", title_for(state));
    let title_span = Span::styled(
        title_text.clone(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    // Title centered on the full width, timer pushed to the right edge.
    let available = area.width as usize;
    let timer_len = timer_text.content.chars().count();
    let title_len = title_text.chars().count();
    let center_pad = available.saturating_sub(title_len) / 2;
    let right_pad = available.saturating_sub(center_pad + title_len + timer_len);

    let line = Line::from(vec![
        Span::raw(" ".repeat(center_pad)),
        title_span,
        Span::raw(" ".repeat(right_pad)),
        timer_text,
    ]);

    let widget = Paragraph::new(line)
        .style(Style::default().bg(Color::DarkGray))
        .alignment(Alignment::Left);
    f.render_widget(widget, area);
}
