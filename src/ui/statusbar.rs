use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::attempt::AttemptStatus;
use crate::state::{AppState, Screen};

pub fn draw_statusbar(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans = vec![Span::raw(" ")];

    if let Some(banner) = &state.banner {
        spans.push(Span::styled(
            banner.clone(),
            Style::default().fg(Color::White).bg(Color::Red),
        ));
    } else if let (Screen::Working, Some(attempt)) = (&state.screen, &state.attempt) {
        let answered = attempt.buffer.completed_count();
        spans.push(Span::styled(
            format!("● {} answered", answered),
            Style::default().fg(Color::Green),
        ));
        spans.push(Span::raw("   "));
        spans.push(Span::styled(
            format!("○ {} unanswered", attempt.unanswered_count()),
            Style::default().fg(Color::White),
        ));
        spans.push(Span::raw("   "));
        if attempt.status == AttemptStatus::Starting {
            spans.push(Span::styled(
                "starting attempt...",
                Style::default().fg(Color::Yellow),
            ));
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled("[?] help", Style::default().fg(Color::DarkGray)));
    }

    let widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Rgb(30, 30, 30)));
    f.render_widget(widget, area);
}
