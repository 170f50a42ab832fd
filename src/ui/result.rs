use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::{AppState, Recovery};
use crate::submit::{SubmitState, SubmitTrigger};

fn centered_panel(f: &mut Frame, area: Rect, lines: Vec<Line>) {
    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}

pub fn draw_loading(f: &mut Frame, area: Rect, what: &str) {
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}...", what),
            Style::default().fg(Color::Yellow),
        )),
    ];
    centered_panel(f, area, lines);
}

pub fn draw_submitting(f: &mut Frame, area: Rect, state: &AppState) {
    let answered = state
        .attempt
        .as_ref()
        .map_or(0, |a| a.buffer.completed_count());
    let timed_out = state.attempt.as_ref().is_some_and(|a| {
        matches!(
            a.coordinator.state(),
            SubmitState::InFlight(SubmitTrigger::Timeout)
        )
    });

    let mut lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "Submitting...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    if timed_out {
        lines.push(Line::from("Time is up."));
    }
    lines.push(Line::from(format!("Sending {} answers to the portal.", answered)));
    centered_panel(f, area, lines);
}

pub fn draw_page_error(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(err) = &state.page_error else {
        return;
    };

    let action = match err.recovery {
        Recovery::BackToList => "[Esc] Back to assessments    [q] Quit",
        Recovery::Login => "Run `lmsquiz login --token <TOKEN>` and start again.    [q] Quit",
    };
    let lines = vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(
            "✗  Something went wrong",
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(err.message.clone()),
        Line::from(""),
        Line::from(Span::styled(action, Style::default().fg(Color::DarkGray))),
    ];
    centered_panel(f, area, lines);
}
