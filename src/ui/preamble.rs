use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::state::AppState;
use crate::ui::markdown::markdown_to_lines;

pub fn draw_preamble(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(quiz) = &state.preview else {
        return;
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            quiz.title.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(markdown_to_lines(&quiz.description));
    lines.push(Line::from(""));

    let facts = [
        ("Questions", quiz.questions.len().to_string()),
        ("Points", format!("{}", quiz.total_points())),
        (
            "Time limit",
            quiz.time_limit_minutes
                .map_or_else(|| "none".to_string(), |m| format!("{} minutes", m)),
        ),
        ("Passing score", format!("{}", quiz.passing_score)),
        (
            "Attempts allowed",
            quiz.max_attempts
                .map_or_else(|| "unlimited".to_string(), |m| m.to_string()),
        ),
    ];
    for (label, value) in facts {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>16}: ", label), Style::default().fg(Color::DarkGray)),
            Span::raw(value),
        ]));
    }

    lines.push(Line::from(""));
    if quiz.time_limit_minutes.is_some() {
        lines.push(Line::from(Span::styled(
            "The timer starts when you press Enter. Answers are submitted automatically when it runs out.",
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "Press Enter to start, Esc to go back",
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default().borders(Borders::ALL);
    let widget = Paragraph::new(lines)
        .block(block)
        .alignment(ratatui::layout::Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(widget, area);
}
