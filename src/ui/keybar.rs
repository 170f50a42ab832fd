use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::state::{AppState, InputMode, Screen};

fn bindings(state: &AppState) -> Vec<(&'static str, &'static str)> {
    match state.screen {
        Screen::AssessmentList => vec![
            ("↑/↓", "select"),
            ("Enter", "open"),
            ("r", "results"),
            ("Ctrl+R", "reload"),
            ("q", "quit"),
        ],
        Screen::Preamble => vec![("Enter", "start"), ("Esc", "back")],
        Screen::Results => vec![("Enter/Esc", "back to list"), ("q", "quit")],
        Screen::Working => match state.input_mode {
            InputMode::TextInput => vec![
                ("←/→", "cursor"),
                ("↑/↓", "prev/next"),
                ("Esc", "done editing"),
                ("Ctrl+G", "go to"),
                ("Ctrl+S", "submit"),
                ("Ctrl+Q", "leave"),
            ],
            InputMode::ChoiceSelect => vec![
                ("a-z", "answer"),
                ("arrows", "prev/next"),
                ("PgUp/PgDn", "jump 5"),
                ("g", "go to"),
                ("Del", "clear"),
                ("Ctrl+S", "submit"),
                ("Ctrl+Q", "leave"),
            ],
            InputMode::Navigation => vec![
                ("arrows", "prev/next"),
                ("Enter", "edit"),
                ("g", "go to"),
                ("Ctrl+S", "submit"),
                ("Ctrl+Q", "leave"),
            ],
        },
        Screen::PageError => vec![("Esc", "continue"), ("q", "quit")],
        Screen::Submitting => Vec::new(),
        Screen::Loading(_) => vec![("Ctrl+Q", "quit")],
    }
}

pub fn draw_keybar(f: &mut Frame, area: Rect, state: &AppState) {
    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, action)) in bindings(state).iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(
            key.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {}", action)));
    }

    let line = Line::from(spans);
    let widget = Paragraph::new(line).style(Style::default().bg(Color::Rgb(20, 20, 20)));
    f.render_widget(widget, area);
}
