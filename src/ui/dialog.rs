use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::state::{AppState, Dialog};
use crate::timer::format_duration;

pub fn draw_dialog(f: &mut Frame, area: Rect, state: &AppState) {
    let Some(dialog) = state.top_dialog() else {
        return;
    };

    match dialog {
        Dialog::ConfirmSubmit => draw_confirm_submit(f, area, state),
        Dialog::ConfirmLeave => draw_confirm_leave(f, area),
        Dialog::TimeWarning => draw_time_warning(f, area, state),
        Dialog::GoTo => draw_goto(f, area, state),
        Dialog::Help => draw_help(f, area),
    }
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

fn render_box(f: &mut Frame, area: Rect, width: u16, lines: Vec<Line>, color: Color, title: &str) {
    let rect = centered_rect(width, lines.len() as u16 + 2, area);
    f.render_widget(Clear, rect);
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    if !title.is_empty() {
        block = block.title(format!(" {} ", title));
    }
    f.render_widget(Paragraph::new(lines).block(block), rect);
}

fn confirm_row() -> Line<'static> {
    Line::from(vec![
        Span::styled("   [Enter] Confirm", Style::default().fg(Color::Green)),
        Span::raw("    "),
        Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
    ])
}

fn draw_confirm_submit(f: &mut Frame, area: Rect, state: &AppState) {
    let unanswered = state.attempt.as_ref().map_or(0, |a| a.unanswered_count());
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(
            "   Submit your answers?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    match unanswered {
        0 => lines.push(Line::from("   All questions are answered.")),
        1 => lines.push(Line::from("   1 question is not answered.")),
        n => lines.push(Line::from(format!("   {} questions are not answered.", n))),
    }
    lines.push(Line::from("   You cannot change answers afterwards."));
    lines.push(Line::from(""));
    lines.push(confirm_row());

    render_box(f, area, 46, lines, Color::Yellow, "");
}

fn draw_confirm_leave(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "   Leave this attempt?",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   Your answers will be discarded"),
        Line::from("   and nothing is submitted."),
        Line::from(""),
        confirm_row(),
    ];
    render_box(f, area, 42, lines, Color::Yellow, "");
}

fn draw_time_warning(f: &mut Frame, area: Rect, state: &AppState) {
    let remaining = state
        .attempt
        .as_ref()
        .and_then(|a| a.remaining_seconds)
        .unwrap_or(0);
    let lines = vec![
        Line::from(Span::styled(
            format!("   ⚠  {} REMAINING", format_duration(remaining)),
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   Your answers are submitted"),
        Line::from("   automatically when time runs out."),
        Line::from(""),
        Line::from(Span::styled(
            "          [Enter] Continue",
            Style::default().fg(Color::Green),
        )),
    ];
    render_box(f, area, 42, lines, Color::Red, "");
}

fn draw_goto(f: &mut Frame, area: Rect, state: &AppState) {
    let total = state.attempt.as_ref().map_or(0, |a| a.quiz.questions.len());
    let lines = vec![
        Line::from(format!("   Question number (1-{}):", total)),
        Line::from(""),
        Line::from(vec![
            Span::raw("   "),
            Span::styled(
                format!("{}_", state.goto_input),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("   [Enter] Go", Style::default().fg(Color::Green)),
            Span::raw("    "),
            Span::styled("[Esc] Cancel", Style::default().fg(Color::DarkGray)),
        ]),
    ];
    render_box(f, area, 36, lines, Color::Cyan, "Go to");
}

fn draw_help(f: &mut Frame, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "   Key Bindings",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("   arrows     Previous/Next question"),
        Line::from("   PgUp/PgDn  Jump 5 questions"),
        Line::from("   Home/End   First/Last question"),
        Line::from("   g, Ctrl+G  Go to question number"),
        Line::from("   a-z        Select choice"),
        Line::from("   Del        Clear answer"),
        Line::from("   Enter      Edit short answer"),
        Line::from("   Ctrl+S     Submit answers"),
        Line::from("   Ctrl+Q     Leave (answers discarded)"),
        Line::from("   ?          This help"),
        Line::from("   Esc        Close dialog"),
        Line::from(""),
        Line::from(Span::styled(
            "        [Esc] Close",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    render_box(f, area, 46, lines, Color::Cyan, "Help");
}
