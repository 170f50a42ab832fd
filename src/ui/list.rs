use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::model::{AssessmentSummary, AttemptRecord};
use crate::state::AppState;

fn time_limit(minutes: Option<u32>) -> String {
    minutes.map_or_else(|| "untimed".to_string(), |m| format!("{} min", m))
}

fn attempts(summary: &AssessmentSummary) -> String {
    match summary.max_attempts {
        Some(max) => format!("{}/{}", summary.attempts_used, max),
        None => format!("{}/∞", summary.attempts_used),
    }
}

fn empty_state(f: &mut Frame, area: Rect, text: &str) {
    let widget = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(text.to_string(), Style::default().fg(Color::DarkGray))),
    ])
    .alignment(ratatui::layout::Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(widget, area);
}

pub fn draw_assessments(f: &mut Frame, area: Rect, state: &AppState) {
    if state.assessments.is_empty() {
        empty_state(f, area, "No assessments are available right now.");
        return;
    }

    let rows: Vec<Row> = state
        .assessments
        .iter()
        .map(|a| {
            let style = if a.can_start() {
                Style::default()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Row::new(vec![
                Cell::from(a.title.clone()),
                Cell::from(a.course.clone().unwrap_or_default()),
                Cell::from(a.question_count.to_string()),
                Cell::from(time_limit(a.time_limit_minutes)),
                Cell::from(attempts(a)),
                Cell::from(
                    a.due
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                ),
            ])
            .style(style)
        })
        .collect();

    let header = Row::new(vec!["Assessment", "Course", "Qs", "Time", "Attempts", "Due"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(18),
            Constraint::Length(4),
            Constraint::Length(9),
            Constraint::Length(9),
            Constraint::Length(17),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL))
    .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol(" ▸ ");

    let mut table_state = TableState::default().with_selected(Some(state.list_cursor));
    f.render_stateful_widget(table, area, &mut table_state);
}

fn score(record: &AttemptRecord) -> String {
    record
        .score
        .map_or_else(|| "pending".to_string(), |s| format!("{:.1}", s))
}

pub fn draw_results(f: &mut Frame, area: Rect, state: &AppState) {
    let mut top = 0;
    if let Some(notice) = &state.notice {
        let notice_area = Rect { height: 3, ..area };
        let widget = Paragraph::new(Line::from(Span::styled(
            format!(" ✓ {}", notice),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )))
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(widget, notice_area);
        top = 3;
    }
    let table_area = Rect {
        y: area.y + top,
        height: area.height.saturating_sub(top),
        ..area
    };

    if state.records.is_empty() {
        empty_state(f, table_area, "No submitted attempts yet.");
        return;
    }

    let rows: Vec<Row> = state
        .records
        .iter()
        .map(|r| {
            let (verdict, color) = match r.passed {
                Some(true) => ("passed", Color::Green),
                Some(false) => ("not passed", Color::Red),
                None => ("", Color::Reset),
            };
            Row::new(vec![
                Cell::from(r.assessment_title.clone()),
                Cell::from(
                    r.submitted_at
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_default(),
                ),
                Cell::from(score(r)),
                Cell::from(Span::styled(verdict, Style::default().fg(color))),
            ])
        })
        .collect();

    let header = Row::new(vec!["Assessment", "Submitted", "Score", "Result"])
        .style(Style::default().add_modifier(Modifier::BOLD));
    let table = Table::new(
        rows,
        [
            Constraint::Min(20),
            Constraint::Length(17),
            Constraint::Length(8),
            Constraint::Length(11),
        ],
    )
    .header(header)
    .block(Block::default().borders(Borders::ALL).title(" Submitted attempts "));
    f.render_widget(table, table_area);
}
