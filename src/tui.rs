use std::io;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::Rect;
use ratatui::prelude::CrosstermBackend;
use ratatui::Terminal;

use crate::api::PortalApi;
use crate::error::Result;
use crate::jobs::{spawn_job, NetEvent};
use crate::state::*;
use crate::submit::SubmitTrigger;
use crate::timer::{spawn_countdown, TimerEvent, TimerHandle};

/// Executes `Effect`s and owns the channels that feed events back into the loop.
pub struct Runtime {
    api: Arc<dyn PortalApi>,
    net_tx: mpsc::Sender<NetEvent>,
    net_rx: mpsc::Receiver<NetEvent>,
    timer: Option<(TimerHandle, mpsc::Receiver<TimerEvent>)>,
    warn_at: Option<u64>,
}

impl Runtime {
    pub fn new(api: Arc<dyn PortalApi>, warn_at: Option<u64>) -> Self {
        let (net_tx, net_rx) = mpsc::channel();
        Self {
            api,
            net_tx,
            net_rx,
            timer: None,
            warn_at,
        }
    }

    pub fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Spawn(job) => spawn_job(job, self.api.clone(), self.net_tx.clone()),
                Effect::StartTimer(secs) => {
                    // Replacing the handle drops, and so stops, any previous countdown.
                    self.timer = Some(spawn_countdown(secs, self.warn_at));
                    tracing::debug!(secs, "countdown started");
                }
                Effect::StopTimer => {
                    if let Some((handle, _)) = self.timer.take() {
                        handle.stop();
                        tracing::debug!("countdown stopped");
                    }
                }
            }
        }
    }

    /// Feeds pending timer and network events into `state`.
    fn pump(&mut self, state: &mut AppState) {
        loop {
            let event = match &self.timer {
                Some((_, rx)) => rx.try_recv().ok(),
                None => None,
            };
            let Some(event) = event else {
                break;
            };
            let effects = state.on_timer(event);
            self.apply(effects);
        }

        while let Ok(event) = self.net_rx.try_recv() {
            let effects = state.on_net(event);
            self.apply(effects);
        }
    }
}

pub fn run_tui(mut state: AppState, mut runtime: Runtime, initial: Vec<Effect>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    state.warn_at = runtime.warn_at;
    runtime.apply(initial);

    let result = main_loop(&mut terminal, &mut state, &mut runtime);

    // Restore terminal
    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
    terminal.show_cursor().ok();

    result
}

fn main_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    state: &mut AppState,
    runtime: &mut Runtime,
) -> Result<()> {
    loop {
        terminal.draw(|f| crate::ui::draw(f, state))?;

        if state.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))? {
            let effects = match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(key, state),
                Event::Mouse(mouse) => {
                    let size = terminal.size()?;
                    handle_mouse(mouse, state, Rect::new(0, 0, size.width, size.height));
                    Vec::new()
                }
                _ => Vec::new(),
            };
            runtime.apply(effects);
        }

        runtime.pump(state);
    }

    Ok(())
}

pub fn handle_key(key: KeyEvent, state: &mut AppState) -> Vec<Effect> {
    if state.has_dialog() {
        return handle_dialog_key(key, state);
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match state.screen {
        Screen::Loading(_) => {
            if ctrl && key.code == KeyCode::Char('q') {
                state.should_quit = true;
            }
            Vec::new()
        }
        Screen::AssessmentList => handle_list_key(key, state),
        Screen::Preamble => match key.code {
            KeyCode::Enter => state.begin_attempt(),
            KeyCode::Esc => state.back_to_list(),
            KeyCode::Char('q') if ctrl => {
                state.should_quit = true;
                Vec::new()
            }
            _ => Vec::new(),
        },
        Screen::Working => handle_working_key(key, state),
        // A submission is in flight; every key waits for it.
        Screen::Submitting => Vec::new(),
        Screen::Results => match key.code {
            KeyCode::Enter | KeyCode::Esc => state.back_to_list(),
            KeyCode::Char('q') => {
                state.should_quit = true;
                Vec::new()
            }
            _ => Vec::new(),
        },
        Screen::PageError => match key.code {
            KeyCode::Esc | KeyCode::Enter => {
                let recovery = state.page_error.as_ref().map(|e| e.recovery);
                if recovery == Some(Recovery::Login) {
                    state.should_quit = true;
                    Vec::new()
                } else {
                    state.back_to_list()
                }
            }
            KeyCode::Char('q') => {
                state.should_quit = true;
                Vec::new()
            }
            _ => Vec::new(),
        },
    }
}

fn handle_list_key(key: KeyEvent, state: &mut AppState) -> Vec<Effect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => state.list_up(),
        KeyCode::Down | KeyCode::Char('j') => state.list_down(),
        KeyCode::Enter => return state.open_selected(),
        KeyCode::Char('r') if ctrl => return state.load_assessments(),
        KeyCode::Char('r') => return state.show_results(None),
        KeyCode::Char('q') => state.should_quit = true,
        _ => {}
    }
    Vec::new()
}

fn handle_working_key(key: KeyEvent, state: &mut AppState) -> Vec<Effect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    // Global bindings
    if ctrl {
        match key.code {
            KeyCode::Char('q') => state.push_dialog(Dialog::ConfirmLeave),
            KeyCode::Char('s') => state.push_dialog(Dialog::ConfirmSubmit),
            KeyCode::Char('g') => state.push_dialog(Dialog::GoTo),
            KeyCode::Up | KeyCode::Left => state.navigate_prev(),
            KeyCode::Down | KeyCode::Right => state.navigate_next(),
            _ => {}
        }
        return Vec::new();
    }

    match state.input_mode {
        InputMode::TextInput => handle_text_input_key(key, state),
        InputMode::ChoiceSelect => handle_choice_key(key, state),
        InputMode::Navigation => handle_nav_key(key, state),
    }
    Vec::new()
}

fn handle_text_input_key(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Char(c) => state.insert_char(c),
        KeyCode::Backspace => state.backspace(),
        KeyCode::Delete => state.delete_char(),
        KeyCode::Left => state.cursor_left(),
        KeyCode::Right => state.cursor_right(),
        KeyCode::Home => state.cursor_home(),
        KeyCode::End => state.cursor_end(),
        KeyCode::Enter | KeyCode::Down | KeyCode::Tab => state.navigate_next(),
        KeyCode::Up | KeyCode::BackTab => state.navigate_prev(),
        KeyCode::Esc => state.input_mode = InputMode::Navigation,
        _ => {}
    }
}

fn handle_choice_key(key: KeyEvent, state: &mut AppState) {
    let count = state.current_question().map_or(0, |q| q.choices().len());
    match key.code {
        // Letters beyond the last option fall through, so `g` and `?` keep working.
        KeyCode::Char(c) if c.is_ascii_lowercase() && ((c as u8 - b'a') as usize) < count => {
            state.select_choice((c as u8 - b'a') as usize);
        }
        KeyCode::Char(' ') | KeyCode::Enter => {
            let idx = state.choice_cursor;
            state.select_choice(idx);
        }
        KeyCode::Tab => {
            if count > 0 {
                state.choice_cursor = (state.choice_cursor + 1) % count;
            }
        }
        KeyCode::Delete | KeyCode::Backspace => state.clear_answer(),
        _ => handle_nav_key(key, state),
    }
}

fn handle_nav_key(key: KeyEvent, state: &mut AppState) {
    let is_text_question = state
        .current_question()
        .is_some_and(|q| !q.is_choice());
    if is_text_question && state.input_mode == InputMode::Navigation {
        match key.code {
            KeyCode::Enter => {
                state.input_mode = InputMode::TextInput;
                state.cursor_end();
                return;
            }
            KeyCode::Char(c) if c != '?' && c != 'g' => {
                state.input_mode = InputMode::TextInput;
                state.cursor_end();
                state.insert_char(c);
                return;
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::Up | KeyCode::Left => state.navigate_prev(),
        KeyCode::Down | KeyCode::Right => state.navigate_next(),
        KeyCode::PageUp => state.navigate_by(-5),
        KeyCode::PageDown => state.navigate_by(5),
        KeyCode::Home => state.navigate_to(0),
        KeyCode::End => state.navigate_last(),
        KeyCode::Char('g') => state.push_dialog(Dialog::GoTo),
        KeyCode::Char('?') => state.push_dialog(Dialog::Help),
        _ => {}
    }
}

fn handle_dialog_key(key: KeyEvent, state: &mut AppState) -> Vec<Effect> {
    let dialog = state.top_dialog().cloned();
    match dialog {
        Some(Dialog::ConfirmSubmit) => match key.code {
            KeyCode::Enter => {
                state.pop_dialog();
                return state.request_submit(SubmitTrigger::Manual);
            }
            KeyCode::Esc => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::ConfirmLeave) => match key.code {
            KeyCode::Enter => {
                state.pop_dialog();
                return state.leave_attempt();
            }
            KeyCode::Esc => {
                state.pop_dialog();
            }
            _ => {}
        },
        Some(Dialog::TimeWarning) => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                state.pop_dialog();
            }
        }
        Some(Dialog::GoTo) => match key.code {
            KeyCode::Char(c) => state.goto_push(c),
            KeyCode::Backspace => {
                state.goto_input.pop();
            }
            KeyCode::Enter => {
                state.pop_dialog();
                state.goto_commit();
            }
            KeyCode::Esc => {
                state.pop_dialog();
                state.goto_input.clear();
            }
            _ => {}
        },
        Some(Dialog::Help) => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                state.pop_dialog();
            }
        }
        None => {}
    }
    Vec::new()
}

fn handle_mouse(mouse: MouseEvent, state: &mut AppState, size: Rect) {
    if state.screen != Screen::Working || state.has_dialog() {
        return;
    }
    let Some(attempt) = &state.attempt else {
        return;
    };
    let current = attempt.navigator.current();

    let layout = crate::ui::layout::compute_layout(size);
    let in_main = |x: u16, y: u16| {
        let m = layout.main;
        x >= m.x && x < m.x + m.width && y >= m.y && y < m.y + m.height
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let (x, y) = (mouse.column, mouse.row);
            if let Some(row) = crate::ui::layout::sidebar_row(&layout, x, y) {
                let visible = layout.sidebar.height.saturating_sub(1) as usize;
                let offset = crate::ui::sidebar::scroll_offset(current, visible);
                state.navigate_to(offset + row);
            } else if in_main(x, y) {
                let content_line = (y - layout.main.y) as usize + state.question_scroll;
                let hit = crate::ui::question::compute_hit_map(state, layout.main)
                    .and_then(|map| map.choice_at(content_line));
                if let Some(idx) = hit {
                    state.select_choice(idx);
                }
            }
        }
        MouseEventKind::ScrollUp => {
            if in_main(mouse.column, mouse.row) {
                state.question_scroll = state.question_scroll.saturating_sub(1);
            } else {
                state.navigate_prev();
            }
        }
        MouseEventKind::ScrollDown => {
            if in_main(mouse.column, mouse.row) {
                state.question_scroll += 1;
            } else {
                state.navigate_next();
            }
        }
        _ => {}
    }
}
