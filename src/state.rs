use crate::attempt::{ActiveAttempt, AttemptStatus};
use crate::error::{Disposition, Error};
use crate::jobs::{Job, NetEvent};
use crate::model::*;
use crate::submit::{SubmitOutcome, SubmitTrigger};
use crate::timer::TimerEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Loading(String),
    AssessmentList,
    Preamble,
    Working,
    Submitting,
    Results,
    PageError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    ConfirmSubmit,
    ConfirmLeave,
    TimeWarning,
    GoTo,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Navigation,
    ChoiceSelect,
    TextInput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    BackToList,
    Login,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageError {
    pub message: String,
    pub recovery: Recovery,
}

/// Side effects requested by a state transition, carried out by the event loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Spawn(Job),
    StartTimer(u64),
    StopTimer,
}

#[derive(Debug)]
pub struct AppState {
    pub screen: Screen,
    pub learner: Option<String>,
    /// Remaining seconds at which the timer is shown as urgent.
    pub warn_at: Option<u64>,
    pub assessments: Vec<AssessmentSummary>,
    pub list_cursor: usize,
    pub preview: Option<Quiz>,
    pub attempt: Option<ActiveAttempt>,
    pub records: Vec<AttemptRecord>,
    pub notice: Option<String>,
    /// Inline, retry-capable message for the current screen.
    pub banner: Option<String>,
    pub page_error: Option<PageError>,
    pub input_mode: InputMode,
    pub dialog_stack: Vec<Dialog>,
    pub choice_cursor: usize,
    pub text_input: String,
    pub text_cursor: usize,
    pub goto_input: String,
    pub question_scroll: usize,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(learner: Option<String>) -> Self {
        Self {
            screen: Screen::Loading("Loading assessments".to_string()),
            learner,
            warn_at: None,
            assessments: Vec::new(),
            list_cursor: 0,
            preview: None,
            attempt: None,
            records: Vec::new(),
            notice: None,
            banner: None,
            page_error: None,
            input_mode: InputMode::Navigation,
            dialog_stack: Vec::new(),
            choice_cursor: 0,
            text_input: String::new(),
            text_cursor: 0,
            goto_input: String::new(),
            question_scroll: 0,
            should_quit: false,
        }
    }

    // ---- assessment list ----

    pub fn load_assessments(&mut self) -> Vec<Effect> {
        self.screen = Screen::Loading("Loading assessments".to_string());
        self.banner = None;
        vec![Effect::Spawn(Job::LoadAssessments)]
    }

    pub fn selected_assessment(&self) -> Option<&AssessmentSummary> {
        self.assessments.get(self.list_cursor)
    }

    pub fn list_up(&mut self) {
        self.list_cursor = self.list_cursor.saturating_sub(1);
    }

    pub fn list_down(&mut self) {
        if self.list_cursor + 1 < self.assessments.len() {
            self.list_cursor += 1;
        }
    }

    pub fn open_selected(&mut self) -> Vec<Effect> {
        let Some(summary) = self.selected_assessment() else {
            return Vec::new();
        };
        let id = summary.id;
        self.screen = Screen::Loading(format!("Opening {}", summary.title));
        self.banner = None;
        vec![Effect::Spawn(Job::LoadQuiz(id))]
    }

    /// Opens an assessment directly, bypassing the list selection.
    pub fn open_assessment(&mut self, id: QuizId) -> Vec<Effect> {
        self.screen = Screen::Loading(format!("Opening assessment {}", id));
        vec![Effect::Spawn(Job::LoadQuiz(id))]
    }

    pub fn show_results(&mut self, notice: Option<String>) -> Vec<Effect> {
        self.screen = Screen::Loading("Loading results".to_string());
        vec![Effect::Spawn(Job::LoadResults { notice })]
    }

    pub fn back_to_list(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.attempt.take().is_some() {
            effects.push(Effect::StopTimer);
        }
        self.preview = None;
        self.page_error = None;
        self.notice = None;
        self.dialog_stack.clear();
        self.input_mode = InputMode::Navigation;
        effects.extend(self.load_assessments());
        effects
    }

    // ---- attempt lifecycle ----

    /// Starts an attempt on the previewed quiz, unless the retake limit is used up.
    pub fn begin_attempt(&mut self) -> Vec<Effect> {
        let Some(quiz) = self.preview.clone() else {
            return Vec::new();
        };
        if let Some(message) = self.retake_refusal(&quiz) {
            self.banner = Some(message);
            return Vec::new();
        }

        let attempt = ActiveAttempt::new(quiz);
        let mut effects = vec![Effect::Spawn(Job::StartAttempt(attempt.quiz.id))];
        if let Some(secs) = attempt.remaining_seconds {
            effects.push(Effect::StartTimer(secs));
        }
        tracing::info!(quiz = attempt.quiz.id, timed = attempt.is_timed(), "starting attempt");

        self.attempt = Some(attempt);
        self.preview = None;
        self.banner = None;
        self.screen = Screen::Working;
        self.enter_question();
        effects
    }

    fn retake_refusal(&self, quiz: &Quiz) -> Option<String> {
        let summary = self.assessments.iter().find(|a| a.id == quiz.id)?;
        let max = quiz.max_attempts.or(summary.max_attempts)?;
        if summary.attempts_used >= max {
            Some(format!(
                "Retake limit reached: {} of {} attempts used.",
                summary.attempts_used, max
            ))
        } else {
            None
        }
    }

    pub fn on_timer(&mut self, event: TimerEvent) -> Vec<Effect> {
        match event {
            TimerEvent::Tick(secs) => {
                if let Some(attempt) = &mut self.attempt {
                    attempt.tick(secs);
                }
                Vec::new()
            }
            TimerEvent::Warning => {
                if self.screen == Screen::Working && !self.has_dialog() {
                    self.push_dialog(Dialog::TimeWarning);
                }
                Vec::new()
            }
            TimerEvent::TimeExpired => {
                if let Some(attempt) = &mut self.attempt {
                    attempt.expire();
                }
                self.request_submit(SubmitTrigger::Timeout)
            }
        }
    }

    pub fn request_submit(&mut self, trigger: SubmitTrigger) -> Vec<Effect> {
        let Some(attempt) = &mut self.attempt else {
            return Vec::new();
        };
        let was_in_flight = attempt.coordinator.is_in_flight();
        let dispatch = attempt.request_submit(trigger);
        let began = !was_in_flight && attempt.coordinator.is_in_flight();
        if !began {
            return Vec::new();
        }

        tracing::info!(?trigger, answered = attempt.buffer.completed_count(), "submitting attempt");
        self.dialog_stack.clear();
        self.banner = None;
        self.screen = Screen::Submitting;

        let mut effects = vec![Effect::StopTimer];
        if let Some(dispatch) = dispatch {
            effects.push(Effect::Spawn(Job::Submit(dispatch)));
        }
        effects
    }

    /// Drops the attempt; its answers are discarded.
    pub fn leave_attempt(&mut self) -> Vec<Effect> {
        if let Some(attempt) = &self.attempt {
            tracing::info!(quiz = attempt.quiz.id, "attempt abandoned");
        }
        self.back_to_list()
    }

    pub fn on_net(&mut self, event: NetEvent) -> Vec<Effect> {
        match event {
            // A list that lands after another screen took over only refreshes the data.
            NetEvent::Assessments(Ok(list)) => {
                self.assessments = list;
                self.list_cursor = self.list_cursor.min(self.assessments.len().saturating_sub(1));
                if matches!(self.screen, Screen::Loading(_)) {
                    self.screen = Screen::AssessmentList;
                }
                Vec::new()
            }
            NetEvent::Assessments(Err(err)) => {
                self.assessments.clear();
                if matches!(self.screen, Screen::Loading(_)) {
                    self.list_failure(err, "Press Ctrl+R to try again.");
                } else {
                    tracing::warn!(error = %err, "assessment list refresh failed");
                }
                Vec::new()
            }
            NetEvent::Quiz(Ok(quiz)) => {
                self.preview = Some(quiz);
                self.screen = Screen::Preamble;
                Vec::new()
            }
            NetEvent::Quiz(Err(err)) => {
                self.list_failure(err, "");
                Vec::new()
            }
            NetEvent::Started { quiz, result } => self.on_started(quiz, result),
            NetEvent::Submitted {
                attempt,
                trigger,
                result,
            } => self.on_submitted(attempt, trigger, result),
            NetEvent::Results { notice, result } => {
                self.notice = notice;
                match result {
                    Ok(records) => {
                        self.records = records;
                        self.banner = None;
                    }
                    Err(err) if err.disposition() == Disposition::Login => {
                        self.page_failure(err, Recovery::Login);
                        return Vec::new();
                    }
                    Err(err) => {
                        self.records.clear();
                        self.banner = Some(format!("Cannot load results: {}", err));
                    }
                }
                self.screen = Screen::Results;
                Vec::new()
            }
        }
    }

    fn on_started(&mut self, quiz: QuizId, result: crate::error::Result<AttemptId>) -> Vec<Effect> {
        let Some(attempt) = &mut self.attempt else {
            return Vec::new();
        };
        if attempt.quiz.id != quiz || attempt.status != AttemptStatus::Starting {
            return Vec::new();
        }

        let failed = result.as_ref().err().map(|e| e.disposition());
        let message = result.as_ref().err().map(|e| e.to_string());
        let dispatch = attempt.on_started(result);

        if let (Some(disposition), Some(message)) = (failed, message) {
            self.attempt = None;
            let recovery = if disposition == Disposition::Login {
                Recovery::Login
            } else {
                Recovery::BackToList
            };
            self.dialog_stack.clear();
            self.page_error = Some(PageError {
                message: format!("Could not start the assessment: {}", message),
                recovery,
            });
            self.screen = Screen::PageError;
            return vec![Effect::StopTimer];
        }

        match dispatch {
            Some(dispatch) => vec![Effect::Spawn(Job::Submit(dispatch))],
            None => Vec::new(),
        }
    }

    fn on_submitted(
        &mut self,
        attempt_id: AttemptId,
        trigger: SubmitTrigger,
        result: crate::error::Result<SubmitReceipt>,
    ) -> Vec<Effect> {
        let Some(attempt) = &mut self.attempt else {
            return Vec::new();
        };
        if attempt.attempt_id() != Some(&attempt_id) {
            return Vec::new();
        }

        match attempt.on_submitted(result) {
            SubmitOutcome::Done(message) => {
                tracing::info!(attempt = %attempt_id, ?trigger, "attempt submitted");
                self.attempt = None;
                self.show_results(Some(message))
            }
            SubmitOutcome::Closed(message) => {
                self.attempt = None;
                self.page_error = Some(PageError {
                    message,
                    recovery: Recovery::BackToList,
                });
                self.screen = Screen::PageError;
                Vec::new()
            }
            SubmitOutcome::Retry(message) => {
                let remaining = attempt.remaining_seconds;
                self.banner = Some(message);
                self.screen = Screen::Working;
                match remaining {
                    Some(secs) if secs > 0 => vec![Effect::StartTimer(secs)],
                    _ => Vec::new(),
                }
            }
        }
    }

    fn list_failure(&mut self, err: Error, hint: &str) {
        match err.disposition() {
            Disposition::Login => self.page_failure(err, Recovery::Login),
            Disposition::NotFound => {
                tracing::debug!(error = %err, "assessment unavailable");
                self.banner = Some("This assessment is no longer available.".to_string());
                self.screen = Screen::AssessmentList;
            }
            _ => {
                let text = format!("{} {}", err, hint);
                self.banner = Some(text.trim_end().to_string());
                self.screen = Screen::AssessmentList;
            }
        }
    }

    fn page_failure(&mut self, err: Error, recovery: Recovery) {
        self.page_error = Some(PageError {
            message: err.to_string(),
            recovery,
        });
        self.screen = Screen::PageError;
    }

    // ---- working screen ----

    pub fn current_question(&self) -> Option<&Question> {
        self.attempt.as_ref().and_then(|a| a.current_question())
    }

    pub fn navigate_to(&mut self, idx: usize) {
        let Some(attempt) = &mut self.attempt else {
            return;
        };
        if attempt.navigator.go_to(idx) {
            self.enter_question();
        }
    }

    pub fn navigate_next(&mut self) {
        if let Some(attempt) = &self.attempt {
            let next = attempt.navigator.current() + 1;
            self.navigate_to(next);
        }
    }

    pub fn navigate_prev(&mut self) {
        if let Some(attempt) = &self.attempt {
            if let Some(prev) = attempt.navigator.current().checked_sub(1) {
                self.navigate_to(prev);
            }
        }
    }

    pub fn navigate_by(&mut self, delta: isize) {
        if let Some(attempt) = &mut self.attempt {
            attempt.navigator.jump(delta);
            self.enter_question();
        }
    }

    pub fn navigate_last(&mut self) {
        if let Some(attempt) = &mut self.attempt {
            attempt.navigator.last();
            self.enter_question();
        }
    }

    /// Resets per-question input state after the navigator moved.
    fn enter_question(&mut self) {
        self.choice_cursor = 0;
        self.question_scroll = 0;
        self.text_input.clear();
        self.text_cursor = 0;

        let Some(attempt) = &self.attempt else {
            return;
        };
        let Some(q) = attempt.current_question() else {
            self.input_mode = InputMode::Navigation;
            return;
        };
        match &q.kind {
            QuestionKind::SingleChoice(choices) | QuestionKind::TrueFalse(choices) => {
                if let Some(selected) = attempt.buffer.selected_option(q.id) {
                    self.choice_cursor = choices.iter().position(|c| c.id == selected).unwrap_or(0);
                }
                self.input_mode = InputMode::ChoiceSelect;
            }
            QuestionKind::ShortAnswer => {
                if let Some(text) = attempt.buffer.text(q.id) {
                    self.text_input = text.to_string();
                    self.text_cursor = self.text_input.chars().count();
                }
                self.input_mode = InputMode::TextInput;
            }
        }
    }

    pub fn select_choice(&mut self, idx: usize) {
        let Some(attempt) = &mut self.attempt else {
            return;
        };
        let Some(choice_id) = attempt
            .current_question()
            .and_then(|q| q.choices().get(idx))
            .map(|c| c.id)
        else {
            return;
        };
        self.choice_cursor = idx;
        if let Err(e) = attempt.answer_current(Answer::Choice(choice_id)) {
            self.banner = Some(e.to_string());
        }
    }

    pub fn clear_answer(&mut self) {
        if !self.is_editable() {
            return;
        }
        if let Some(attempt) = &mut self.attempt {
            attempt.clear_current();
        }
        self.text_input.clear();
        self.text_cursor = 0;
    }

    pub fn insert_char(&mut self, c: char) {
        if !self.is_editable() {
            return;
        }
        let at = byte_index(&self.text_input, self.text_cursor);
        self.text_input.insert(at, c);
        self.text_cursor += 1;
        self.sync_text();
    }

    pub fn backspace(&mut self) {
        if self.text_cursor == 0 || !self.is_editable() {
            return;
        }
        self.text_cursor -= 1;
        let at = byte_index(&self.text_input, self.text_cursor);
        self.text_input.remove(at);
        self.sync_text();
    }

    pub fn delete_char(&mut self) {
        if self.text_cursor >= self.text_input.chars().count() || !self.is_editable() {
            return;
        }
        let at = byte_index(&self.text_input, self.text_cursor);
        self.text_input.remove(at);
        self.sync_text();
    }

    pub fn cursor_left(&mut self) {
        self.text_cursor = self.text_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.text_cursor = (self.text_cursor + 1).min(self.text_input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.text_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.text_cursor = self.text_input.chars().count();
    }

    fn is_editable(&self) -> bool {
        self.attempt.as_ref().is_some_and(|a| a.is_editable())
    }

    fn sync_text(&mut self) {
        let text = self.text_input.clone();
        if let Some(attempt) = &mut self.attempt {
            if let Err(e) = attempt.answer_current(Answer::Text(text)) {
                self.banner = Some(e.to_string());
            }
        }
    }

    pub fn goto_push(&mut self, c: char) {
        if c.is_ascii_digit() && self.goto_input.len() < 4 {
            self.goto_input.push(c);
        }
    }

    /// Jumps to the 1-based question number typed into the go-to dialog.
    pub fn goto_commit(&mut self) {
        let target = self.goto_input.parse::<usize>().ok().and_then(|n| n.checked_sub(1));
        self.goto_input.clear();
        if let Some(idx) = target {
            self.navigate_to(idx);
        }
    }

    // ---- dialogs ----

    pub fn has_dialog(&self) -> bool {
        !self.dialog_stack.is_empty()
    }

    pub fn top_dialog(&self) -> Option<&Dialog> {
        self.dialog_stack.last()
    }

    pub fn push_dialog(&mut self, dialog: Dialog) {
        self.dialog_stack.push(dialog);
    }

    pub fn pop_dialog(&mut self) -> Option<Dialog> {
        self.dialog_stack.pop()
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: QuizId, max: Option<u32>, used: u32) -> AssessmentSummary {
        AssessmentSummary {
            id,
            title: format!("Quiz {}", id),
            course: None,
            time_limit_minutes: None,
            question_count: 1,
            max_attempts: max,
            attempts_used: used,
            due: None,
        }
    }

    fn short_quiz(id: QuizId) -> Quiz {
        Quiz {
            id,
            title: "Short".into(),
            description: String::new(),
            questions: vec![Question {
                id: 1,
                prompt: "Name the tool".into(),
                points: 1.0,
                kind: QuestionKind::ShortAnswer,
            }],
            time_limit_minutes: None,
            passing_score: 0.0,
            max_attempts: None,
        }
    }

    #[test]
    fn test_retake_limit_refused_before_network() {
        let mut state = AppState::new(None);
        state.on_net(NetEvent::Assessments(Ok(vec![summary(4, Some(2), 2)])));
        state.on_net(NetEvent::Quiz(Ok(short_quiz(4))));
        assert_eq!(state.screen, Screen::Preamble);

        let effects = state.begin_attempt();
        assert!(effects.is_empty());
        assert!(state.banner.as_deref().unwrap().contains("2 of 2"));
        assert!(state.attempt.is_none());
    }

    #[test]
    fn test_text_input_handles_multibyte() {
        let mut state = AppState::new(None);
        state.on_net(NetEvent::Quiz(Ok(short_quiz(1))));
        state.begin_attempt();
        for c in "café".chars() {
            state.insert_char(c);
        }
        state.cursor_left();
        state.backspace();
        assert_eq!(state.text_input, "caé");
        let attempt = state.attempt.as_ref().unwrap();
        assert_eq!(attempt.buffer.text(1), Some("caé"));
    }

    #[test]
    fn test_list_failure_is_inline_retry() {
        let mut state = AppState::new(None);
        state.on_net(NetEvent::Assessments(Err(Error::Network("timed out".into()))));
        assert_eq!(state.screen, Screen::AssessmentList);
        assert!(state.banner.as_deref().unwrap().contains("Ctrl+R"));
    }

    #[test]
    fn test_unauthorized_list_points_to_login() {
        let mut state = AppState::new(None);
        state.on_net(NetEvent::Assessments(Err(Error::Unauthorized)));
        assert_eq!(state.screen, Screen::PageError);
        assert_eq!(state.page_error.as_ref().unwrap().recovery, Recovery::Login);
    }
}
