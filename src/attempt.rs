//! One attempt at an assessment, from the start request to its single submission.

use chrono::{DateTime, Utc};

use crate::buffer::AnswerBuffer;
use crate::error::{AnswerError, Error, Result};
use crate::model::{Answer, AttemptId, Question, Quiz, SubmittedAnswer};
use crate::navigator::Navigator;
use crate::submit::{SubmissionCoordinator, SubmitOutcome, SubmitTrigger};

#[derive(Debug, Clone, PartialEq)]
pub enum AttemptStatus {
    /// The start request is outstanding; answers are buffered locally.
    Starting,
    Active(AttemptId),
    Failed(String),
}

/// Everything needed to send the submit request.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitDispatch {
    pub attempt: AttemptId,
    pub answers: Vec<SubmittedAnswer>,
    pub trigger: SubmitTrigger,
}

#[derive(Debug, Clone)]
pub struct ActiveAttempt {
    pub quiz: Quiz,
    pub status: AttemptStatus,
    pub buffer: AnswerBuffer,
    pub navigator: Navigator,
    pub coordinator: SubmissionCoordinator,
    pub started_at: DateTime<Utc>,
    /// `None` for untimed quizzes.
    pub remaining_seconds: Option<u64>,
    /// Set once the time limit ran out; never cleared.
    expired: bool,
    deferred: Option<SubmitTrigger>,
}

impl ActiveAttempt {
    pub fn new(quiz: Quiz) -> Self {
        let navigator = Navigator::new(quiz.questions.len());
        let remaining_seconds = quiz.time_limit_secs();
        Self {
            quiz,
            status: AttemptStatus::Starting,
            buffer: AnswerBuffer::new(),
            navigator,
            coordinator: SubmissionCoordinator::new(),
            started_at: Utc::now(),
            remaining_seconds,
            expired: false,
            deferred: None,
        }
    }

    pub fn is_timed(&self) -> bool {
        self.remaining_seconds.is_some()
    }

    pub fn attempt_id(&self) -> Option<&AttemptId> {
        match &self.status {
            AttemptStatus::Active(id) => Some(id),
            _ => None,
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.quiz.questions.get(self.navigator.current())
    }

    pub fn unanswered_count(&self) -> usize {
        self.quiz
            .questions
            .len()
            .saturating_sub(self.buffer.completed_count())
    }

    pub fn is_expired(&self) -> bool {
        self.expired
    }

    /// Answers may change until the time is up or a submission is under way or done.
    pub fn is_editable(&self) -> bool {
        !self.expired
            && !self.coordinator.is_in_flight()
            && !self.coordinator.is_terminal()
            && self.deferred.is_none()
            && !matches!(self.status, AttemptStatus::Failed(_))
    }

    pub fn answer_current(&mut self, answer: Answer) -> std::result::Result<(), AnswerError> {
        if !self.is_editable() {
            return Ok(());
        }
        let Some(question) = self.quiz.questions.get(self.navigator.current()) else {
            return Ok(());
        };
        self.buffer.set_answer(question, answer)
    }

    pub fn clear_current(&mut self) {
        if !self.is_editable() {
            return;
        }
        if let Some(question) = self.quiz.questions.get(self.navigator.current()) {
            self.buffer.clear(question.id);
        }
    }

    pub fn tick(&mut self, remaining: u64) {
        if self.remaining_seconds.is_some() {
            self.remaining_seconds = Some(remaining);
        }
    }

    /// Freezes the answers at the time limit.
    pub fn expire(&mut self) {
        if self.remaining_seconds.is_some() {
            self.remaining_seconds = Some(0);
            self.expired = true;
        }
    }

    /// Applies the start response. Returns the deferred submission, if one was waiting.
    pub fn on_started(&mut self, result: Result<AttemptId>) -> Option<SubmitDispatch> {
        match result {
            Ok(id) => {
                tracing::info!(quiz = self.quiz.id, attempt = %id, "attempt active");
                self.status = AttemptStatus::Active(id.clone());
                self.deferred.take().map(|trigger| self.dispatch(id, trigger))
            }
            Err(err) => {
                tracing::warn!(quiz = self.quiz.id, error = %err, "cannot start attempt");
                if self.deferred.take().is_some() {
                    self.coordinator.complete::<()>(Err(Error::Network(err.to_string())));
                }
                self.status = AttemptStatus::Failed(err.to_string());
                None
            }
        }
    }

    /// Begins the one submission of this attempt.
    ///
    /// Returns the request to send now. While the attempt is still starting the
    /// request is held back and released by `on_started`. After expiry every
    /// request, including a retry by hand, counts as a timeout submission.
    pub fn request_submit(&mut self, trigger: SubmitTrigger) -> Option<SubmitDispatch> {
        let trigger = if self.expired {
            SubmitTrigger::Timeout
        } else {
            trigger
        };
        if matches!(self.status, AttemptStatus::Failed(_)) || self.deferred.is_some() {
            return None;
        }
        if !self.coordinator.begin(trigger) {
            return None;
        }
        match &self.status {
            AttemptStatus::Active(id) => Some(self.dispatch(id.clone(), trigger)),
            _ => {
                tracing::debug!(?trigger, "submit deferred until the attempt id arrives");
                self.deferred = Some(trigger);
                None
            }
        }
    }

    pub fn on_submitted<T>(&mut self, result: Result<T>) -> SubmitOutcome {
        self.coordinator.complete(result)
    }

    fn dispatch(&self, attempt: AttemptId, trigger: SubmitTrigger) -> SubmitDispatch {
        SubmitDispatch {
            attempt,
            answers: self.buffer.to_submission(&self.quiz),
            trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Choice, QuestionKind};
    use crate::submit::SubmitState;

    fn quiz() -> Quiz {
        Quiz {
            id: 7,
            title: "Safety basics".into(),
            description: String::new(),
            questions: vec![
                Question {
                    id: 1,
                    prompt: "Exit count?".into(),
                    points: 1.0,
                    kind: QuestionKind::SingleChoice(vec![
                        Choice { id: 10, text: "One".into(), marked_correct: false },
                        Choice { id: 11, text: "Two".into(), marked_correct: true },
                    ]),
                },
                Question {
                    id: 2,
                    prompt: "Assembly point".into(),
                    points: 1.0,
                    kind: QuestionKind::ShortAnswer,
                },
            ],
            time_limit_minutes: Some(5),
            passing_score: 50.0,
            max_attempts: None,
        }
    }

    #[test]
    fn test_answers_buffered_while_starting() {
        let mut attempt = ActiveAttempt::new(quiz());
        assert_eq!(attempt.status, AttemptStatus::Starting);
        attempt.answer_current(Answer::Choice(11)).unwrap();
        assert_eq!(attempt.buffer.completed_count(), 1);
        assert_eq!(attempt.remaining_seconds, Some(300));
    }

    #[test]
    fn test_submit_while_starting_is_released_once() {
        let mut attempt = ActiveAttempt::new(quiz());
        attempt.answer_current(Answer::Choice(10)).unwrap();
        assert_eq!(attempt.request_submit(SubmitTrigger::Manual), None);
        assert_eq!(attempt.request_submit(SubmitTrigger::Timeout), None);

        let dispatch = attempt
            .on_started(Ok(AttemptId("a-1".into())))
            .expect("deferred submit released");
        assert_eq!(dispatch.attempt, AttemptId("a-1".into()));
        assert_eq!(dispatch.trigger, SubmitTrigger::Manual);
        assert_eq!(dispatch.answers.len(), 1);
        assert_eq!(attempt.request_submit(SubmitTrigger::Manual), None);
    }

    #[test]
    fn test_start_failure_blocks_submit() {
        let mut attempt = ActiveAttempt::new(quiz());
        attempt.on_started(Err(Error::Unauthorized));
        assert!(matches!(attempt.status, AttemptStatus::Failed(_)));
        assert_eq!(attempt.request_submit(SubmitTrigger::Manual), None);
        assert_eq!(attempt.coordinator.state(), &SubmitState::Idle);
    }

    #[test]
    fn test_answers_frozen_once_submitting() {
        let mut attempt = ActiveAttempt::new(quiz());
        attempt.on_started(Ok(AttemptId("a-2".into())));
        attempt.request_submit(SubmitTrigger::Manual).unwrap();
        attempt.answer_current(Answer::Choice(11)).unwrap();
        assert_eq!(attempt.buffer.completed_count(), 0);
    }

    #[test]
    fn test_expiry_freezes_answers_and_keeps_trigger() {
        let mut attempt = ActiveAttempt::new(quiz());
        attempt.on_started(Ok(AttemptId("a-3".into())));
        attempt.answer_current(Answer::Choice(10)).unwrap();
        attempt.expire();
        assert!(attempt.is_expired());
        assert_eq!(attempt.remaining_seconds, Some(0));

        attempt.answer_current(Answer::Choice(11)).unwrap();
        attempt.clear_current();
        assert_eq!(attempt.buffer.selected_option(1), Some(10));

        let dispatch = attempt.request_submit(SubmitTrigger::Manual).unwrap();
        assert_eq!(dispatch.trigger, SubmitTrigger::Timeout);
    }
}
