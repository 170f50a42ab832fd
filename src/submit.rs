use crate::error::{Disposition, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitState {
    Idle,
    InFlight(SubmitTrigger),
    Submitted(SubmitTrigger),
    Closed,
}

/// What the caller should do after a submission finished.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Accepted; show the results list with this message.
    Done(String),
    /// Failed but the attempt is still open; show the message inline.
    Retry(String),
    /// The portal closed the attempt; send the learner back to the list.
    Closed(String),
}

/// Guards the single successful submission of an attempt.
///
/// `begin` succeeds only from `Idle`. A failed request returns to `Idle` so the
/// learner can retry by hand; nothing is retried automatically.
#[derive(Debug, Clone)]
pub struct SubmissionCoordinator {
    state: SubmitState,
    last_error: Option<String>,
}

impl Default for SubmissionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionCoordinator {
    pub fn new() -> Self {
        Self {
            state: SubmitState::Idle,
            last_error: None,
        }
    }

    pub fn state(&self) -> &SubmitState {
        &self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.state, SubmitState::InFlight(_))
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SubmitState::Submitted(_) | SubmitState::Closed)
    }

    pub fn begin(&mut self, trigger: SubmitTrigger) -> bool {
        if self.state != SubmitState::Idle {
            tracing::debug!(?trigger, state = ?self.state, "ignoring duplicate submit");
            return false;
        }
        self.state = SubmitState::InFlight(trigger);
        self.last_error = None;
        true
    }

    pub fn complete<T>(&mut self, result: Result<T, Error>) -> SubmitOutcome {
        let trigger = match self.state {
            SubmitState::InFlight(t) => t,
            _ => SubmitTrigger::Manual,
        };
        match result {
            Ok(_) => {
                self.state = SubmitState::Submitted(trigger);
                SubmitOutcome::Done(outcome_message(trigger).to_string())
            }
            Err(err) if err.disposition() == Disposition::BackToList => {
                self.state = SubmitState::Closed;
                SubmitOutcome::Closed(err.to_string())
            }
            Err(err) => {
                tracing::warn!(error = %err, ?trigger, "submission failed");
                self.state = SubmitState::Idle;
                let msg = format!("Submission failed: {}. Press Ctrl+S to try again.", err);
                self.last_error = Some(msg.clone());
                SubmitOutcome::Retry(msg)
            }
        }
    }
}

pub fn outcome_message(trigger: SubmitTrigger) -> &'static str {
    match trigger {
        SubmitTrigger::Manual => "Assessment submitted.",
        SubmitTrigger::Timeout => "Time expired. Your answers were submitted automatically.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_is_noop() {
        let mut c = SubmissionCoordinator::new();
        assert!(c.begin(SubmitTrigger::Timeout));
        assert!(!c.begin(SubmitTrigger::Manual));
        assert_eq!(c.state(), &SubmitState::InFlight(SubmitTrigger::Timeout));
    }

    #[test]
    fn test_success_is_terminal() {
        let mut c = SubmissionCoordinator::new();
        c.begin(SubmitTrigger::Manual);
        let outcome = c.complete::<()>(Ok(()));
        assert_eq!(outcome, SubmitOutcome::Done("Assessment submitted.".into()));
        assert!(c.is_terminal());
        assert!(!c.begin(SubmitTrigger::Manual));
    }

    #[test]
    fn test_network_failure_reopens_for_manual_retry() {
        let mut c = SubmissionCoordinator::new();
        c.begin(SubmitTrigger::Timeout);
        let outcome = c.complete::<()>(Err(Error::Network("connection reset".into())));
        assert!(matches!(outcome, SubmitOutcome::Retry(_)));
        assert_eq!(c.state(), &SubmitState::Idle);
        assert!(c.last_error().unwrap().contains("connection reset"));
        assert!(c.begin(SubmitTrigger::Manual));
        assert!(c.last_error().is_none());
    }

    #[test]
    fn test_closed_attempt_is_terminal() {
        let mut c = SubmissionCoordinator::new();
        c.begin(SubmitTrigger::Manual);
        let outcome = c.complete::<()>(Err(Error::AttemptClosed));
        assert!(matches!(outcome, SubmitOutcome::Closed(_)));
        assert!(!c.begin(SubmitTrigger::Manual));
    }

    #[test]
    fn test_messages_distinguish_trigger() {
        assert_ne!(
            outcome_message(SubmitTrigger::Manual),
            outcome_message(SubmitTrigger::Timeout)
        );
        assert!(outcome_message(SubmitTrigger::Timeout).contains("Time expired"));
    }
}
