use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::api::PortalApi;
use crate::attempt::SubmitDispatch;
use crate::error::Result;
use crate::model::{AssessmentSummary, AttemptId, AttemptRecord, Quiz, QuizId, SubmitReceipt};
use crate::submit::SubmitTrigger;

/// A portal request issued by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    LoadAssessments,
    LoadQuiz(QuizId),
    StartAttempt(QuizId),
    Submit(SubmitDispatch),
    /// `notice` is carried through to the results screen.
    LoadResults { notice: Option<String> },
}

/// Result of a `Job`, delivered back to the UI thread.
#[derive(Debug)]
pub enum NetEvent {
    Assessments(Result<Vec<AssessmentSummary>>),
    Quiz(Result<Quiz>),
    Started {
        quiz: QuizId,
        result: Result<AttemptId>,
    },
    Submitted {
        attempt: AttemptId,
        trigger: SubmitTrigger,
        result: Result<SubmitReceipt>,
    },
    Results {
        notice: Option<String>,
        result: Result<Vec<AttemptRecord>>,
    },
}

impl Job {
    pub fn run(self, api: &dyn PortalApi) -> NetEvent {
        match self {
            Job::LoadAssessments => NetEvent::Assessments(api.assessments()),
            Job::LoadQuiz(id) => NetEvent::Quiz(api.quiz(id)),
            Job::StartAttempt(quiz) => NetEvent::Started {
                quiz,
                result: api.start_attempt(quiz),
            },
            Job::Submit(dispatch) => {
                let result = api.submit_attempt(&dispatch.attempt, &dispatch.answers);
                NetEvent::Submitted {
                    attempt: dispatch.attempt,
                    trigger: dispatch.trigger,
                    result,
                }
            }
            Job::LoadResults { notice } => NetEvent::Results {
                notice,
                result: api.attempts(),
            },
        }
    }
}

/// Runs `job` on a worker thread; the outcome arrives on `tx`.
pub fn spawn_job(job: Job, api: Arc<dyn PortalApi>, tx: mpsc::Sender<NetEvent>) {
    thread::spawn(move || {
        tracing::debug!(?job, "job started");
        let event = job.run(api.as_ref());
        // The receiver is gone when the UI has already quit.
        let _ = tx.send(event);
    });
}
