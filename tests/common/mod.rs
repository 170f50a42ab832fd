#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use lmsquiz::api::PortalApi;
use lmsquiz::error::{Error, Result};
use lmsquiz::jobs::NetEvent;
use lmsquiz::model::*;
use lmsquiz::state::{AppState, Effect};

/// In-memory portal with scripted submit outcomes.
pub struct FakePortal {
    pub quiz: Quiz,
    pub summaries: Vec<AssessmentSummary>,
    pub binary: MaterialBinary,
    pub starts: Mutex<u32>,
    pub submits: Mutex<Vec<(AttemptId, Vec<SubmittedAnswer>)>>,
    /// Consumed front to back; an empty queue accepts the submission.
    pub submit_failures: Mutex<VecDeque<Error>>,
    pub start_failures: Mutex<VecDeque<Error>>,
}

impl FakePortal {
    pub fn new(quiz: Quiz) -> Self {
        let summary = AssessmentSummary {
            id: quiz.id,
            title: quiz.title.clone(),
            course: Some("Workplace safety".to_string()),
            time_limit_minutes: quiz.time_limit_minutes,
            question_count: quiz.questions.len(),
            max_attempts: quiz.max_attempts,
            attempts_used: 0,
            due: None,
        };
        Self {
            quiz,
            summaries: vec![summary],
            binary: MaterialBinary {
                bytes: b"%PDF-1.4 handbook".to_vec(),
                content_type: Some("application/pdf".to_string()),
                file_name: Some("handbook.pdf".to_string()),
            },
            starts: Mutex::new(0),
            submits: Mutex::new(Vec::new()),
            submit_failures: Mutex::new(VecDeque::new()),
            start_failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn fail_next_submit(&self, err: Error) {
        self.submit_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_start(&self, err: Error) {
        self.start_failures.lock().unwrap().push_back(err);
    }

    pub fn submit_count(&self) -> usize {
        self.submits.lock().unwrap().len()
    }

    pub fn last_submission(&self) -> Vec<SubmittedAnswer> {
        self.submits.lock().unwrap().last().map(|s| s.1.clone()).unwrap_or_default()
    }
}

impl PortalApi for FakePortal {
    fn profile(&self) -> Result<Profile> {
        Ok(Profile {
            id: 1,
            name: "Dana Learner".to_string(),
            email: None,
        })
    }

    fn assessments(&self) -> Result<Vec<AssessmentSummary>> {
        Ok(self.summaries.clone())
    }

    fn quiz(&self, id: QuizId) -> Result<Quiz> {
        if id == self.quiz.id {
            Ok(self.quiz.clone())
        } else {
            Err(Error::NotFound(format!("assessment {}", id)))
        }
    }

    fn start_attempt(&self, _quiz: QuizId) -> Result<AttemptId> {
        if let Some(err) = self.start_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let mut starts = self.starts.lock().unwrap();
        *starts += 1;
        Ok(AttemptId(format!("attempt-{}", starts)))
    }

    fn submit_attempt(&self, attempt: &AttemptId, answers: &[SubmittedAnswer]) -> Result<SubmitReceipt> {
        if let Some(err) = self.submit_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.submits
            .lock()
            .unwrap()
            .push((attempt.clone(), answers.to_vec()));
        Ok(SubmitReceipt { message: None })
    }

    fn attempts(&self) -> Result<Vec<AttemptRecord>> {
        Ok(self
            .submits
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| AttemptRecord {
                attempt_id: id.clone(),
                assessment_title: self.quiz.title.clone(),
                submitted_at: None,
                score: None,
                passed: None,
            })
            .collect())
    }

    fn materials(&self, _course: CourseId) -> Result<Vec<Material>> {
        Ok(Vec::new())
    }

    fn material_binary(&self, _id: MaterialId) -> Result<MaterialBinary> {
        Ok(self.binary.clone())
    }
}

/// Runs every spawned job to completion, feeding results back into `state`.
///
/// Returns the timer effects in the order they were requested.
pub fn drive(state: &mut AppState, api: &FakePortal, effects: Vec<Effect>) -> Vec<Effect> {
    let mut timer_effects = Vec::new();
    let mut queue: VecDeque<Effect> = effects.into();
    while let Some(effect) = queue.pop_front() {
        match effect {
            Effect::Spawn(job) => {
                let event: NetEvent = job.run(api);
                queue.extend(state.on_net(event));
            }
            other => timer_effects.push(other),
        }
    }
    timer_effects
}

pub fn choice(id: u64, text: &str) -> Choice {
    Choice {
        id,
        text: text.to_string(),
        marked_correct: false,
    }
}

/// Quiz with `choice_questions` single-choice questions followed by one short answer.
pub fn quiz(choice_questions: u64, time_limit_minutes: Option<u32>) -> Quiz {
    let mut questions: Vec<Question> = (1..=choice_questions)
        .map(|n| Question {
            id: n,
            prompt: format!("Question **{}**", n),
            points: 1.0,
            kind: QuestionKind::SingleChoice(vec![
                choice(n * 10, "first"),
                choice(n * 10 + 1, "second"),
                choice(n * 10 + 2, "third"),
            ]),
        })
        .collect();
    questions.push(Question {
        id: 100,
        prompt: "Name the assembly point".to_string(),
        points: 2.0,
        kind: QuestionKind::ShortAnswer,
    });

    Quiz {
        id: 7,
        title: "Fire safety".to_string(),
        description: "Annual refresher.".to_string(),
        questions,
        time_limit_minutes,
        passing_score: 60.0,
        max_attempts: None,
    }
}

/// Loads the list, opens the quiz and starts an attempt without resolving the start request.
pub fn open_preamble(api: &FakePortal) -> AppState {
    let mut state = AppState::new(Some("Dana Learner".to_string()));
    let effects = state.load_assessments();
    drive(&mut state, api, effects);
    let effects = state.open_selected();
    drive(&mut state, api, effects);
    state
}
