use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type QuizId = u64;
pub type QuestionId = u64;
pub type OptionId = u64;
pub type CourseId = u64;
pub type MaterialId = u64;

/// Server-issued attempt identifier. Opaque to the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(pub String);

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub id: QuizId,
    pub title: String,
    pub description: String,
    pub questions: Vec<Question>,
    pub time_limit_minutes: Option<u32>,
    pub passing_score: f64,
    pub max_attempts: Option<u32>,
}

impl Quiz {
    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes.map(|m| u64::from(m) * 60)
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn total_points(&self) -> f64 {
        self.questions.iter().map(|q| q.points).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub id: QuestionId,
    pub prompt: String,
    pub points: f64,
    pub kind: QuestionKind,
}

impl Question {
    pub fn choices(&self) -> &[Choice] {
        match &self.kind {
            QuestionKind::SingleChoice(choices) | QuestionKind::TrueFalse(choices) => choices,
            QuestionKind::ShortAnswer => &[],
        }
    }

    pub fn is_choice(&self) -> bool {
        !matches!(self.kind, QuestionKind::ShortAnswer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    SingleChoice(Vec<Choice>),
    TrueFalse(Vec<Choice>),
    ShortAnswer,
}

impl QuestionKind {
    pub fn label(&self) -> &'static str {
        match self {
            QuestionKind::SingleChoice(_) => "single choice",
            QuestionKind::TrueFalse(_) => "true / false",
            QuestionKind::ShortAnswer => "short answer",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub id: OptionId,
    pub text: String,
    /// Carried by the payload but never used for scoring; grading is done by the portal.
    pub marked_correct: bool,
}

/// A learner's current response to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choice(OptionId),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub option_id: Option<OptionId>,
    pub answer_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentSummary {
    pub id: QuizId,
    pub title: String,
    pub course: Option<String>,
    pub time_limit_minutes: Option<u32>,
    pub question_count: usize,
    pub max_attempts: Option<u32>,
    pub attempts_used: u32,
    pub due: Option<DateTime<Utc>>,
}

impl AssessmentSummary {
    pub fn attempts_left(&self) -> Option<u32> {
        self.max_attempts
            .map(|max| max.saturating_sub(self.attempts_used))
    }

    pub fn can_start(&self) -> bool {
        self.attempts_left().map_or(true, |left| left > 0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub attempt_id: AttemptId,
    pub assessment_title: String,
    pub submitted_at: Option<DateTime<Utc>>,
    pub score: Option<f64>,
    pub passed: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitReceipt {
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub id: MaterialId,
    pub title: String,
    pub kind: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialBinary {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}
