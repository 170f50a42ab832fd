//! JSON shapes exchanged with the portal and their validation into the domain model.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::model::{
    AssessmentSummary, AttemptId, AttemptRecord, Choice, Material, Profile, Question,
    QuestionKind, Quiz, SubmitReceipt, SubmittedAnswer,
};

/// Responses arrive either bare or wrapped in `{"data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(inner) => inner,
        }
    }
}

/// Identifiers the portal sends as either numbers or strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(u64),
    Text(String),
}

impl From<WireId> for AttemptId {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Number(n) => AttemptId(n.to_string()),
            WireId::Text(s) => AttemptId(s),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuizDto {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub questions: Vec<QuestionDto>,
    #[serde(
        default,
        alias = "time_limit_minutes",
        alias = "timeLimit",
        alias = "timeLimitMinutes"
    )]
    pub time_limit: Option<u32>,
    #[serde(default, alias = "passingScore")]
    pub passing_score: Option<f64>,
    #[serde(default, alias = "maxAttempts")]
    pub max_attempts: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionDto {
    pub id: u64,
    #[serde(alias = "question_text", alias = "questionText", alias = "text")]
    pub prompt: String,
    #[serde(rename = "type", alias = "question_type", alias = "questionType")]
    pub question_type: String,
    #[serde(default)]
    pub points: Option<f64>,
    #[serde(default)]
    pub options: Vec<OptionDto>,
}

#[derive(Debug, Deserialize)]
pub struct OptionDto {
    pub id: u64,
    #[serde(alias = "option_text", alias = "optionText")]
    pub text: String,
    #[serde(default, alias = "isCorrect")]
    pub is_correct: bool,
}

impl TryFrom<QuizDto> for Quiz {
    type Error = Error;

    fn try_from(dto: QuizDto) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();
        let mut questions = Vec::with_capacity(dto.questions.len());
        for q in dto.questions {
            if !seen.insert(q.id) {
                return Err(Error::InvalidResponse(format!(
                    "quiz {} lists question {} twice",
                    dto.id, q.id
                )));
            }
            questions.push(Question::try_from(q)?);
        }

        Ok(Quiz {
            id: dto.id,
            title: dto.title,
            description: dto.description.unwrap_or_default(),
            questions,
            // A zero limit is how the portal spells "untimed".
            time_limit_minutes: dto.time_limit.filter(|&m| m > 0),
            passing_score: dto.passing_score.unwrap_or(0.0),
            max_attempts: dto.max_attempts.filter(|&m| m > 0),
        })
    }
}

impl TryFrom<QuestionDto> for Question {
    type Error = Error;

    fn try_from(dto: QuestionDto) -> Result<Self, Self::Error> {
        let kind = match dto.question_type.as_str() {
            "single_choice" | "multiple_choice" | "mcq" => {
                QuestionKind::SingleChoice(choices(dto.id, dto.options)?)
            }
            "true_false" => QuestionKind::TrueFalse(choices(dto.id, dto.options)?),
            "short_answer" | "text" => QuestionKind::ShortAnswer,
            other => {
                return Err(Error::InvalidResponse(format!(
                    "question {} has unknown type {:?}",
                    dto.id, other
                )))
            }
        };
        Ok(Question {
            id: dto.id,
            prompt: dto.prompt,
            points: dto.points.unwrap_or(1.0),
            kind,
        })
    }
}

fn choices(question: u64, options: Vec<OptionDto>) -> Result<Vec<Choice>, Error> {
    if options.is_empty() {
        return Err(Error::InvalidResponse(format!(
            "choice question {} has no options",
            question
        )));
    }
    let mut seen = HashSet::new();
    options
        .into_iter()
        .map(|o| {
            if !seen.insert(o.id) {
                return Err(Error::InvalidResponse(format!(
                    "question {} lists option {} twice",
                    question, o.id
                )));
            }
            Ok(Choice {
                id: o.id,
                text: o.text,
                marked_correct: o.is_correct,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
pub struct AssessmentDto {
    pub id: u64,
    pub title: String,
    #[serde(default, alias = "course_name", alias = "courseName")]
    pub course: Option<String>,
    #[serde(
        default,
        alias = "time_limit_minutes",
        alias = "timeLimit",
        alias = "timeLimitMinutes"
    )]
    pub time_limit: Option<u32>,
    #[serde(default, alias = "questionCount")]
    pub question_count: usize,
    #[serde(default, alias = "maxAttempts")]
    pub max_attempts: Option<u32>,
    #[serde(default, alias = "attemptsUsed")]
    pub attempts_used: u32,
    #[serde(default, alias = "due_date", alias = "dueDate")]
    pub due: Option<DateTime<Utc>>,
}

impl From<AssessmentDto> for AssessmentSummary {
    fn from(dto: AssessmentDto) -> Self {
        AssessmentSummary {
            id: dto.id,
            title: dto.title,
            course: dto.course,
            time_limit_minutes: dto.time_limit.filter(|&m| m > 0),
            question_count: dto.question_count,
            max_attempts: dto.max_attempts.filter(|&m| m > 0),
            attempts_used: dto.attempts_used,
            due: dto.due,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StartAttemptDto {
    #[serde(alias = "attemptId", alias = "id")]
    pub attempt_id: WireId,
}

#[derive(Debug, Serialize)]
pub struct SubmitRequest<'a> {
    pub answers: &'a [SubmittedAnswer],
}

#[derive(Debug, Default, Deserialize)]
pub struct SubmitResponseDto {
    #[serde(default)]
    pub message: Option<String>,
}

impl From<SubmitResponseDto> for SubmitReceipt {
    fn from(dto: SubmitResponseDto) -> Self {
        SubmitReceipt { message: dto.message }
    }
}

#[derive(Debug, Deserialize)]
pub struct AttemptRecordDto {
    #[serde(alias = "attemptId", alias = "id")]
    pub attempt_id: WireId,
    #[serde(
        alias = "assessmentTitle",
        alias = "title",
        alias = "quiz_title",
        alias = "quizTitle"
    )]
    pub assessment_title: String,
    #[serde(default, alias = "submittedAt")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub passed: Option<bool>,
}

impl From<AttemptRecordDto> for AttemptRecord {
    fn from(dto: AttemptRecordDto) -> Self {
        AttemptRecord {
            attempt_id: dto.attempt_id.into(),
            assessment_title: dto.assessment_title,
            submitted_at: dto.submitted_at,
            score: dto.score,
            passed: dto.passed,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MaterialDto {
    pub id: u64,
    pub title: String,
    #[serde(default, alias = "type", alias = "material_type", alias = "materialType")]
    pub kind: Option<String>,
    #[serde(default, alias = "fileName")]
    pub file_name: Option<String>,
}

impl From<MaterialDto> for Material {
    fn from(dto: MaterialDto) -> Self {
        Material {
            id: dto.id,
            title: dto.title,
            kind: dto.kind.unwrap_or_else(|| "document".to_string()),
            file_name: dto.file_name,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileDto {
    pub id: u64,
    #[serde(alias = "full_name", alias = "fullName")]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl From<ProfileDto> for Profile {
    fn from(dto: ProfileDto) -> Self {
        Profile {
            id: dto.id,
            name: dto.name,
            email: dto.email,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}
