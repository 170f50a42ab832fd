use std::collections::HashMap;

use crate::error::AnswerError;
use crate::model::{Answer, Question, QuestionId, QuestionKind, Quiz, SubmittedAnswer};

/// In-memory responses for one attempt, keyed by question.
///
/// Writes overwrite (last write wins). A blank text answer clears the entry,
/// so an entry always means "answered".
#[derive(Debug, Clone, Default)]
pub struct AnswerBuffer {
    answers: HashMap<QuestionId, Answer>,
}

impl AnswerBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_answer(&mut self, question: &Question, answer: Answer) -> Result<(), AnswerError> {
        match (&question.kind, answer) {
            (QuestionKind::SingleChoice(choices) | QuestionKind::TrueFalse(choices), Answer::Choice(option)) => {
                if !choices.iter().any(|c| c.id == option) {
                    return Err(AnswerError::ForeignOption {
                        question: question.id,
                        option,
                    });
                }
                self.answers.insert(question.id, Answer::Choice(option));
            }
            (QuestionKind::ShortAnswer, Answer::Text(text)) => {
                if text.trim().is_empty() {
                    self.answers.remove(&question.id);
                } else {
                    self.answers.insert(question.id, Answer::Text(text));
                }
            }
            (QuestionKind::ShortAnswer, Answer::Choice(_)) => {
                return Err(AnswerError::ExpectedText(question.id));
            }
            (_, Answer::Text(_)) => {
                return Err(AnswerError::ExpectedOption(question.id));
            }
        }
        Ok(())
    }

    pub fn clear(&mut self, question_id: QuestionId) {
        self.answers.remove(&question_id);
    }

    pub fn get(&self, question_id: QuestionId) -> Option<&Answer> {
        self.answers.get(&question_id)
    }

    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.answers.contains_key(&question_id)
    }

    pub fn selected_option(&self, question_id: QuestionId) -> Option<u64> {
        match self.answers.get(&question_id) {
            Some(Answer::Choice(id)) => Some(*id),
            _ => None,
        }
    }

    pub fn text(&self, question_id: QuestionId) -> Option<&str> {
        match self.answers.get(&question_id) {
            Some(Answer::Text(t)) => Some(t.as_str()),
            _ => None,
        }
    }

    pub fn completed_count(&self) -> usize {
        self.answers.len()
    }

    /// Wire payload in quiz order. Unanswered questions are left out.
    pub fn to_submission(&self, quiz: &Quiz) -> Vec<SubmittedAnswer> {
        quiz.questions
            .iter()
            .filter_map(|q| {
                self.answers.get(&q.id).map(|answer| match answer {
                    Answer::Choice(option) => SubmittedAnswer {
                        question_id: q.id,
                        option_id: Some(*option),
                        answer_text: None,
                    },
                    Answer::Text(text) => SubmittedAnswer {
                        question_id: q.id,
                        option_id: None,
                        answer_text: Some(text.clone()),
                    },
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Choice;

    fn choice_question(id: u64, options: &[u64]) -> Question {
        Question {
            id,
            prompt: format!("Question {}", id),
            points: 1.0,
            kind: QuestionKind::SingleChoice(
                options
                    .iter()
                    .map(|&o| Choice {
                        id: o,
                        text: format!("option {}", o),
                        marked_correct: false,
                    })
                    .collect(),
            ),
        }
    }

    fn short_question(id: u64) -> Question {
        Question {
            id,
            prompt: "Explain".to_string(),
            points: 2.0,
            kind: QuestionKind::ShortAnswer,
        }
    }

    #[test]
    fn test_completed_count_counts_distinct_questions() {
        let q1 = choice_question(1, &[10, 11, 12]);
        let q2 = choice_question(2, &[20, 21]);
        let q3 = short_question(3);
        let mut buf = AnswerBuffer::new();

        let writes: Vec<(&Question, Answer)> = vec![
            (&q1, Answer::Choice(10)),
            (&q1, Answer::Choice(11)),
            (&q2, Answer::Choice(21)),
            (&q1, Answer::Choice(12)),
            (&q3, Answer::Text("ownership".into())),
            (&q3, Answer::Text("borrowing".into())),
            (&q2, Answer::Choice(20)),
        ];
        for (q, a) in writes {
            buf.set_answer(q, a).unwrap();
        }

        assert_eq!(buf.completed_count(), 3);
        assert_eq!(buf.selected_option(1), Some(12));
        assert_eq!(buf.selected_option(2), Some(20));
        assert_eq!(buf.text(3), Some("borrowing"));
    }

    #[test]
    fn test_shape_must_match_question_type() {
        let q1 = choice_question(1, &[10]);
        let q3 = short_question(3);
        let mut buf = AnswerBuffer::new();

        assert_eq!(
            buf.set_answer(&q1, Answer::Text("x".into())),
            Err(AnswerError::ExpectedOption(1))
        );
        assert_eq!(
            buf.set_answer(&q3, Answer::Choice(10)),
            Err(AnswerError::ExpectedText(3))
        );
        assert_eq!(
            buf.set_answer(&q1, Answer::Choice(99)),
            Err(AnswerError::ForeignOption { question: 1, option: 99 })
        );
        assert_eq!(buf.completed_count(), 0);
    }

    #[test]
    fn test_blank_text_clears_entry() {
        let q = short_question(7);
        let mut buf = AnswerBuffer::new();
        buf.set_answer(&q, Answer::Text("draft".into())).unwrap();
        assert!(buf.is_answered(7));
        buf.set_answer(&q, Answer::Text("   ".into())).unwrap();
        assert!(!buf.is_answered(7));
    }

    #[test]
    fn test_submission_keeps_quiz_order_and_omits_unanswered() {
        let quiz = Quiz {
            id: 1,
            title: "Safety".into(),
            description: String::new(),
            questions: vec![
                choice_question(5, &[50, 51]),
                short_question(6),
                choice_question(7, &[70, 71]),
            ],
            time_limit_minutes: None,
            passing_score: 50.0,
            max_attempts: None,
        };
        let mut buf = AnswerBuffer::new();
        buf.set_answer(&quiz.questions[2], Answer::Choice(71)).unwrap();
        buf.set_answer(&quiz.questions[0], Answer::Choice(50)).unwrap();

        let payload = buf.to_submission(&quiz);
        assert_eq!(
            payload,
            vec![
                SubmittedAnswer { question_id: 5, option_id: Some(50), answer_text: None },
                SubmittedAnswer { question_id: 7, option_id: Some(71), answer_text: None },
            ]
        );
    }
}
