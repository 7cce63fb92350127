use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{AnswerId, QuestionId, QuizId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("question text cannot be empty")]
    EmptyQuestion,

    #[error("answer text cannot be empty")]
    EmptyAnswer,
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A titled collection of questions assigned to a class.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    id: QuizId,
    title: String,
    created_at: DateTime<Utc>,
}

impl Quiz {
    /// Creates a new quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTitle` if the title is empty or whitespace-only.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single question within a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    id: QuestionId,
    quiz_id: QuizId,
    text: String,
}

impl Question {
    /// Creates a new question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyQuestion` if the text is empty or whitespace-only.
    pub fn new(id: QuestionId, quiz_id: QuizId, text: impl Into<String>) -> Result<Self, QuizError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuizError::EmptyQuestion);
        }

        Ok(Self {
            id,
            quiz_id,
            text: text.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// A selectable answer for a question, flagged correct or not.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    id: AnswerId,
    question_id: QuestionId,
    text: String,
    is_correct: bool,
}

impl Answer {
    /// Creates a new answer choice.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyAnswer` if the text is empty or whitespace-only.
    pub fn new(
        id: AnswerId,
        question_id: QuestionId,
        text: impl Into<String>,
        is_correct: bool,
    ) -> Result<Self, QuizError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(QuizError::EmptyAnswer);
        }

        Ok(Self {
            id,
            question_id,
            text: text.trim().to_owned(),
            is_correct,
        })
    }

    #[must_use]
    pub fn id(&self) -> AnswerId {
        self.id
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.is_correct
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn quiz_rejects_empty_title() {
        let err = Quiz::new(QuizId::new(1), "   ", fixed_now()).unwrap_err();
        assert_eq!(err, QuizError::EmptyTitle);
    }

    #[test]
    fn quiz_trims_title() {
        let quiz = Quiz::new(QuizId::new(1), "  Fractions  ", fixed_now()).unwrap();
        assert_eq!(quiz.title(), "Fractions");
    }

    #[test]
    fn question_rejects_empty_text() {
        let err = Question::new(QuestionId::new(1), QuizId::new(1), "").unwrap_err();
        assert_eq!(err, QuizError::EmptyQuestion);
    }

    #[test]
    fn answer_keeps_correctness_flag() {
        let answer = Answer::new(AnswerId::new(1), QuestionId::new(1), "3/4", true).unwrap();
        assert!(answer.is_correct());
        assert_eq!(answer.text(), "3/4");

        let wrong = Answer::new(AnswerId::new(2), QuestionId::new(1), "4/3", false).unwrap();
        assert!(!wrong.is_correct());
    }
}
