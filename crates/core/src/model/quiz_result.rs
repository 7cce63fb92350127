use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{QuizId, StudentId};
use crate::scoring;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizResultError {
    #[error("correct answers ({correct}) exceed total questions ({total})")]
    CorrectExceedsTotal { correct: u32, total: u32 },
}

//
// ─── QUIZ RESULT ───────────────────────────────────────────────────────────────
//

/// Record of one completed quiz attempt by a student.
///
/// The percentage score is derived from the answer counts at construction so
/// the three fields can never disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    student_id: StudentId,
    quiz_id: QuizId,
    score: u8,
    total_questions: u32,
    correct_answers: u32,
    completed_at: DateTime<Utc>,
}

impl QuizResult {
    /// Builds a result from raw answer counts, computing the score.
    ///
    /// # Errors
    ///
    /// Returns `QuizResultError::CorrectExceedsTotal` when the counts are
    /// inconsistent.
    pub fn from_counts(
        student_id: StudentId,
        quiz_id: QuizId,
        correct_answers: u32,
        total_questions: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, QuizResultError> {
        if correct_answers > total_questions {
            return Err(QuizResultError::CorrectExceedsTotal {
                correct: correct_answers,
                total: total_questions,
            });
        }

        Ok(Self {
            student_id,
            quiz_id,
            score: scoring::percentage_score(correct_answers, total_questions),
            total_questions,
            correct_answers,
            completed_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    /// Percentage score in 0..=100.
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
