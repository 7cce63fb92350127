use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{StudentId, TeacherId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors that can occur when building a rating.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RatingError {
    #[error("rating score must be between 1 and 5, got {0}")]
    ScoreOutOfRange(u8),
}

//
// ─── RATING SCORE ──────────────────────────────────────────────────────────────
//

/// Star score a student gives a teacher, constrained to 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RatingScore(u8);

impl RatingScore {
    /// Converts a raw numeric score into a `RatingScore`.
    ///
    /// # Errors
    ///
    /// Returns `RatingError::ScoreOutOfRange` if the value is not in 1..=5.
    pub fn new(value: u8) -> Result<Self, RatingError> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::ScoreOutOfRange(value))
        }
    }

    /// Returns the underlying star count.
    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for RatingScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/5", self.0)
    }
}

//
// ─── RATING ────────────────────────────────────────────────────────────────────
//

/// A student's rating of a teacher.
///
/// At most one rating exists per (teacher, student) pair; saving again for the
/// same pair replaces the score and comment while keeping `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct Rating {
    teacher_id: TeacherId,
    student_id: StudentId,
    score: RatingScore,
    comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl Rating {
    /// Creates a new rating with a trimmed, optional comment.
    #[must_use]
    pub fn new(
        teacher_id: TeacherId,
        student_id: StudentId,
        score: RatingScore,
        comment: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let comment = comment
            .map(|c| c.trim().to_owned())
            .filter(|c| !c.is_empty());

        Self {
            teacher_id,
            student_id,
            score,
            comment,
            created_at,
        }
    }

    // Accessors
    #[must_use]
    pub fn teacher_id(&self) -> TeacherId {
        self.teacher_id
    }

    #[must_use]
    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    #[must_use]
    pub fn score(&self) -> RatingScore {
        self.score
    }

    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns a copy carrying a new score and comment, keeping identity and
    /// `created_at` from the original row.
    #[must_use]
    pub fn with_revision(&self, score: RatingScore, comment: Option<String>) -> Self {
        Self::new(
            self.teacher_id,
            self.student_id,
            score,
            comment,
            self.created_at,
        )
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
