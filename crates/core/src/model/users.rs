use thiserror::Error;

use crate::model::ids::{StudentId, TeacherId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("display name cannot be empty")]
    EmptyName,

    #[error("email address is not plausible: {0}")]
    InvalidEmail(String),
}

//
// ─── TEACHER PROFILE ───────────────────────────────────────────────────────────
//

/// Directory entry for a teacher, carrying the cached rating average.
///
/// `average_rating` is denormalized; the statistics observer refreshes it
/// whenever a rating for the teacher is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct TeacherProfile {
    id: TeacherId,
    name: String,
    email: String,
    average_rating: Option<f64>,
}

impl TeacherProfile {
    /// Creates a teacher profile.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::EmptyName` for a blank name and
    /// `ProfileError::InvalidEmail` when the address has no `@`.
    pub fn new(
        id: TeacherId,
        name: impl Into<String>,
        email: impl Into<String>,
        average_rating: Option<f64>,
    ) -> Result<Self, ProfileError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }

        let email = email.into().trim().to_owned();
        if !email.contains('@') {
            return Err(ProfileError::InvalidEmail(email));
        }

        Ok(Self {
            id,
            name: name.trim().to_owned(),
            email,
            average_rating,
        })
    }

    #[must_use]
    pub fn id(&self) -> TeacherId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Cached mean of received scores, `None` until first rated.
    #[must_use]
    pub fn average_rating(&self) -> Option<f64> {
        self.average_rating
    }
}

//
// ─── STUDENT ───────────────────────────────────────────────────────────────────
//

/// Directory entry for a student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Student {
    id: StudentId,
    name: String,
}

impl Student {
    /// Creates a student entry.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::EmptyName` for a blank name.
    pub fn new(id: StudentId, name: impl Into<String>) -> Result<Self, ProfileError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ProfileError::EmptyName);
        }

        Ok(Self {
            id,
            name: name.trim().to_owned(),
        })
    }

    #[must_use]
    pub fn id(&self) -> StudentId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
