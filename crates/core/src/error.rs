use thiserror::Error;

use crate::model::{PostError, ProfileError, QuizError, QuizResultError, RatingError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    QuizResult(#[from] QuizResultError),
    #[error(transparent)]
    Post(#[from] PostError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
}
