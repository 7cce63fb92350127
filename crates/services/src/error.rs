//! Shared error types for the services crate.

use thiserror::Error;

use campus_core::model::{PostError, QuizError, QuizResultError, RatingError, SessionError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors an observer may report back to the dispatcher.
///
/// These never reach the caller of a rating save; the dispatcher records them
/// and moves on to the next observer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ObserverError {
    #[error("mail gateway is not configured")]
    Disabled,
    #[error("mail gateway request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `RatingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RatingServiceError {
    #[error(transparent)]
    Rating(#[from] RatingError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizTakingService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizTakingError {
    #[error("selected answer does not belong to the current question")]
    AnswerMismatch,
    #[error("quiz session is not finished")]
    NotFinished,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Result(#[from] QuizResultError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PostService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PostServiceError {
    #[error("post can only be modified by its author")]
    NotOwner,
    #[error(transparent)]
    Post(#[from] PostError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `EmbeddingService`.
///
/// Only the binary codec helpers surface these; `embed` itself degrades to
/// the local fallback instead of failing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EmbeddingError {
    #[error("embedding service is not configured")]
    Disabled,
    #[error("embedding request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("embedding response carried no vector")]
    EmptyResponse,
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Codec(#[from] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
