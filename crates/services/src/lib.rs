#![forbid(unsafe_code)]

pub mod app_services;
pub mod embedding;
pub mod error;
pub mod notify;
pub mod observers;
pub mod post_service;
pub mod quiz_service;
pub mod quiz_taking;
pub mod rating_service;

pub use campus_core::Clock;

pub use app_services::AppServices;
pub use embedding::{EmbeddingService, cosine_similarity, local_embedding};
pub use error::{
    AppServicesError, EmbeddingError, ObserverError, PostServiceError, QuizServiceError,
    QuizTakingError, RatingServiceError,
};
pub use notify::{RatingDispatcher, RatingObserver, RatingSaved};
pub use post_service::{BlogStats, PostService};
pub use quiz_service::QuizService;
pub use quiz_taking::{AnswerOutcome, QuizTakingService};
pub use rating_service::RatingService;
