use std::sync::Arc;

use storage::repository::{DirectoryRepository, Storage};

use crate::Clock;
use crate::embedding::EmbeddingService;
use crate::error::AppServicesError;
use crate::notify::RatingDispatcher;
use crate::observers::{ActivityLogObserver, AverageRatingObserver, EmailRatingObserver};
use crate::post_service::PostService;
use crate::quiz_service::QuizService;
use crate::quiz_taking::QuizTakingService;
use crate::rating_service::RatingService;

/// Assembles app-facing services over a storage backend.
///
/// The rating dispatcher is built here, once, with the default observers
/// registered in a fixed order (email, statistics, activity log) before it is
/// shared; nothing mutates the observer list afterwards.
#[derive(Clone)]
pub struct AppServices {
    directory: Arc<dyn DirectoryRepository>,
    rating_service: Arc<RatingService>,
    quiz_service: Arc<QuizService>,
    quiz_taking: Arc<QuizTakingService>,
    post_service: Arc<PostService>,
    embeddings: Arc<EmbeddingService>,
    dispatcher: Arc<RatingDispatcher>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(&storage, clock))
    }

    /// Build services over an already-initialized storage backend.
    #[must_use]
    pub fn with_storage(storage: &Storage, clock: Clock) -> Self {
        let mut dispatcher = RatingDispatcher::new();
        dispatcher.register(Arc::new(EmailRatingObserver::from_env(Arc::clone(
            &storage.directory,
        ))));
        dispatcher.register(Arc::new(AverageRatingObserver::new(
            Arc::clone(&storage.ratings),
            Arc::clone(&storage.directory),
        )));
        dispatcher.register(Arc::new(ActivityLogObserver::new()));
        let dispatcher = Arc::new(dispatcher);

        let rating_service = Arc::new(RatingService::new(
            clock,
            Arc::clone(&storage.ratings),
            Arc::clone(&dispatcher),
        ));
        let quiz_service = Arc::new(QuizService::new(clock, Arc::clone(&storage.quizzes)));
        let quiz_taking = Arc::new(QuizTakingService::new(
            clock,
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.quiz_results),
        ));
        let post_service = Arc::new(PostService::new(clock, Arc::clone(&storage.posts)));
        let embeddings = Arc::new(EmbeddingService::from_env());

        Self {
            directory: Arc::clone(&storage.directory),
            rating_service,
            quiz_service,
            quiz_taking,
            post_service,
            embeddings,
            dispatcher,
        }
    }

    #[must_use]
    pub fn directory(&self) -> Arc<dyn DirectoryRepository> {
        Arc::clone(&self.directory)
    }

    #[must_use]
    pub fn rating_service(&self) -> Arc<RatingService> {
        Arc::clone(&self.rating_service)
    }

    #[must_use]
    pub fn quiz_service(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz_service)
    }

    #[must_use]
    pub fn quiz_taking(&self) -> Arc<QuizTakingService> {
        Arc::clone(&self.quiz_taking)
    }

    #[must_use]
    pub fn post_service(&self) -> Arc<PostService> {
        Arc::clone(&self.post_service)
    }

    #[must_use]
    pub fn embeddings(&self) -> Arc<EmbeddingService> {
        Arc::clone(&self.embeddings)
    }

    /// Number of observers wired into the rating dispatcher.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.dispatcher.len()
    }
}
