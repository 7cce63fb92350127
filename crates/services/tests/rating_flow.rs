use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use campus_core::time::fixed_clock;
use services::{
    AppServices, Clock, ObserverError, RatingDispatcher, RatingObserver, RatingSaved,
    RatingService,
};
use storage::repository::{
    DirectoryRepository, InMemoryRepository, NewTeacherRecord, RatingRepository, Storage,
};

struct CountingObserver {
    calls: AtomicUsize,
    last_created: std::sync::Mutex<Option<bool>>,
}

impl CountingObserver {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_created: std::sync::Mutex::new(None),
        })
    }
}

#[async_trait]
impl RatingObserver for CountingObserver {
    fn name(&self) -> &str {
        "counting"
    }

    async fn on_rating_saved(&self, event: &RatingSaved) -> Result<(), ObserverError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_created.lock().unwrap() = Some(event.created);
        Ok(())
    }
}

struct FailingObserver;

#[async_trait]
impl RatingObserver for FailingObserver {
    fn name(&self) -> &str {
        "always-failing"
    }

    async fn on_rating_saved(&self, _event: &RatingSaved) -> Result<(), ObserverError> {
        Err(ObserverError::Disabled)
    }
}

#[tokio::test]
async fn revising_a_rating_keeps_one_row_and_still_dispatches() {
    let repo = InMemoryRepository::new();
    let teacher = repo
        .insert_teacher(NewTeacherRecord {
            name: "Ana".into(),
            email: "ana@school.test".into(),
        })
        .await
        .unwrap();
    let student = repo.insert_student("Luis".into()).await.unwrap();

    let observer = CountingObserver::new();
    let mut dispatcher = RatingDispatcher::new();
    dispatcher.register(observer.clone());

    let service = RatingService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(dispatcher),
    );

    let first = service.rate_teacher(teacher, student, 3, None).await.unwrap();
    assert!(first.created);
    assert_eq!(observer.calls.load(Ordering::SeqCst), 1);

    let second = service
        .rate_teacher(teacher, student, 5, Some("improved a lot".into()))
        .await
        .unwrap();
    assert!(!second.created);

    // Dispatch fired for the update too, and the row was revised in place.
    assert_eq!(observer.calls.load(Ordering::SeqCst), 2);
    assert_eq!(*observer.last_created.lock().unwrap(), Some(false));

    let rows = repo.ratings_for_teacher(teacher).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].score().value(), 5);
}

#[tokio::test]
async fn failing_observer_neither_blocks_others_nor_the_save() {
    let repo = InMemoryRepository::new();
    let teacher = repo
        .insert_teacher(NewTeacherRecord {
            name: "Ana".into(),
            email: "ana@school.test".into(),
        })
        .await
        .unwrap();
    let student = repo.insert_student("Luis".into()).await.unwrap();

    let observer = CountingObserver::new();
    let mut dispatcher = RatingDispatcher::new();
    dispatcher.register(Arc::new(FailingObserver));
    dispatcher.register(observer.clone());

    let service = RatingService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(dispatcher),
    );

    let saved = service.rate_teacher(teacher, student, 4, None).await.unwrap();
    assert!(saved.created);
    assert_eq!(observer.calls.load(Ordering::SeqCst), 1);

    let rows = repo.ratings_for_teacher(teacher).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn app_services_refresh_the_cached_average_on_save() {
    let storage = Storage::in_memory();
    let services = AppServices::with_storage(&storage, Clock::default_clock());

    let teacher = storage
        .directory
        .insert_teacher(NewTeacherRecord {
            name: "Ana".into(),
            email: "ana@school.test".into(),
        })
        .await
        .unwrap();
    let first = storage.directory.insert_student("Luis".into()).await.unwrap();
    let second = storage.directory.insert_student("Mara".into()).await.unwrap();

    let ratings = services.rating_service();
    ratings.rate_teacher(teacher, first, 5, None).await.unwrap();
    ratings.rate_teacher(teacher, second, 4, None).await.unwrap();

    let profile = storage.directory.get_teacher(teacher).await.unwrap().unwrap();
    assert_eq!(profile.average_rating(), Some(4.5));

    assert_eq!(ratings.teacher_average(teacher).await.unwrap(), Some(4.5));
}
