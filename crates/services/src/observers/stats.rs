use std::sync::Arc;

use async_trait::async_trait;

use storage::repository::{DirectoryRepository, RatingRepository};

use crate::error::ObserverError;
use crate::notify::{RatingObserver, RatingSaved};
use crate::rating_service::rounded_average;

/// Keeps the teacher profile's cached `average_rating` in step with the
/// ratings table.
pub struct AverageRatingObserver {
    ratings: Arc<dyn RatingRepository>,
    directory: Arc<dyn DirectoryRepository>,
}

impl AverageRatingObserver {
    #[must_use]
    pub fn new(
        ratings: Arc<dyn RatingRepository>,
        directory: Arc<dyn DirectoryRepository>,
    ) -> Self {
        Self { ratings, directory }
    }
}

#[async_trait]
impl RatingObserver for AverageRatingObserver {
    fn name(&self) -> &str {
        "average-rating"
    }

    async fn on_rating_saved(&self, event: &RatingSaved) -> Result<(), ObserverError> {
        let teacher_id = event.rating.teacher_id();
        let ratings = self.ratings.ratings_for_teacher(teacher_id).await?;

        // The dispatch runs after the save, so the list is never empty here;
        // guard anyway rather than write a bogus average.
        if let Some(average) = rounded_average(&ratings) {
            self.directory.set_average_rating(teacher_id, average).await?;
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::model::{Rating, RatingScore, StudentId, TeacherId};
    use campus_core::time::fixed_now;
    use storage::repository::{InMemoryRepository, NewTeacherRecord, StorageError};

    fn build_event(teacher: TeacherId, student: u64, score: u8) -> RatingSaved {
        RatingSaved {
            rating: Rating::new(
                teacher,
                StudentId::new(student),
                RatingScore::new(score).unwrap(),
                None,
                fixed_now(),
            ),
            created: true,
        }
    }

    #[tokio::test]
    async fn refreshes_cached_average_on_dispatch() {
        let repo = InMemoryRepository::new();
        let teacher = repo
            .insert_teacher(NewTeacherRecord {
                name: "Ana".into(),
                email: "ana@school.test".into(),
            })
            .await
            .unwrap();

        repo.upsert_rating(&build_event(teacher, 2, 5).rating)
            .await
            .unwrap();
        repo.upsert_rating(&build_event(teacher, 3, 4).rating)
            .await
            .unwrap();

        let observer =
            AverageRatingObserver::new(Arc::new(repo.clone()), Arc::new(repo.clone()));
        observer
            .on_rating_saved(&build_event(teacher, 3, 4))
            .await
            .unwrap();

        let profile = repo.get_teacher(teacher).await.unwrap().unwrap();
        assert_eq!(profile.average_rating(), Some(4.5));
    }

    #[tokio::test]
    async fn unknown_teacher_surfaces_storage_error() {
        let repo = InMemoryRepository::new();
        let ghost = TeacherId::new(404);
        repo.upsert_rating(&build_event(ghost, 2, 5).rating)
            .await
            .unwrap();

        let observer =
            AverageRatingObserver::new(Arc::new(repo.clone()), Arc::new(repo));
        let err = observer
            .on_rating_saved(&build_event(ghost, 2, 5))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ObserverError::Storage(StorageError::NotFound)
        ));
    }
}
