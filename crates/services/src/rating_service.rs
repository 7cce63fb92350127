use std::sync::Arc;

use campus_core::model::{Rating, RatingScore, StudentId, TeacherId};
use storage::repository::RatingRepository;

use crate::Clock;
use crate::error::RatingServiceError;
use crate::notify::{RatingDispatcher, RatingSaved};

/// Mean of the given scores, rounded to two decimal places.
///
/// Returns `None` for an empty slice so an unrated teacher stays unrated
/// instead of showing 0.0.
#[must_use]
pub fn rounded_average(ratings: &[Rating]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }

    let sum: u32 = ratings.iter().map(|r| u32::from(r.score().value())).sum();

    #[allow(clippy::cast_precision_loss)]
    let mean = f64::from(sum) / ratings.len() as f64;
    Some((mean * 100.0).round() / 100.0)
}

/// Coordinates saving a rating and notifying registered observers.
///
/// The dispatcher is handed in at construction; the service never mutates it,
/// so the observer list stays fixed after start-up.
pub struct RatingService {
    clock: Clock,
    ratings: Arc<dyn RatingRepository>,
    dispatcher: Arc<RatingDispatcher>,
}

impl RatingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        ratings: Arc<dyn RatingRepository>,
        dispatcher: Arc<RatingDispatcher>,
    ) -> Self {
        Self {
            clock,
            ratings,
            dispatcher,
        }
    }

    /// Save a student's rating of a teacher and notify observers.
    ///
    /// A second rating from the same student for the same teacher revises the
    /// existing row in place. Observers run for both the insert and the
    /// revision, after persistence completes; their failures are logged by the
    /// dispatcher and never surface here.
    ///
    /// # Errors
    ///
    /// Returns `RatingServiceError::Rating` for a score outside 1..=5.
    /// Returns `RatingServiceError::Storage` if persistence fails; no
    /// observers run in that case.
    pub async fn rate_teacher(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
        score: u8,
        comment: Option<String>,
    ) -> Result<RatingSaved, RatingServiceError> {
        let score = RatingScore::new(score)?;
        let rating = Rating::new(teacher_id, student_id, score, comment, self.clock.now());

        let saved = self.ratings.upsert_rating(&rating).await?;
        let event = RatingSaved {
            rating: saved.rating,
            created: saved.created,
        };

        self.dispatcher.dispatch(&event).await;
        Ok(event)
    }

    /// The rating a student gave a teacher, if any.
    ///
    /// # Errors
    ///
    /// Returns `RatingServiceError::Storage` if repository access fails.
    pub async fn rating_for(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
    ) -> Result<Option<Rating>, RatingServiceError> {
        let rating = self.ratings.get_rating(teacher_id, student_id).await?;
        Ok(rating)
    }

    /// Every rating a teacher has received, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RatingServiceError::Storage` if repository access fails.
    pub async fn ratings_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<Rating>, RatingServiceError> {
        let ratings = self.ratings.ratings_for_teacher(teacher_id).await?;
        Ok(ratings)
    }

    /// Mean received score rounded to two decimals, `None` when unrated.
    ///
    /// # Errors
    ///
    /// Returns `RatingServiceError::Storage` if repository access fails.
    pub async fn teacher_average(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Option<f64>, RatingServiceError> {
        let ratings = self.ratings.ratings_for_teacher(teacher_id).await?;
        Ok(rounded_average(&ratings))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::model::RatingError;
    use campus_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryRepository;

    fn build_service(repo: InMemoryRepository) -> RatingService {
        RatingService::new(
            fixed_clock(),
            Arc::new(repo),
            Arc::new(RatingDispatcher::new()),
        )
    }

    fn build_rating(score: u8) -> Rating {
        Rating::new(
            TeacherId::new(1),
            StudentId::new(2),
            RatingScore::new(score).unwrap(),
            None,
            fixed_now(),
        )
    }

    #[tokio::test]
    async fn rate_teacher_persists_and_reports_creation() {
        let service = build_service(InMemoryRepository::new());

        let saved = service
            .rate_teacher(TeacherId::new(1), StudentId::new(2), 4, Some("solid".into()))
            .await
            .unwrap();

        assert!(saved.created);
        assert_eq!(saved.rating.score().value(), 4);
        assert_eq!(saved.rating.comment(), Some("solid"));

        let stored = service
            .rating_for(TeacherId::new(1), StudentId::new(2))
            .await
            .unwrap();
        assert_eq!(stored, Some(saved.rating));
    }

    #[tokio::test]
    async fn second_rating_from_same_student_revises_in_place() {
        let service = build_service(InMemoryRepository::new());

        service
            .rate_teacher(TeacherId::new(1), StudentId::new(2), 2, None)
            .await
            .unwrap();
        let saved = service
            .rate_teacher(TeacherId::new(1), StudentId::new(2), 5, None)
            .await
            .unwrap();

        assert!(!saved.created);
        let all = service.ratings_for_teacher(TeacherId::new(1)).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].score().value(), 5);
    }

    #[tokio::test]
    async fn out_of_range_score_is_rejected_before_storage() {
        let service = build_service(InMemoryRepository::new());

        let err = service
            .rate_teacher(TeacherId::new(1), StudentId::new(2), 9, None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RatingServiceError::Rating(RatingError::ScoreOutOfRange(9))
        ));
        let all = service.ratings_for_teacher(TeacherId::new(1)).await.unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn rounded_average_handles_empty_and_rounds() {
        assert_eq!(rounded_average(&[]), None);

        let ratings = vec![build_rating(5), build_rating(4), build_rating(4)];
        assert_eq!(rounded_average(&ratings), Some(4.33));
    }

    #[tokio::test]
    async fn teacher_average_reflects_stored_ratings() {
        let repo = InMemoryRepository::new();
        let service = RatingService::new(
            fixed_clock(),
            Arc::new(repo),
            Arc::new(RatingDispatcher::new()),
        );

        assert_eq!(service.teacher_average(TeacherId::new(1)).await.unwrap(), None);

        service
            .rate_teacher(TeacherId::new(1), StudentId::new(2), 5, None)
            .await
            .unwrap();
        service
            .rate_teacher(TeacherId::new(1), StudentId::new(3), 4, None)
            .await
            .unwrap();

        assert_eq!(
            service.teacher_average(TeacherId::new(1)).await.unwrap(),
            Some(4.5)
        );
    }
}
