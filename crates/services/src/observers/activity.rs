use async_trait::async_trait;
use tracing::info;

use crate::error::ObserverError;
use crate::notify::{RatingObserver, RatingSaved};

/// Records every saved rating as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActivityLogObserver;

impl ActivityLogObserver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RatingObserver for ActivityLogObserver {
    fn name(&self) -> &str {
        "activity-log"
    }

    async fn on_rating_saved(&self, event: &RatingSaved) -> Result<(), ObserverError> {
        info!(
            teacher = %event.rating.teacher_id(),
            student = %event.rating.student_id(),
            score = event.rating.score().value(),
            created = event.created,
            "rating saved"
        );
        Ok(())
    }
}
