use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use campus_core::model::Rating;

use crate::error::ObserverError;

//
// ─── EVENT ─────────────────────────────────────────────────────────────────────
//

/// Notification payload handed to observers after a rating is durably written.
///
/// `created` distinguishes a first-time rating from a revision of an existing
/// row; observers that only care about new ratings can filter on it.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingSaved {
    pub rating: Rating,
    pub created: bool,
}

//
// ─── OBSERVER ──────────────────────────────────────────────────────────────────
//

/// A unit of reaction logic invoked after a rating is saved.
#[async_trait]
pub trait RatingObserver: Send + Sync {
    /// Stable label used in logs when the observer fails.
    fn name(&self) -> &str;

    /// React to a saved rating.
    ///
    /// # Errors
    ///
    /// Returns `ObserverError` when the reaction fails; the dispatcher logs
    /// the failure and continues with the remaining observers.
    async fn on_rating_saved(&self, event: &RatingSaved) -> Result<(), ObserverError>;
}

//
// ─── DISPATCHER ────────────────────────────────────────────────────────────────
//

/// Invokes registered observers, in registration order, for each saved rating.
///
/// The observer list is assembled once at application start-up and the
/// dispatcher is then shared immutably (`Arc<RatingDispatcher>`); registration
/// is not supported after sharing, which keeps the list free of runtime
/// synchronization.
#[derive(Default)]
pub struct RatingDispatcher {
    observers: Vec<Arc<dyn RatingObserver>>,
}

impl RatingDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer. Registering the same instance twice is a no-op, so
    /// each observer runs at most once per dispatch.
    pub fn register(&mut self, observer: Arc<dyn RatingObserver>) {
        if self
            .observers
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &observer))
        {
            return;
        }
        self.observers.push(observer);
    }

    /// Remove an observer. Unknown instances are ignored.
    pub fn unregister(&mut self, observer: &Arc<dyn RatingObserver>) {
        self.observers
            .retain(|existing| !Arc::ptr_eq(existing, observer));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Invoke every observer with the saved rating, in registration order.
    ///
    /// An observer failure is logged and never aborts the remaining observers
    /// or surfaces to the caller of the save.
    pub async fn dispatch(&self, event: &RatingSaved) {
        debug!(
            observers = self.observers.len(),
            teacher = %event.rating.teacher_id(),
            student = %event.rating.student_id(),
            created = event.created,
            "dispatching rating notification"
        );

        for observer in &self.observers {
            if let Err(err) = observer.on_rating_saved(event).await {
                warn!(
                    observer = observer.name(),
                    error = %err,
                    "rating observer failed"
                );
            }
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
