mod activity;
mod email;
mod stats;

pub use activity::ActivityLogObserver;
pub use email::{EmailRatingObserver, MailGatewayConfig};
pub use stats::AverageRatingObserver;
