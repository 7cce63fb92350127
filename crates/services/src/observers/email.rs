use std::env;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use storage::repository::{DirectoryRepository, StorageError};

use crate::error::ObserverError;
use crate::notify::{RatingObserver, RatingSaved};

#[derive(Clone, Debug)]
pub struct MailGatewayConfig {
    pub base_url: String,
    pub api_key: String,
    pub from_address: String,
}

impl MailGatewayConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("CAMPUS_MAIL_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("CAMPUS_MAIL_BASE_URL")
            .unwrap_or_else(|_| "https://mail.campus.internal/v1".into());
        let from_address =
            env::var("CAMPUS_MAIL_FROM").unwrap_or_else(|_| "no-reply@campus.internal".into());
        Some(Self {
            base_url,
            api_key,
            from_address,
        })
    }
}

/// Emails the rated teacher through an HTTP mail gateway.
///
/// Registered unconditionally at start-up; when the gateway is not configured
/// each dispatch reports `ObserverError::Disabled`, which the dispatcher logs
/// without disturbing the other observers.
pub struct EmailRatingObserver {
    client: Client,
    config: Option<MailGatewayConfig>,
    directory: Arc<dyn DirectoryRepository>,
}

impl EmailRatingObserver {
    #[must_use]
    pub fn from_env(directory: Arc<dyn DirectoryRepository>) -> Self {
        Self::new(MailGatewayConfig::from_env(), directory)
    }

    #[must_use]
    pub fn new(config: Option<MailGatewayConfig>, directory: Arc<dyn DirectoryRepository>) -> Self {
        Self {
            client: Client::new(),
            config,
            directory,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl RatingObserver for EmailRatingObserver {
    fn name(&self) -> &str {
        "email-notification"
    }

    async fn on_rating_saved(&self, event: &RatingSaved) -> Result<(), ObserverError> {
        let config = self.config.as_ref().ok_or(ObserverError::Disabled)?;

        let teacher = self
            .directory
            .get_teacher(event.rating.teacher_id())
            .await?
            .ok_or(StorageError::NotFound)?;
        let student = self
            .directory
            .get_student(event.rating.student_id())
            .await?
            .ok_or(StorageError::NotFound)?;

        let subject = if event.created {
            format!("New rating received - {}", event.rating.score())
        } else {
            format!("Updated rating received - {}", event.rating.score())
        };
        let body = format!(
            "Hello {},\n\n\
             {} rated you {}.\n\
             Comment: {}\n\n\
             Keep up the great teaching!",
            teacher.name(),
            student.name(),
            event.rating.score(),
            event.rating.comment().unwrap_or("(none)"),
        );

        let url = format!("{}/messages", config.base_url.trim_end_matches('/'));
        let payload = MailMessage {
            from: config.from_address.clone(),
            to: teacher.email().to_owned(),
            subject,
            body,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ObserverError::HttpStatus(response.status()));
        }

        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct MailMessage {
    from: String,
    to: String,
    subject: String,
    body: String,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
