use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::{PostId, TeacherId};

/// Minimum length for a post title, matching the editor form rules.
pub const MIN_TITLE_LEN: usize = 5;
/// Minimum length for post content.
pub const MIN_CONTENT_LEN: usize = 20;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum PostError {
    #[error("post title must have at least {MIN_TITLE_LEN} characters")]
    TitleTooShort,

    #[error("post content must have at least {MIN_CONTENT_LEN} characters")]
    ContentTooShort,

    #[error("reference url is not valid: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

//
// ─── BLOG POST ─────────────────────────────────────────────────────────────────
//

/// A blog entry published by a teacher.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogPost {
    id: PostId,
    teacher_id: TeacherId,
    title: String,
    content: String,
    reference_url: Option<Url>,
    created_at: DateTime<Utc>,
}

impl BlogPost {
    /// Creates a new post, validating title/content lengths and the optional
    /// reference URL.
    ///
    /// # Errors
    ///
    /// Returns `PostError::TitleTooShort` or `PostError::ContentTooShort` for
    /// undersized fields, `PostError::InvalidUrl` for a malformed URL.
    pub fn new(
        id: PostId,
        teacher_id: TeacherId,
        title: impl Into<String>,
        content: impl Into<String>,
        reference_url: Option<&str>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, PostError> {
        let title = title.into().trim().to_owned();
        if title.chars().count() < MIN_TITLE_LEN {
            return Err(PostError::TitleTooShort);
        }

        let content = content.into().trim().to_owned();
        if content.chars().count() < MIN_CONTENT_LEN {
            return Err(PostError::ContentTooShort);
        }

        let reference_url = reference_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(Url::parse)
            .transpose()?;

        Ok(Self {
            id,
            teacher_id,
            title,
            content,
            reference_url,
            created_at,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> PostId {
        self.id
    }

    #[must_use]
    pub fn teacher_id(&self) -> TeacherId {
        self.teacher_id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn reference_url(&self) -> Option<&Url> {
        self.reference_url.as_ref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn long_content() -> &'static str {
        "A walkthrough of equivalent fractions with worked examples."
    }

    #[test]
    fn post_rejects_short_title() {
        let err = BlogPost::new(
            PostId::new(1),
            TeacherId::new(1),
            "Hi",
            long_content(),
            None,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, PostError::TitleTooShort);
    }

    #[test]
    fn post_rejects_short_content() {
        let err = BlogPost::new(
            PostId::new(1),
            TeacherId::new(1),
            "Fractions revisited",
            "too short",
            None,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, PostError::ContentTooShort);
    }

    #[test]
    fn post_rejects_malformed_url() {
        let err = BlogPost::new(
            PostId::new(1),
            TeacherId::new(1),
            "Fractions revisited",
            long_content(),
            Some("not a url"),
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, PostError::InvalidUrl(_)));
    }

    #[test]
    fn post_accepts_valid_url_and_trims_fields() {
        let post = BlogPost::new(
            PostId::new(1),
            TeacherId::new(1),
            "  Fractions revisited  ",
            long_content(),
            Some("https://example.com/fractions"),
            fixed_now(),
        )
        .unwrap();

        assert_eq!(post.title(), "Fractions revisited");
        assert_eq!(
            post.reference_url().map(Url::as_str),
            Some("https://example.com/fractions")
        );
    }

    #[test]
    fn post_treats_blank_url_as_absent() {
        let post = BlogPost::new(
            PostId::new(1),
            TeacherId::new(1),
            "Fractions revisited",
            long_content(),
            Some("   "),
            fixed_now(),
        )
        .unwrap();

        assert_eq!(post.reference_url(), None);
    }
}
