use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pulldown_cmark::{Parser, html};

use campus_core::model::{BlogPost, PostId, TeacherId};
use storage::repository::{NewPostRecord, PostRepository, StorageError};

use crate::Clock;
use crate::error::PostServiceError;

/// Window used for the "recent posts" statistic.
const RECENT_WINDOW_DAYS: i64 = 7;

/// Aggregate counters for the whole blog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogStats {
    pub total_posts: u64,
    /// Posts published within the last week.
    pub recent_posts: u64,
    /// Teachers ranked by post count, descending.
    pub top_teachers: Vec<(TeacherId, u64)>,
    pub generated_at: DateTime<Utc>,
}

/// Orchestrates the teacher blog: CRUD with ownership checks, listing,
/// search, statistics, and HTML rendering.
#[derive(Clone)]
pub struct PostService {
    clock: Clock,
    posts: Arc<dyn PostRepository>,
}

impl PostService {
    #[must_use]
    pub fn new(clock: Clock, posts: Arc<dyn PostRepository>) -> Self {
        Self { clock, posts }
    }

    /// Publish a new post for the given teacher.
    ///
    /// # Errors
    ///
    /// Returns `PostServiceError::Post` for validation failures.
    /// Returns `PostServiceError::Storage` if persistence fails.
    pub async fn publish(
        &self,
        teacher_id: TeacherId,
        title: String,
        content: String,
        reference_url: Option<&str>,
    ) -> Result<PostId, PostServiceError> {
        let now = self.clock.now();
        let post = BlogPost::new(PostId::new(1), teacher_id, title, content, reference_url, now)?;
        let post_id = self
            .posts
            .insert_new_post(NewPostRecord::from_post(&post))
            .await?;
        Ok(post_id)
    }

    /// Replace a post's title, content, and reference URL.
    ///
    /// Only the authoring teacher may edit; `created_at` is preserved.
    ///
    /// # Errors
    ///
    /// Returns `PostServiceError::NotOwner` when `editor` did not author the
    /// post, `PostServiceError::Post` for validation failures, and
    /// `PostServiceError::Storage` for missing posts or persistence failures.
    pub async fn edit(
        &self,
        editor: TeacherId,
        post_id: PostId,
        title: String,
        content: String,
        reference_url: Option<&str>,
    ) -> Result<BlogPost, PostServiceError> {
        let existing = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        if existing.teacher_id() != editor {
            return Err(PostServiceError::NotOwner);
        }

        let updated = BlogPost::new(
            post_id,
            existing.teacher_id(),
            title,
            content,
            reference_url,
            existing.created_at(),
        )?;
        self.posts.update_post(&updated).await?;
        Ok(updated)
    }

    /// Delete a post. Only the authoring teacher may delete.
    ///
    /// # Errors
    ///
    /// Returns `PostServiceError::NotOwner` when `editor` did not author the
    /// post, `PostServiceError::Storage` for missing posts.
    pub async fn remove(&self, editor: TeacherId, post_id: PostId) -> Result<(), PostServiceError> {
        let existing = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        if existing.teacher_id() != editor {
            return Err(PostServiceError::NotOwner);
        }

        self.posts.delete_post(post_id).await?;
        Ok(())
    }

    /// Fetch a post by ID.
    ///
    /// Returns `Ok(None)` when the post does not exist.
    ///
    /// # Errors
    ///
    /// Returns `PostServiceError::Storage` if repository access fails.
    pub async fn get(&self, post_id: PostId) -> Result<Option<BlogPost>, PostServiceError> {
        let post = self.posts.get_post(post_id).await?;
        Ok(post)
    }

    /// A teacher's posts, newest first, with limit/offset paging.
    ///
    /// # Errors
    ///
    /// Returns `PostServiceError::Storage` if repository access fails.
    pub async fn posts_for_teacher(
        &self,
        teacher_id: TeacherId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BlogPost>, PostServiceError> {
        let posts = self
            .posts
            .posts_for_teacher(teacher_id, limit, offset)
            .await?;
        Ok(posts)
    }

    /// Posts matching `query` in title or content, newest first.
    ///
    /// A blank query matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `PostServiceError::Storage` if repository access fails.
    pub async fn search(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<BlogPost>, PostServiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let posts = self.posts.search_posts(query, limit).await?;
        Ok(posts)
    }

    /// Blog-wide counters for the stats page.
    ///
    /// # Errors
    ///
    /// Returns `PostServiceError::Storage` if repository access fails.
    pub async fn stats(&self) -> Result<BlogStats, PostServiceError> {
        let now = self.clock.now();
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);

        Ok(BlogStats {
            total_posts: self.posts.count_posts().await?,
            recent_posts: self.posts.count_posts_since(cutoff).await?,
            top_teachers: self.posts.top_teachers(5).await?,
            generated_at: now,
        })
    }

    /// Render a post's markdown content to sanitized HTML.
    #[must_use]
    pub fn render_html(post: &BlogPost) -> String {
        let mut rendered = String::with_capacity(post.content().len() * 2);
        html::push_html(&mut rendered, Parser::new(post.content()));
        ammonia::clean(&rendered)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
