use campus_core::model::{BlogPost, PostId, TeacherId};
use chrono::{DateTime, Utc};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_post_row, post_id_from_i64, ser, teacher_id_from_i64};
use crate::repository::{NewPostRecord, PostRepository, StorageError};

#[async_trait::async_trait]
impl PostRepository for SqliteRepository {
    async fn insert_new_post(&self, post: NewPostRecord) -> Result<PostId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO posts (teacher_id, title, content, reference_url, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(id_to_i64("teacher_id", post.teacher_id.value())?)
        .bind(post.title)
        .bind(post.content)
        .bind(post.reference_url)
        .bind(post.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        post_id_from_i64(res.last_insert_rowid())
    }

    async fn update_post(&self, post: &BlogPost) -> Result<(), StorageError> {
        let res = sqlx::query(
            r"
            UPDATE posts
            SET title = ?1, content = ?2, reference_url = ?3
            WHERE id = ?4
            ",
        )
        .bind(post.title().to_owned())
        .bind(post.content().to_owned())
        .bind(post.reference_url().map(ToString::to_string))
        .bind(id_to_i64("post_id", post.id().value())?)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM posts WHERE id = ?1")
            .bind(id_to_i64("post_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_post(&self, id: PostId) -> Result<Option<BlogPost>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, teacher_id, title, content, reference_url, created_at
            FROM posts WHERE id = ?1
            ",
        )
        .bind(id_to_i64("post_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_post_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn posts_for_teacher(
        &self,
        teacher_id: TeacherId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BlogPost>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, teacher_id, title, content, reference_url, created_at
            FROM posts
            WHERE teacher_id = ?1
            ORDER BY created_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            ",
        )
        .bind(id_to_i64("teacher_id", teacher_id.value())?)
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            posts.push(map_post_row(&row)?);
        }
        Ok(posts)
    }

    async fn search_posts(&self, query: &str, limit: u32) -> Result<Vec<BlogPost>, StorageError> {
        // LIKE is case-insensitive for ASCII in SQLite, matching the
        // icontains semantics the blog listing expects.
        let pattern = format!("%{}%", query.replace('%', r"\%").replace('_', r"\_"));

        let rows = sqlx::query(
            r"
            SELECT id, teacher_id, title, content, reference_url, created_at
            FROM posts
            WHERE title LIKE ?1 ESCAPE '\' OR content LIKE ?1 ESCAPE '\'
            ORDER BY created_at DESC, id DESC
            LIMIT ?2
            ",
        )
        .bind(pattern)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut posts = Vec::with_capacity(rows.len());
        for row in rows {
            posts.push(map_post_row(&row)?);
        }
        Ok(posts)
    }

    async fn count_posts(&self) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let n: i64 = row.try_get("n").map_err(ser)?;
        u64::try_from(n).map_err(|_| ser("negative post count"))
    }

    async fn count_posts_since(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM posts WHERE created_at >= ?1")
            .bind(cutoff)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let n: i64 = row.try_get("n").map_err(ser)?;
        u64::try_from(n).map_err(|_| ser("negative post count"))
    }

    async fn top_teachers(&self, limit: u32) -> Result<Vec<(TeacherId, u64)>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT teacher_id, COUNT(*) AS n
            FROM posts
            GROUP BY teacher_id
            ORDER BY n DESC, teacher_id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ranked = Vec::with_capacity(rows.len());
        for row in rows {
            let teacher = teacher_id_from_i64(row.try_get::<i64, _>("teacher_id").map_err(ser)?)?;
            let n: i64 = row.try_get("n").map_err(ser)?;
            ranked.push((teacher, u64::try_from(n).map_err(|_| ser("negative post count"))?));
        }
        Ok(ranked)
    }
}
