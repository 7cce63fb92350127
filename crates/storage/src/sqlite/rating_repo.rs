use campus_core::model::{Rating, StudentId, TeacherId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_rating_row, ser};
use crate::repository::{RatingRepository, SavedRating, StorageError};

#[async_trait::async_trait]
impl RatingRepository for SqliteRepository {
    async fn upsert_rating(&self, rating: &Rating) -> Result<SavedRating, StorageError> {
        let teacher_id = id_to_i64("teacher_id", rating.teacher_id().value())?;
        let student_id = id_to_i64("student_id", rating.student_id().value())?;
        let score = i64::from(rating.score().value());
        let comment = rating.comment().map(str::to_owned);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        let existing = sqlx::query(
            r"
            SELECT id, created_at FROM ratings
            WHERE teacher_id = ?1 AND student_id = ?2
            ",
        )
        .bind(teacher_id)
        .bind(student_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let saved = match existing {
            Some(row) => {
                let row_id: i64 = row.try_get("id").map_err(ser)?;
                let created_at: chrono::DateTime<chrono::Utc> =
                    row.try_get("created_at").map_err(ser)?;

                sqlx::query("UPDATE ratings SET score = ?1, comment = ?2 WHERE id = ?3")
                    .bind(score)
                    .bind(comment.clone())
                    .bind(row_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| StorageError::Connection(e.to_string()))?;

                SavedRating {
                    rating: Rating::new(
                        rating.teacher_id(),
                        rating.student_id(),
                        rating.score(),
                        comment,
                        created_at,
                    ),
                    created: false,
                }
            }
            None => {
                sqlx::query(
                    r"
                    INSERT INTO ratings (teacher_id, student_id, score, comment, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    ",
                )
                .bind(teacher_id)
                .bind(student_id)
                .bind(score)
                .bind(comment)
                .bind(rating.created_at())
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::Connection(e.to_string()))?;

                SavedRating {
                    rating: rating.clone(),
                    created: true,
                }
            }
        };

        tx.commit()
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(saved)
    }

    async fn get_rating(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
    ) -> Result<Option<Rating>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT teacher_id, student_id, score, comment, created_at
            FROM ratings
            WHERE teacher_id = ?1 AND student_id = ?2
            ",
        )
        .bind(id_to_i64("teacher_id", teacher_id.value())?)
        .bind(id_to_i64("student_id", student_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_rating_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn ratings_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<Rating>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT teacher_id, student_id, score, comment, created_at
            FROM ratings
            WHERE teacher_id = ?1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(id_to_i64("teacher_id", teacher_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut ratings = Vec::with_capacity(rows.len());
        for row in rows {
            ratings.push(map_rating_row(&row)?);
        }
        Ok(ratings)
    }
}
