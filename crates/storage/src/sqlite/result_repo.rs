use campus_core::model::{QuizId, QuizResult, StudentId};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_result_row};
use crate::repository::{QuizResultRepository, StorageError};

#[async_trait::async_trait]
impl QuizResultRepository for SqliteRepository {
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO quiz_results (
                student_id, quiz_id, score, total_questions, correct_answers, completed_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(id_to_i64("student_id", result.student_id().value())?)
        .bind(id_to_i64("quiz_id", result.quiz_id().value())?)
        .bind(i64::from(result.score()))
        .bind(i64::from(result.total_questions()))
        .bind(i64::from(result.correct_answers()))
        .bind(result.completed_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(res.last_insert_rowid())
    }

    async fn latest_result(
        &self,
        student_id: StudentId,
        quiz_id: QuizId,
    ) -> Result<Option<QuizResult>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT student_id, quiz_id, score, total_questions, correct_answers, completed_at
            FROM quiz_results
            WHERE student_id = ?1 AND quiz_id = ?2
            ORDER BY id DESC
            LIMIT 1
            ",
        )
        .bind(id_to_i64("student_id", student_id.value())?)
        .bind(id_to_i64("quiz_id", quiz_id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_result_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn results_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<QuizResult>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT student_id, quiz_id, score, total_questions, correct_answers, completed_at
            FROM quiz_results
            WHERE student_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("student_id", student_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            results.push(map_result_row(&row)?);
        }
        Ok(results)
    }
}
