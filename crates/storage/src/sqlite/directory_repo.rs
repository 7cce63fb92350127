use campus_core::model::{Student, StudentId, TeacherId, TeacherProfile};

use super::SqliteRepository;
use super::mapping::{id_to_i64, map_student_row, map_teacher_row, ser, teacher_id_from_i64, student_id_from_i64};
use crate::repository::{DirectoryRepository, NewTeacherRecord, StorageError};

#[async_trait::async_trait]
impl DirectoryRepository for SqliteRepository {
    async fn insert_teacher(&self, teacher: NewTeacherRecord) -> Result<TeacherId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO teachers (name, email, average_rating)
            VALUES (?1, ?2, NULL)
            ",
        )
        .bind(teacher.name)
        .bind(teacher.email)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        teacher_id_from_i64(res.last_insert_rowid())
    }

    async fn insert_student(&self, name: String) -> Result<StudentId, StorageError> {
        let res = sqlx::query("INSERT INTO students (name) VALUES (?1)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        student_id_from_i64(res.last_insert_rowid())
    }

    async fn get_teacher(&self, id: TeacherId) -> Result<Option<TeacherProfile>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, name, email, average_rating
            FROM teachers WHERE id = ?1
            ",
        )
        .bind(id_to_i64("teacher_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_teacher_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn get_student(&self, id: StudentId) -> Result<Option<Student>, StorageError> {
        let row = sqlx::query("SELECT id, name FROM students WHERE id = ?1")
            .bind(id_to_i64("student_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_student_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn list_teachers(&self, limit: u32) -> Result<Vec<TeacherProfile>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, email, average_rating
            FROM teachers
            ORDER BY id ASC
            LIMIT ?1
            ",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut teachers = Vec::with_capacity(rows.len());
        for row in rows {
            teachers.push(map_teacher_row(&row)?);
        }
        Ok(teachers)
    }

    async fn set_average_rating(&self, id: TeacherId, average: f64) -> Result<(), StorageError> {
        if !average.is_finite() {
            return Err(ser(format!("non-finite average: {average}")));
        }

        let res = sqlx::query("UPDATE teachers SET average_rating = ?1 WHERE id = ?2")
            .bind(average)
            .bind(id_to_i64("teacher_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
