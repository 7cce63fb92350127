use campus_core::model::{Answer, AnswerId, Question, QuestionId, Quiz, QuizId};

use super::SqliteRepository;
use super::mapping::{
    answer_id_from_i64, id_to_i64, map_answer_row, map_question_row, map_quiz_row,
    question_id_from_i64, quiz_id_from_i64,
};
use crate::repository::{NewAnswerRecord, NewQuestionRecord, NewQuizRecord, QuizRepository, StorageError};

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn insert_new_quiz(&self, quiz: NewQuizRecord) -> Result<QuizId, StorageError> {
        let res = sqlx::query("INSERT INTO quizzes (title, created_at) VALUES (?1, ?2)")
            .bind(quiz.title)
            .bind(quiz.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        quiz_id_from_i64(res.last_insert_rowid())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let row = sqlx::query("SELECT id, title, created_at FROM quizzes WHERE id = ?1")
            .bind(id_to_i64("quiz_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_quiz_row(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn insert_new_question(
        &self,
        question: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let res = sqlx::query("INSERT INTO questions (quiz_id, text) VALUES (?1, ?2)")
            .bind(id_to_i64("quiz_id", question.quiz_id.value())?)
            .bind(question.text)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        question_id_from_i64(res.last_insert_rowid())
    }

    async fn insert_new_answer(&self, answer: NewAnswerRecord) -> Result<AnswerId, StorageError> {
        let res = sqlx::query(
            "INSERT INTO answers (question_id, text, is_correct) VALUES (?1, ?2, ?3)",
        )
        .bind(id_to_i64("question_id", answer.question_id.value())?)
        .bind(answer.text)
        .bind(i64::from(answer.is_correct))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        answer_id_from_i64(res.last_insert_rowid())
    }

    async fn questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, quiz_id, text
            FROM questions
            WHERE quiz_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("quiz_id", quiz_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut questions = Vec::with_capacity(rows.len());
        for row in rows {
            questions.push(map_question_row(&row)?);
        }
        Ok(questions)
    }

    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, question_id, text, is_correct
            FROM answers
            WHERE question_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(id_to_i64("question_id", question_id.value())?)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut answers = Vec::with_capacity(rows.len());
        for row in rows {
            answers.push(map_answer_row(&row)?);
        }
        Ok(answers)
    }

    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StorageError> {
        let row = sqlx::query(
            "SELECT id, question_id, text, is_correct FROM answers WHERE id = ?1",
        )
        .bind(id_to_i64("answer_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        match row {
            Some(row) => map_answer_row(&row).map(Some),
            None => Ok(None),
        }
    }
}
