use campus_core::model::{
    Answer, AnswerId, BlogPost, PostId, Question, QuestionId, Quiz, QuizId, QuizResult, Rating,
    RatingScore, Student, StudentId, TeacherId, TeacherProfile,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn id_to_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn teacher_id_from_i64(v: i64) -> Result<TeacherId, StorageError> {
    Ok(TeacherId::new(i64_to_u64("teacher_id", v)?))
}

pub(crate) fn student_id_from_i64(v: i64) -> Result<StudentId, StorageError> {
    Ok(StudentId::new(i64_to_u64("student_id", v)?))
}

pub(crate) fn quiz_id_from_i64(v: i64) -> Result<QuizId, StorageError> {
    Ok(QuizId::new(i64_to_u64("quiz_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn answer_id_from_i64(v: i64) -> Result<AnswerId, StorageError> {
    Ok(AnswerId::new(i64_to_u64("answer_id", v)?))
}

pub(crate) fn post_id_from_i64(v: i64) -> Result<PostId, StorageError> {
    Ok(PostId::new(i64_to_u64("post_id", v)?))
}

pub(crate) fn map_teacher_row(row: &SqliteRow) -> Result<TeacherProfile, StorageError> {
    TeacherProfile::new(
        teacher_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("email").map_err(ser)?,
        row.try_get::<Option<f64>, _>("average_rating").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_student_row(row: &SqliteRow) -> Result<Student, StorageError> {
    Student::new(
        student_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_rating_row(row: &SqliteRow) -> Result<Rating, StorageError> {
    let score_i64: i64 = row.try_get("score").map_err(ser)?;
    let score = RatingScore::new(
        u8::try_from(score_i64)
            .map_err(|_| StorageError::Serialization(format!("invalid score: {score_i64}")))?,
    )
    .map_err(ser)?;

    Ok(Rating::new(
        teacher_id_from_i64(row.try_get::<i64, _>("teacher_id").map_err(ser)?)?,
        student_id_from_i64(row.try_get::<i64, _>("student_id").map_err(ser)?)?,
        score,
        row.try_get::<Option<String>, _>("comment").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    ))
}

pub(crate) fn map_quiz_row(row: &SqliteRow) -> Result<Quiz, StorageError> {
    Quiz::new(
        quiz_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    Question::new(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        quiz_id_from_i64(row.try_get::<i64, _>("quiz_id").map_err(ser)?)?,
        row.try_get::<String, _>("text").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_answer_row(row: &SqliteRow) -> Result<Answer, StorageError> {
    Answer::new(
        answer_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        question_id_from_i64(row.try_get::<i64, _>("question_id").map_err(ser)?)?,
        row.try_get::<String, _>("text").map_err(ser)?,
        row.try_get::<i64, _>("is_correct").map_err(ser)? != 0,
    )
    .map_err(ser)
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<QuizResult, StorageError> {
    let total_i64: i64 = row.try_get("total_questions").map_err(ser)?;
    let correct_i64: i64 = row.try_get("correct_answers").map_err(ser)?;

    QuizResult::from_counts(
        student_id_from_i64(row.try_get::<i64, _>("student_id").map_err(ser)?)?,
        quiz_id_from_i64(row.try_get::<i64, _>("quiz_id").map_err(ser)?)?,
        u32::try_from(correct_i64)
            .map_err(|_| StorageError::Serialization(format!("invalid correct_answers: {correct_i64}")))?,
        u32::try_from(total_i64)
            .map_err(|_| StorageError::Serialization(format!("invalid total_questions: {total_i64}")))?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_post_row(row: &SqliteRow) -> Result<BlogPost, StorageError> {
    let reference_url: Option<String> = row.try_get("reference_url").map_err(ser)?;

    BlogPost::new(
        post_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        teacher_id_from_i64(row.try_get::<i64, _>("teacher_id").map_err(ser)?)?,
        row.try_get::<String, _>("title").map_err(ser)?,
        row.try_get::<String, _>("content").map_err(ser)?,
        reference_url.as_deref(),
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}
