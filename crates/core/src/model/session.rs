use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::model::ids::{QuestionId, QuizId, StudentId};
use crate::model::quiz::Question;
use crate::scoring;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("quiz has no questions")]
    Empty,

    #[error("quiz session already completed")]
    Completed,
}

//
// ─── QUIZ SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory state for one student walking through a quiz.
///
/// Steps through the provided questions in order, counting correct answers.
/// The session is pure state: evaluation of a chosen answer happens in the
/// services layer, which feeds the verdict into [`QuizSession::record_answer`].
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    token: Uuid,
    quiz_id: QuizId,
    student_id: StudentId,
    questions: Vec<Question>,
    current: usize,
    correct_answers: u32,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Starts a session over the given questions.
    ///
    /// `started_at` should come from the services layer clock to keep time
    /// deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided.
    pub fn new(
        quiz_id: QuizId,
        student_id: StudentId,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            token: Uuid::new_v4(),
            quiz_id,
            student_id,
            questions,
            current: 0,
            correct_answers: 0,
            started_at,
            completed_at: None,
        })
    }

    /// Opaque identity for this in-flight session, useful in logs.
    #[must_use]
    pub fn token(&self) -> Uuid {
        self.token
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    #[must_use]
    pub fn student_id(&self) -> StudentId {
        self.student_id
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn total_questions(&self) -> u32 {
        u32::try_from(self.questions.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn answered_count(&self) -> u32 {
        u32::try_from(self.current).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn correct_answers(&self) -> u32 {
        self.correct_answers
    }

    /// The question currently awaiting an answer, `None` once complete.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Percentage of the quiz answered so far.
    #[must_use]
    pub fn progress(&self) -> u8 {
        scoring::quiz_progress(self.answered_count(), self.total_questions())
    }

    /// Percentage score over the questions answered to date.
    #[must_use]
    pub fn score(&self) -> u8 {
        scoring::percentage_score(self.correct_answers, self.total_questions())
    }

    /// Records the verdict for the current question and advances.
    ///
    /// `answered_at` should come from the services layer clock; it becomes the
    /// completion timestamp when the last question is answered.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if every question is already answered.
    pub fn record_answer(
        &mut self,
        correct: bool,
        answered_at: DateTime<Utc>,
    ) -> Result<QuestionId, SessionError> {
        let Some(question) = self.questions.get(self.current) else {
            return Err(SessionError::Completed);
        };
        let question_id = question.id();

        if correct {
            self.correct_answers += 1;
        }

        self.current += 1;
        if self.current >= self.questions.len() {
            self.completed_at = Some(answered_at);
        }

        Ok(question_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::QuestionId;
    use crate::time::fixed_now;

    fn build_questions(count: u64) -> Vec<Question> {
        (1..=count)
            .map(|id| Question::new(QuestionId::new(id), QuizId::new(1), format!("Q{id}")).unwrap())
            .collect()
    }

    fn start_session(count: u64) -> QuizSession {
        QuizSession::new(QuizId::new(1), StudentId::new(7), build_questions(count), fixed_now())
            .unwrap()
    }

    #[test]
    fn empty_question_list_is_rejected() {
        let err = QuizSession::new(QuizId::new(1), StudentId::new(7), Vec::new(), fixed_now())
            .unwrap_err();
        assert_eq!(err, SessionError::Empty);
    }

    #[test]
    fn session_advances_and_completes() {
        let mut session = start_session(2);

        assert_eq!(session.progress(), 0);
        assert!(!session.is_complete());

        session.record_answer(true, fixed_now()).unwrap();
        assert_eq!(session.progress(), 50);
        assert!(!session.is_complete());

        session.record_answer(false, fixed_now()).unwrap();
        assert_eq!(session.progress(), 100);
        assert!(session.is_complete());
        assert_eq!(session.completed_at(), Some(fixed_now()));
    }

    #[test]
    fn score_counts_only_correct_answers() {
        let mut session = start_session(4);
        session.record_answer(true, fixed_now()).unwrap();
        session.record_answer(true, fixed_now()).unwrap();
        session.record_answer(true, fixed_now()).unwrap();
        session.record_answer(false, fixed_now()).unwrap();

        assert_eq!(session.correct_answers(), 3);
        assert_eq!(session.score(), 75);
    }

    #[test]
    fn answering_after_completion_is_an_error() {
        let mut session = start_session(1);
        session.record_answer(true, fixed_now()).unwrap();

        let err = session.record_answer(true, fixed_now()).unwrap_err();
        assert_eq!(err, SessionError::Completed);
    }

    #[test]
    fn record_answer_reports_the_question_it_consumed() {
        let mut session = start_session(2);
        let first = session.current_question().unwrap().id();
        let consumed = session.record_answer(false, fixed_now()).unwrap();
        assert_eq!(consumed, first);
    }
}
