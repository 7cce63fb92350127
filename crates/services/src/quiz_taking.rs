use std::sync::Arc;

use campus_core::model::{AnswerId, QuestionId, QuizId, QuizResult, QuizSession, StudentId};
use storage::repository::{QuizRepository, QuizResultRepository, StorageError};

use crate::Clock;
use crate::error::QuizTakingError;

/// Outcome of answering one question within a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub question_id: QuestionId,
    pub correct: bool,
    /// Progress through the quiz after this answer, in whole percent.
    pub progress: u8,
}

/// Drives a student through a quiz: session start, per-question evaluation,
/// and result persistence on completion.
#[derive(Clone)]
pub struct QuizTakingService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    results: Arc<dyn QuizResultRepository>,
}

impl QuizTakingService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        results: Arc<dyn QuizResultRepository>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            results,
        }
    }

    /// Begin a session over the quiz's questions.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::Storage` with `StorageError::NotFound` for an
    /// unknown quiz, `QuizTakingError::Session` when the quiz has no
    /// questions.
    pub async fn start(
        &self,
        quiz_id: QuizId,
        student_id: StudentId,
    ) -> Result<QuizSession, QuizTakingError> {
        self.quizzes
            .get_quiz(quiz_id)
            .await?
            .ok_or(StorageError::NotFound)?;

        let questions = self.quizzes.questions_for_quiz(quiz_id).await?;
        let session = QuizSession::new(quiz_id, student_id, questions, self.clock.now())?;
        Ok(session)
    }

    /// Evaluate the chosen answer against the current question and advance
    /// the session.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::Session` when the session is already
    /// complete, `QuizTakingError::AnswerMismatch` when the choice belongs to
    /// a different question, and storage errors for an unknown answer.
    pub async fn answer_current(
        &self,
        session: &mut QuizSession,
        answer_id: AnswerId,
    ) -> Result<AnswerOutcome, QuizTakingError> {
        let Some(question) = session.current_question() else {
            return Err(campus_core::model::SessionError::Completed.into());
        };
        let question_id = question.id();

        let answer = self
            .quizzes
            .get_answer(answer_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        if answer.question_id() != question_id {
            return Err(QuizTakingError::AnswerMismatch);
        }

        let correct = answer.is_correct();
        session.record_answer(correct, self.clock.now())?;

        Ok(AnswerOutcome {
            question_id,
            correct,
            progress: session.progress(),
        })
    }

    /// Persist the result of a completed session.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::NotFinished` while questions remain,
    /// `QuizTakingError::Storage` if persistence fails.
    pub async fn finish(&self, session: &QuizSession) -> Result<QuizResult, QuizTakingError> {
        let completed_at = session.completed_at().ok_or(QuizTakingError::NotFinished)?;

        let result = QuizResult::from_counts(
            session.student_id(),
            session.quiz_id(),
            session.correct_answers(),
            session.total_questions(),
            completed_at,
        )?;
        self.results.insert_result(&result).await?;
        Ok(result)
    }

    /// The student's most recent attempt on a quiz, if any.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::Storage` if repository access fails.
    pub async fn latest_result(
        &self,
        student_id: StudentId,
        quiz_id: QuizId,
    ) -> Result<Option<QuizResult>, QuizTakingError> {
        let result = self.results.latest_result(student_id, quiz_id).await?;
        Ok(result)
    }

    /// Every quiz attempt the student has completed, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `QuizTakingError::Storage` if repository access fails.
    pub async fn completed_quizzes(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<QuizResult>, QuizTakingError> {
        let results = self.results.results_for_student(student_id).await?;
        Ok(results)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use campus_core::model::SessionError;
    use campus_core::time::fixed_clock;
    use storage::repository::{
        InMemoryRepository, NewAnswerRecord, NewQuestionRecord, NewQuizRecord,
    };

    struct Fixture {
        service: QuizTakingService,
        quiz_id: QuizId,
        // one (correct, wrong) pair per question
        choices: Vec<(AnswerId, AnswerId)>,
    }

    async fn build_fixture(questions: usize) -> Fixture {
        let repo = InMemoryRepository::new();
        let quiz_id = repo
            .insert_new_quiz(NewQuizRecord {
                title: "Fractions".into(),
                created_at: campus_core::time::fixed_now(),
            })
            .await
            .unwrap();

        let mut choices = Vec::new();
        for n in 0..questions {
            let question_id = repo
                .insert_new_question(NewQuestionRecord {
                    quiz_id,
                    text: format!("Question {n}"),
                })
                .await
                .unwrap();
            let correct = repo
                .insert_new_answer(NewAnswerRecord {
                    question_id,
                    text: "right".into(),
                    is_correct: true,
                })
                .await
                .unwrap();
            let wrong = repo
                .insert_new_answer(NewAnswerRecord {
                    question_id,
                    text: "wrong".into(),
                    is_correct: false,
                })
                .await
                .unwrap();
            choices.push((correct, wrong));
        }

        let service = QuizTakingService::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo),
        );
        Fixture {
            service,
            quiz_id,
            choices,
        }
    }

    #[tokio::test]
    async fn unknown_quiz_cannot_start() {
        let fixture = build_fixture(1).await;
        let err = fixture
            .service
            .start(QuizId::new(999), StudentId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            QuizTakingError::Storage(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn empty_quiz_cannot_start() {
        let fixture = build_fixture(0).await;
        let err = fixture
            .service
            .start(fixture.quiz_id, StudentId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, QuizTakingError::Session(SessionError::Empty)));
    }

    #[tokio::test]
    async fn three_of_four_scores_seventy_five() {
        let fixture = build_fixture(4).await;
        let mut session = fixture
            .service
            .start(fixture.quiz_id, StudentId::new(1))
            .await
            .unwrap();

        for (n, (correct, wrong)) in fixture.choices.iter().enumerate() {
            let pick = if n < 3 { *correct } else { *wrong };
            let outcome = fixture
                .service
                .answer_current(&mut session, pick)
                .await
                .unwrap();
            assert_eq!(outcome.correct, n < 3);
        }
        assert!(session.is_complete());

        let result = fixture.service.finish(&session).await.unwrap();
        assert_eq!(result.score(), 75);
        assert_eq!(result.correct_answers(), 3);

        let latest = fixture
            .service
            .latest_result(StudentId::new(1), fixture.quiz_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.score(), 75);
    }

    #[tokio::test]
    async fn progress_moves_in_quarter_steps() {
        let fixture = build_fixture(4).await;
        let mut session = fixture
            .service
            .start(fixture.quiz_id, StudentId::new(1))
            .await
            .unwrap();

        let outcome = fixture
            .service
            .answer_current(&mut session, fixture.choices[0].0)
            .await
            .unwrap();
        assert_eq!(outcome.progress, 25);
    }

    #[tokio::test]
    async fn answer_for_wrong_question_is_rejected() {
        let fixture = build_fixture(2).await;
        let mut session = fixture
            .service
            .start(fixture.quiz_id, StudentId::new(1))
            .await
            .unwrap();

        // choice belongs to the second question while the first is current
        let err = fixture
            .service
            .answer_current(&mut session, fixture.choices[1].0)
            .await
            .unwrap_err();
        assert!(matches!(err, QuizTakingError::AnswerMismatch));

        // the session did not advance
        assert_eq!(session.answered_count(), 0);
    }

    #[tokio::test]
    async fn finishing_an_open_session_is_rejected() {
        let fixture = build_fixture(2).await;
        let mut session = fixture
            .service
            .start(fixture.quiz_id, StudentId::new(1))
            .await
            .unwrap();
        fixture
            .service
            .answer_current(&mut session, fixture.choices[0].0)
            .await
            .unwrap();

        let err = fixture.service.finish(&session).await.unwrap_err();
        assert!(matches!(err, QuizTakingError::NotFinished));
    }
}
