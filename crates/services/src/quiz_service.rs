use std::sync::Arc;

use rand::seq::SliceRandom;

use campus_core::model::{Answer, AnswerId, Question, QuestionId, Quiz, QuizId};
use storage::repository::{
    NewAnswerRecord, NewQuestionRecord, NewQuizRecord, QuizRepository, StorageError,
};

use crate::Clock;
use crate::error::QuizServiceError;

/// Orchestrates quiz authoring and lookups.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(clock: Clock, quizzes: Arc<dyn QuizRepository>) -> Self {
        Self { clock, quizzes }
    }

    /// Create a new quiz and persist it.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` for validation failures.
    /// Returns `QuizServiceError::Storage` if persistence fails.
    pub async fn create_quiz(&self, title: String) -> Result<QuizId, QuizServiceError> {
        let now = self.clock.now();
        let quiz = Quiz::new(QuizId::new(1), title, now)?;
        let quiz_id = self
            .quizzes
            .insert_new_quiz(NewQuizRecord::from_quiz(&quiz))
            .await?;
        Ok(quiz_id)
    }

    /// Fetch a quiz by ID.
    ///
    /// Returns `Ok(None)` when the quiz does not exist.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn get_quiz(&self, quiz_id: QuizId) -> Result<Option<Quiz>, QuizServiceError> {
        let quiz = self.quizzes.get_quiz(quiz_id).await?;
        Ok(quiz)
    }

    /// Add a question to a quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` for empty text.
    /// Returns `QuizServiceError::Storage` if the quiz is missing or
    /// persistence fails.
    pub async fn add_question(
        &self,
        quiz_id: QuizId,
        text: String,
    ) -> Result<QuestionId, QuizServiceError> {
        let question = Question::new(QuestionId::new(1), quiz_id, text)?;
        let question_id = self
            .quizzes
            .insert_new_question(NewQuestionRecord {
                quiz_id,
                text: question.text().to_owned(),
            })
            .await?;
        Ok(question_id)
    }

    /// Add an answer choice to a question.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Quiz` for empty text.
    /// Returns `QuizServiceError::Storage` if the question is missing or
    /// persistence fails.
    pub async fn add_answer(
        &self,
        question_id: QuestionId,
        text: String,
        is_correct: bool,
    ) -> Result<AnswerId, QuizServiceError> {
        let answer = Answer::new(AnswerId::new(1), question_id, text, is_correct)?;
        let answer_id = self
            .quizzes
            .insert_new_answer(NewAnswerRecord {
                question_id,
                text: answer.text().to_owned(),
                is_correct,
            })
            .await?;
        Ok(answer_id)
    }

    /// Questions of a quiz in authoring order.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn questions(&self, quiz_id: QuizId) -> Result<Vec<Question>, QuizServiceError> {
        let questions = self.quizzes.questions_for_quiz(quiz_id).await?;
        Ok(questions)
    }

    /// Answer choices of a question in authoring order.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn answers(&self, question_id: QuestionId) -> Result<Vec<Answer>, QuizServiceError> {
        let answers = self.quizzes.answers_for_question(question_id).await?;
        Ok(answers)
    }

    /// Answer choices in a random presentation order, so the correct choice
    /// does not sit in a fixed slot.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` if repository access fails.
    pub async fn answers_shuffled(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, QuizServiceError> {
        let mut answers = self.quizzes.answers_for_question(question_id).await?;
        answers.shuffle(&mut rand::rng());
        Ok(answers)
    }

    /// Whether the given answer choice is the correct one.
    ///
    /// # Errors
    ///
    /// Returns `QuizServiceError::Storage` with `StorageError::NotFound` when
    /// the answer does not exist.
    pub async fn evaluate_answer(&self, answer_id: AnswerId) -> Result<bool, QuizServiceError> {
        let answer = self
            .quizzes
            .get_answer(answer_id)
            .await?
            .ok_or(StorageError::NotFound)?;
        Ok(answer.is_correct())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
