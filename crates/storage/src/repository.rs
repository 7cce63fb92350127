use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use campus_core::model::{
    Answer, AnswerId, BlogPost, PostId, Question, QuestionId, Quiz, QuizId, QuizResult, Rating,
    Student, StudentId, TeacherId, TeacherProfile,
};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── NEW-ROW RECORDS ───────────────────────────────────────────────────────────
//

/// Insert shape for a teacher profile; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewTeacherRecord {
    pub name: String,
    pub email: String,
}

impl NewTeacherRecord {
    #[must_use]
    pub fn from_profile(profile: &TeacherProfile) -> Self {
        Self {
            name: profile.name().to_owned(),
            email: profile.email().to_owned(),
        }
    }
}

/// Insert shape for a quiz; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewQuizRecord {
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl NewQuizRecord {
    #[must_use]
    pub fn from_quiz(quiz: &Quiz) -> Self {
        Self {
            title: quiz.title().to_owned(),
            created_at: quiz.created_at(),
        }
    }
}

/// Insert shape for a question; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewQuestionRecord {
    pub quiz_id: QuizId,
    pub text: String,
}

/// Insert shape for an answer choice; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewAnswerRecord {
    pub question_id: QuestionId,
    pub text: String,
    pub is_correct: bool,
}

/// Insert shape for a blog post; the id is assigned by storage.
#[derive(Debug, Clone)]
pub struct NewPostRecord {
    pub teacher_id: TeacherId,
    pub title: String,
    pub content: String,
    pub reference_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NewPostRecord {
    #[must_use]
    pub fn from_post(post: &BlogPost) -> Self {
        Self {
            teacher_id: post.teacher_id(),
            title: post.title().to_owned(),
            content: post.content().to_owned(),
            reference_url: post.reference_url().map(ToString::to_string),
            created_at: post.created_at(),
        }
    }
}

/// Outcome of a rating save: the stored row plus whether it was newly created.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedRating {
    pub rating: Rating,
    pub created: bool,
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Directory of teacher profiles and students.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    /// Insert a teacher profile, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_teacher(&self, teacher: NewTeacherRecord) -> Result<TeacherId, StorageError>;

    /// Insert a student, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_student(&self, name: String) -> Result<StudentId, StorageError>;

    /// Fetch a teacher profile by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure; `Ok(None)` when missing.
    async fn get_teacher(&self, id: TeacherId) -> Result<Option<TeacherProfile>, StorageError>;

    /// Fetch a student by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure; `Ok(None)` when missing.
    async fn get_student(&self, id: StudentId) -> Result<Option<Student>, StorageError>;

    /// List teachers ordered by id, up to `limit`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn list_teachers(&self, limit: u32) -> Result<Vec<TeacherProfile>, StorageError>;

    /// Overwrite a teacher's cached rating average.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the teacher does not exist.
    async fn set_average_rating(&self, id: TeacherId, average: f64) -> Result<(), StorageError>;
}

/// Teacher ratings keyed by the unique (teacher, student) pair.
#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// Save a rating, updating in place when the (teacher, student) pair
    /// already has a row. The stored row keeps its original `created_at` on
    /// update.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn upsert_rating(&self, rating: &Rating) -> Result<SavedRating, StorageError>;

    /// Fetch the rating a student gave a teacher, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn get_rating(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
    ) -> Result<Option<Rating>, StorageError>;

    /// All ratings received by a teacher, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn ratings_for_teacher(&self, teacher_id: TeacherId)
        -> Result<Vec<Rating>, StorageError>;
}

/// Quizzes with their questions and answer choices.
#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// Insert a quiz, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_new_quiz(&self, quiz: NewQuizRecord) -> Result<QuizId, StorageError>;

    /// Fetch a quiz by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure; `Ok(None)` when missing.
    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError>;

    /// Insert a question, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_new_question(
        &self,
        question: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError>;

    /// Insert an answer choice, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_new_answer(&self, answer: NewAnswerRecord) -> Result<AnswerId, StorageError>;

    /// Questions of a quiz in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, StorageError>;

    /// Answer choices of a question in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, StorageError>;

    /// Fetch a single answer choice by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure; `Ok(None)` when missing.
    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StorageError>;
}

/// Completed quiz attempts.
#[async_trait]
pub trait QuizResultRepository: Send + Sync {
    /// Append a result row, returning its rowid.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError>;

    /// The most recent attempt by a student on a quiz, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn latest_result(
        &self,
        student_id: StudentId,
        quiz_id: QuizId,
    ) -> Result<Option<QuizResult>, StorageError>;

    /// Every attempt a student has completed, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn results_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<QuizResult>, StorageError>;
}

/// Teacher blog posts.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post, returning the assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be stored.
    async fn insert_new_post(&self, post: NewPostRecord) -> Result<PostId, StorageError>;

    /// Overwrite an existing post.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the post does not exist.
    async fn update_post(&self, post: &BlogPost) -> Result<(), StorageError>;

    /// Delete a post.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the post does not exist.
    async fn delete_post(&self, id: PostId) -> Result<(), StorageError>;

    /// Fetch a post by id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure; `Ok(None)` when missing.
    async fn get_post(&self, id: PostId) -> Result<Option<BlogPost>, StorageError>;

    /// A teacher's posts, newest first, with limit/offset paging.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn posts_for_teacher(
        &self,
        teacher_id: TeacherId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BlogPost>, StorageError>;

    /// Posts whose title or content contains `query` (case-insensitive),
    /// newest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn search_posts(&self, query: &str, limit: u32) -> Result<Vec<BlogPost>, StorageError>;

    /// Total number of posts.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn count_posts(&self) -> Result<u64, StorageError>;

    /// Number of posts created at or after `cutoff`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn count_posts_since(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError>;

    /// Teachers with the most posts, descending by count.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failure.
    async fn top_teachers(&self, limit: u32) -> Result<Vec<(TeacherId, u64)>, StorageError>;
}

//
// ─── IN-MEMORY IMPLEMENTATION ──────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    next_id: u64,
    teachers: HashMap<TeacherId, TeacherProfile>,
    students: HashMap<StudentId, Student>,
    ratings: Vec<Rating>,
    quizzes: HashMap<QuizId, Quiz>,
    questions: Vec<Question>,
    answers: Vec<Answer>,
    results: Vec<QuizResult>,
    posts: Vec<BlogPost>,
}

impl InMemoryState {
    fn assign_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl DirectoryRepository for InMemoryRepository {
    async fn insert_teacher(&self, teacher: NewTeacherRecord) -> Result<TeacherId, StorageError> {
        let mut state = self.lock()?;
        let id = TeacherId::new(state.assign_id());
        let profile = TeacherProfile::new(id, teacher.name, teacher.email, None)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.teachers.insert(id, profile);
        Ok(id)
    }

    async fn insert_student(&self, name: String) -> Result<StudentId, StorageError> {
        let mut state = self.lock()?;
        let id = StudentId::new(state.assign_id());
        let student =
            Student::new(id, name).map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.students.insert(id, student);
        Ok(id)
    }

    async fn get_teacher(&self, id: TeacherId) -> Result<Option<TeacherProfile>, StorageError> {
        Ok(self.lock()?.teachers.get(&id).cloned())
    }

    async fn get_student(&self, id: StudentId) -> Result<Option<Student>, StorageError> {
        Ok(self.lock()?.students.get(&id).cloned())
    }

    async fn list_teachers(&self, limit: u32) -> Result<Vec<TeacherProfile>, StorageError> {
        let state = self.lock()?;
        let mut teachers: Vec<_> = state.teachers.values().cloned().collect();
        teachers.sort_by_key(TeacherProfile::id);
        teachers.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(teachers)
    }

    async fn set_average_rating(&self, id: TeacherId, average: f64) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let profile = state.teachers.get(&id).ok_or(StorageError::NotFound)?;
        let updated = TeacherProfile::new(id, profile.name(), profile.email(), Some(average))
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.teachers.insert(id, updated);
        Ok(())
    }
}

#[async_trait]
impl RatingRepository for InMemoryRepository {
    async fn upsert_rating(&self, rating: &Rating) -> Result<SavedRating, StorageError> {
        let mut state = self.lock()?;
        let existing = state.ratings.iter_mut().find(|r| {
            r.teacher_id() == rating.teacher_id() && r.student_id() == rating.student_id()
        });

        match existing {
            Some(row) => {
                *row = row.with_revision(rating.score(), rating.comment().map(str::to_owned));
                Ok(SavedRating {
                    rating: row.clone(),
                    created: false,
                })
            }
            None => {
                state.ratings.push(rating.clone());
                Ok(SavedRating {
                    rating: rating.clone(),
                    created: true,
                })
            }
        }
    }

    async fn get_rating(
        &self,
        teacher_id: TeacherId,
        student_id: StudentId,
    ) -> Result<Option<Rating>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .ratings
            .iter()
            .find(|r| r.teacher_id() == teacher_id && r.student_id() == student_id)
            .cloned())
    }

    async fn ratings_for_teacher(
        &self,
        teacher_id: TeacherId,
    ) -> Result<Vec<Rating>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .ratings
            .iter()
            .filter(|r| r.teacher_id() == teacher_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn insert_new_quiz(&self, quiz: NewQuizRecord) -> Result<QuizId, StorageError> {
        let mut state = self.lock()?;
        let id = QuizId::new(state.assign_id());
        let quiz = Quiz::new(id, quiz.title, quiz.created_at)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.quizzes.insert(id, quiz);
        Ok(id)
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        Ok(self.lock()?.quizzes.get(&id).cloned())
    }

    async fn insert_new_question(
        &self,
        question: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let mut state = self.lock()?;
        if !state.quizzes.contains_key(&question.quiz_id) {
            return Err(StorageError::NotFound);
        }
        let id = QuestionId::new(state.assign_id());
        let question = Question::new(id, question.quiz_id, question.text)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.questions.push(question);
        Ok(id)
    }

    async fn insert_new_answer(&self, answer: NewAnswerRecord) -> Result<AnswerId, StorageError> {
        let mut state = self.lock()?;
        if !state.questions.iter().any(|q| q.id() == answer.question_id) {
            return Err(StorageError::NotFound);
        }
        let id = AnswerId::new(state.assign_id());
        let answer = Answer::new(id, answer.question_id, answer.text, answer.is_correct)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.answers.push(answer);
        Ok(id)
    }

    async fn questions_for_quiz(&self, quiz_id: QuizId) -> Result<Vec<Question>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .questions
            .iter()
            .filter(|q| q.quiz_id() == quiz_id)
            .cloned()
            .collect())
    }

    async fn answers_for_question(
        &self,
        question_id: QuestionId,
    ) -> Result<Vec<Answer>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .answers
            .iter()
            .filter(|a| a.question_id() == question_id)
            .cloned()
            .collect())
    }

    async fn get_answer(&self, id: AnswerId) -> Result<Option<Answer>, StorageError> {
        let state = self.lock()?;
        Ok(state.answers.iter().find(|a| a.id() == id).cloned())
    }
}

#[async_trait]
impl QuizResultRepository for InMemoryRepository {
    async fn insert_result(&self, result: &QuizResult) -> Result<i64, StorageError> {
        let mut state = self.lock()?;
        state.results.push(result.clone());
        i64::try_from(state.results.len())
            .map_err(|_| StorageError::Serialization("result rowid overflow".into()))
    }

    async fn latest_result(
        &self,
        student_id: StudentId,
        quiz_id: QuizId,
    ) -> Result<Option<QuizResult>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .results
            .iter()
            .filter(|r| r.student_id() == student_id && r.quiz_id() == quiz_id)
            .next_back()
            .cloned())
    }

    async fn results_for_student(
        &self,
        student_id: StudentId,
    ) -> Result<Vec<QuizResult>, StorageError> {
        let state = self.lock()?;
        Ok(state
            .results
            .iter()
            .filter(|r| r.student_id() == student_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PostRepository for InMemoryRepository {
    async fn insert_new_post(&self, post: NewPostRecord) -> Result<PostId, StorageError> {
        let mut state = self.lock()?;
        let id = PostId::new(state.assign_id());
        let post = BlogPost::new(
            id,
            post.teacher_id,
            post.title,
            post.content,
            post.reference_url.as_deref(),
            post.created_at,
        )
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
        state.posts.push(post);
        Ok(id)
    }

    async fn update_post(&self, post: &BlogPost) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let slot = state
            .posts
            .iter_mut()
            .find(|p| p.id() == post.id())
            .ok_or(StorageError::NotFound)?;
        *slot = post.clone();
        Ok(())
    }

    async fn delete_post(&self, id: PostId) -> Result<(), StorageError> {
        let mut state = self.lock()?;
        let before = state.posts.len();
        state.posts.retain(|p| p.id() != id);
        if state.posts.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn get_post(&self, id: PostId) -> Result<Option<BlogPost>, StorageError> {
        let state = self.lock()?;
        Ok(state.posts.iter().find(|p| p.id() == id).cloned())
    }

    async fn posts_for_teacher(
        &self,
        teacher_id: TeacherId,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<BlogPost>, StorageError> {
        let state = self.lock()?;
        let mut posts: Vec<_> = state
            .posts
            .iter()
            .filter(|p| p.teacher_id() == teacher_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        Ok(posts
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn search_posts(&self, query: &str, limit: u32) -> Result<Vec<BlogPost>, StorageError> {
        let needle = query.to_lowercase();
        let state = self.lock()?;
        let mut posts: Vec<_> = state
            .posts
            .iter()
            .filter(|p| {
                p.title().to_lowercase().contains(&needle)
                    || p.content().to_lowercase().contains(&needle)
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at().cmp(&a.created_at()).then(b.id().cmp(&a.id())));
        posts.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(posts)
    }

    async fn count_posts(&self) -> Result<u64, StorageError> {
        Ok(self.lock()?.posts.len() as u64)
    }

    async fn count_posts_since(&self, cutoff: DateTime<Utc>) -> Result<u64, StorageError> {
        let state = self.lock()?;
        Ok(state
            .posts
            .iter()
            .filter(|p| p.created_at() >= cutoff)
            .count() as u64)
    }

    async fn top_teachers(&self, limit: u32) -> Result<Vec<(TeacherId, u64)>, StorageError> {
        let state = self.lock()?;
        let mut counts: HashMap<TeacherId, u64> = HashMap::new();
        for post in &state.posts {
            *counts.entry(post.teacher_id()).or_insert(0) += 1;
        }
        let mut ranked: Vec<_> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(ranked)
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub directory: Arc<dyn DirectoryRepository>,
    pub ratings: Arc<dyn RatingRepository>,
    pub quizzes: Arc<dyn QuizRepository>,
    pub quiz_results: Arc<dyn QuizResultRepository>,
    pub posts: Arc<dyn PostRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            directory: Arc::new(repo.clone()),
            ratings: Arc::new(repo.clone()),
            quizzes: Arc::new(repo.clone()),
            quiz_results: Arc::new(repo.clone()),
            posts: Arc::new(repo),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
