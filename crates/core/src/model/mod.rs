mod ids;
mod post;
mod quiz;
mod quiz_result;
mod rating;
mod session;
mod users;

pub use ids::{AnswerId, ParseIdError, PostId, QuestionId, QuizId, StudentId, TeacherId};

pub use post::{BlogPost, PostError, MIN_CONTENT_LEN, MIN_TITLE_LEN};
pub use quiz::{Answer, Question, Quiz, QuizError};
pub use quiz_result::{QuizResult, QuizResultError};
pub use rating::{Rating, RatingError, RatingScore};
pub use session::{QuizSession, SessionError};
pub use users::{ProfileError, Student, TeacherProfile};
