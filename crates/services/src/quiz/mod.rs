mod attempt;
mod bank;
mod progress;
mod service;

// Public API of the quiz subsystem.
pub use crate::error::QuizError;
pub use attempt::{CurrentQuestion, QUESTION_TIME_LIMIT_SECS, QuizAttempt, question_time_limit};
pub use bank::QuestionSource;
pub use progress::QuizProgress;
pub use service::{QuizService, QuizStep};
