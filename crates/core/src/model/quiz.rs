use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::csv::Table;

//
// ─── QUIZ KIND ─────────────────────────────────────────────────────────────────
//

/// Which quiz an attempt belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuizKind {
    /// The gated, one-attempt, scored quiz feeding the leaderboard.
    Main,
    /// The ungated, repeatable practice quiz. Never persisted.
    Demo,
}

impl QuizKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuizKind::Main => "main",
            QuizKind::Demo => "demo",
        }
    }

    /// Whether a finished attempt is scored and persisted.
    #[must_use]
    pub fn is_scored(self) -> bool {
        matches!(self, QuizKind::Main)
    }
}

impl fmt::Display for QuizKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question text cannot be empty")]
    EmptyText,

    #[error("correct answer cannot be empty")]
    EmptyCorrectAnswer,
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    text: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl Question {
    /// Creates a question, trimming all parts and dropping empty incorrect
    /// options.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError` if the text or the correct answer is empty.
    pub fn new(
        text: impl Into<String>,
        correct_answer: impl Into<String>,
        incorrect_answers: Vec<String>,
    ) -> Result<Self, QuestionError> {
        let text = text.into().trim().to_owned();
        if text.is_empty() {
            return Err(QuestionError::EmptyText);
        }
        let correct_answer = correct_answer.into().trim().to_owned();
        if correct_answer.is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }
        let incorrect_answers = incorrect_answers
            .into_iter()
            .map(|option| option.trim().to_owned())
            .filter(|option| !option.is_empty())
            .collect();

        Ok(Self {
            text,
            correct_answer,
            incorrect_answers,
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn incorrect_answers(&self) -> &[String] {
        &self.incorrect_answers
    }

    /// All display options in bank order, correct answer first.
    ///
    /// Display shuffling is the caller's concern; the mapping from option
    /// text to correct/incorrect never changes.
    #[must_use]
    pub fn options(&self) -> Vec<String> {
        let mut options = Vec::with_capacity(1 + self.incorrect_answers.len());
        options.push(self.correct_answer.clone());
        options.extend(self.incorrect_answers.iter().cloned());
        options
    }

    /// Exact-text comparison against the correct answer.
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// Derive a question bank from a parsed sheet.
///
/// Column 1 is the question text, column 2 the correct answer, and every
/// later non-empty column an incorrect option. Rows missing a question or a
/// correct answer are dropped.
#[must_use]
pub fn derive_bank(table: &Table) -> Vec<Question> {
    table
        .rows()
        .filter_map(|row| {
            let text = row.field(0)?;
            let correct = row.field(1)?;
            let incorrect = row
                .fields()
                .iter()
                .skip(2)
                .filter(|option| !option.trim().is_empty())
                .cloned()
                .collect();
            Question::new(text, correct, incorrect).ok()
        })
        .collect()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
