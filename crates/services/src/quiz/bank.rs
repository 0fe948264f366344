use std::sync::Arc;

use tracing::debug;

use mehfil_core::csv::Table;
use mehfil_core::model::{Question, QuizKind, derive_bank};
use storage::repository::QuizBankRepository;

use crate::error::{FetchError, QuizError};
use crate::sheets::SheetFetcher;

/// Resolves the question source for an attempt.
///
/// The main quiz prefers the admin's CSV override and falls back to the
/// published bank; the demo quiz always reads its own bank and ignores the
/// override.
#[derive(Clone)]
pub struct QuestionSource {
    fetcher: Arc<dyn SheetFetcher>,
    overrides: Arc<dyn QuizBankRepository>,
}

impl QuestionSource {
    #[must_use]
    pub fn new(fetcher: Arc<dyn SheetFetcher>, overrides: Arc<dyn QuizBankRepository>) -> Self {
        Self { fetcher, overrides }
    }

    /// Load and derive the question bank for the given quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` when no usable rows remain after
    /// derivation, `QuizError::Fetch` when the source is unavailable, and
    /// storage errors when reading the override fails.
    pub async fn load(&self, kind: QuizKind) -> Result<Vec<Question>, QuizError> {
        let table = match kind {
            QuizKind::Main => match self.overrides.get_override().await? {
                Some(csv_text) => {
                    debug!("using admin quiz override");
                    Table::parse(&csv_text).map_err(FetchError::Table)?
                }
                None => self.fetcher.fetch_main_quiz().await?,
            },
            QuizKind::Demo => self.fetcher.fetch_demo_quiz().await?,
        };

        let questions = derive_bank(&table);
        if questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }
        debug!(kind = %kind, questions = questions.len(), "question bank ready");
        Ok(questions)
    }
}
