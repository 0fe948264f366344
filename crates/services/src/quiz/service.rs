use std::sync::Arc;

use tracing::info;

use mehfil_core::Clock;
use mehfil_core::model::{QuizKind, ScoreRecord, UserIdentity};
use storage::repository::{AttemptRepository, ResultRepository, SettingsRepository};

use super::attempt::QuizAttempt;
use super::bank::QuestionSource;
use crate::error::QuizError;

/// Result of one step through a quiz attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizStep {
    pub is_finished: bool,
    /// The persisted result, present only on the step that finished a
    /// scored attempt.
    pub result: Option<ScoreRecord>,
}

/// Orchestrates attempt start, stepping, and persisted finalization.
#[derive(Clone)]
pub struct QuizService {
    clock: Clock,
    source: QuestionSource,
    settings: Arc<dyn SettingsRepository>,
    results: Arc<dyn ResultRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl QuizService {
    #[must_use]
    pub fn new(
        clock: Clock,
        source: QuestionSource,
        settings: Arc<dyn SettingsRepository>,
        results: Arc<dyn ResultRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            clock,
            source,
            settings,
            results,
            attempts,
        }
    }

    /// Start an attempt.
    ///
    /// The main quiz is gated: it must be visible and the identity must not
    /// have attempted before. The demo quiz has no gate and can be retaken
    /// freely.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotAvailable` when the main quiz is hidden,
    /// `QuizError::AlreadyAttempted` when the attempt flag is set, and
    /// fetch/storage errors from resolving the bank.
    pub async fn start(
        &self,
        kind: QuizKind,
        identity: &UserIdentity,
    ) -> Result<QuizAttempt, QuizError> {
        if kind.is_scored() {
            let settings = self.settings.get_settings().await?.unwrap_or_default();
            if !settings.main_quiz_visible() {
                return Err(QuizError::NotAvailable);
            }
            if self.attempts.has_attempted(identity).await? {
                return Err(QuizError::AlreadyAttempted);
            }
        }

        let questions = self.source.load(kind).await?;
        QuizAttempt::new(kind, questions, self.clock.now())
    }

    /// Advance past the current question, persisting the result when the
    /// last question of a scored attempt is passed.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Finished` when the attempt was already over and
    /// storage errors from finalization.
    pub async fn advance(
        &self,
        attempt: &mut QuizAttempt,
        identity: &UserIdentity,
    ) -> Result<QuizStep, QuizError> {
        attempt.advance(self.clock.now())?;
        self.finalize_if_finished(attempt, identity).await
    }

    /// Timer poll: auto-advance when the current question's deadline has
    /// passed, submitting whatever answer (possibly none) is recorded.
    ///
    /// Returns `None` when nothing expired.
    ///
    /// # Errors
    ///
    /// Returns storage errors from finalization.
    pub async fn poll_timer(
        &self,
        attempt: &mut QuizAttempt,
        identity: &UserIdentity,
    ) -> Result<Option<QuizStep>, QuizError> {
        if !attempt.tick(self.clock.now()) {
            return Ok(None);
        }
        self.finalize_if_finished(attempt, identity).await.map(Some)
    }

    /// Retry result persistence for a finished attempt.
    ///
    /// Useful when the final append failed (e.g. transient storage error):
    /// the attempt stays finished and unrecorded until this succeeds.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotFinished` if the attempt is still running and
    /// storage errors if persistence fails again.
    pub async fn finalize(
        &self,
        attempt: &mut QuizAttempt,
        identity: &UserIdentity,
    ) -> Result<QuizStep, QuizError> {
        if !attempt.is_finished() {
            return Err(QuizError::NotFinished);
        }
        self.finalize_if_finished(attempt, identity).await
    }

    async fn finalize_if_finished(
        &self,
        attempt: &mut QuizAttempt,
        identity: &UserIdentity,
    ) -> Result<QuizStep, QuizError> {
        if !attempt.is_finished() {
            return Ok(QuizStep {
                is_finished: false,
                result: None,
            });
        }

        // Demo attempts finish without persisting anything.
        if !attempt.kind().is_scored() {
            return Ok(QuizStep {
                is_finished: true,
                result: None,
            });
        }

        // Already persisted on an earlier step.
        if attempt.result_id().is_some() {
            return Ok(QuizStep {
                is_finished: true,
                result: None,
            });
        }

        let finished_at = attempt.finished_at().ok_or(QuizError::NotFinished)?;
        let record = ScoreRecord::new(identity.clone(), attempt.score(), finished_at);
        let result_id = self.results.append_result(&record).await?;
        attempt.set_result_id(result_id);
        self.attempts.mark_attempted(identity, finished_at).await?;
        info!(score = record.score(), "main quiz submitted");

        Ok(QuizStep {
            is_finished: true,
            result: Some(record),
        })
    }
}
