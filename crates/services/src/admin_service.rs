use std::sync::Arc;

use tracing::{info, warn};

use mehfil_core::csv::Table;
use mehfil_core::model::{
    ContentItemDraft, DayContent, DayNumber, EventSettings, EventSettingsDraft, ScoreRecord,
    sort_standings,
};
use storage::repository::{
    ContentRepository, QuizBankRepository, ResultRepository, SettingsRepository,
};

use crate::error::{AdminError, FetchError};
use crate::sheets::SheetFetcher;

/// Where the quiz-manager editor got its current text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizBankText {
    /// The locally stored override.
    Override(String),
    /// The published bank, fetched for editing because no override exists.
    Published(String),
}

impl QuizBankText {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            QuizBankText::Override(text) | QuizBankText::Published(text) => text,
        }
    }

    #[must_use]
    pub fn is_override(&self) -> bool {
        matches!(self, QuizBankText::Override(_))
    }
}

/// Admin console operations: daily content, the quiz bank override, the
/// external form, and submitted results.
///
/// Every panel reads the current value at mount and writes the whole value
/// back on save; the last writer wins.
#[derive(Clone)]
pub struct AdminService {
    contents: Arc<dyn ContentRepository>,
    quiz_bank: Arc<dyn QuizBankRepository>,
    settings: Arc<dyn SettingsRepository>,
    results: Arc<dyn ResultRepository>,
    fetcher: Arc<dyn SheetFetcher>,
}

impl AdminService {
    #[must_use]
    pub fn new(
        contents: Arc<dyn ContentRepository>,
        quiz_bank: Arc<dyn QuizBankRepository>,
        settings: Arc<dyn SettingsRepository>,
        results: Arc<dyn ResultRepository>,
        fetcher: Arc<dyn SheetFetcher>,
    ) -> Self {
        Self {
            contents,
            quiz_bank,
            settings,
            results,
            fetcher,
        }
    }

    /// Currently stored content for the editor, if the day was saved before.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storage` on backend failure.
    pub async fn day_content(&self, day: DayNumber) -> Result<Option<DayContent>, AdminError> {
        Ok(self.contents.get_day(day).await?)
    }

    /// Validate drafts and save one day's content wholesale.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Content` for an invalid draft (nothing is
    /// written), and `AdminError::Storage` with
    /// `StorageError::QuotaExceeded` when the backend is full. The caller
    /// still holds the drafts, so the admin can shrink uploads and retry
    /// while the previously saved day stays intact.
    pub async fn save_day_content(
        &self,
        day: DayNumber,
        date_label: Option<String>,
        drafts: Vec<ContentItemDraft>,
    ) -> Result<DayContent, AdminError> {
        let mut items = Vec::with_capacity(drafts.len());
        for draft in drafts {
            items.push(draft.validate()?);
        }
        let content = DayContent::new(day, date_label, items);

        if let Err(err) = self.contents.upsert_day(&content).await {
            warn!(day = %day, %err, "day content save failed");
            return Err(err.into());
        }
        info!(day = %day, items = content.items().len(), "day content saved");
        Ok(content)
    }

    /// Current editor text for the quiz manager: the override when present,
    /// else the published bank fetched for editing.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Fetch` when no override exists and the published
    /// bank is unavailable, or `AdminError::Storage` on backend failure.
    pub async fn quiz_bank_text(&self) -> Result<QuizBankText, AdminError> {
        if let Some(text) = self.quiz_bank.get_override().await? {
            return Ok(QuizBankText::Override(text));
        }
        let table = self.fetcher.fetch_main_quiz().await?;
        let text = table
            .to_csv()
            .map_err(|err| AdminError::Fetch(FetchError::Table(err)))?;
        Ok(QuizBankText::Published(text))
    }

    /// Validate and save the main-quiz override.
    ///
    /// The CSV must carry at least a question and an answer column and one
    /// data row; invalid text is rejected before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::InvalidQuizCsv` for rejected input and
    /// `AdminError::Storage` on backend failure.
    pub async fn save_quiz_override(&self, csv_text: &str) -> Result<(), AdminError> {
        let table = Table::parse(csv_text).map_err(|err| AdminError::InvalidQuizCsv {
            reason: err.to_string(),
        })?;
        if table.column_count() < 2 {
            return Err(AdminError::InvalidQuizCsv {
                reason: "requires at least a question and an answer column".into(),
            });
        }
        if table.is_empty() {
            return Err(AdminError::InvalidQuizCsv {
                reason: "no data rows".into(),
            });
        }

        self.quiz_bank.set_override(csv_text).await?;
        info!(rows = table.len(), "quiz override saved");
        Ok(())
    }

    /// Drop the override so the main quiz reads the published bank again.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storage` on backend failure.
    pub async fn clear_quiz_override(&self) -> Result<(), AdminError> {
        self.quiz_bank.clear_override().await?;
        info!("quiz override cleared");
        Ok(())
    }

    /// Toggle main-quiz entry for users.
    ///
    /// # Errors
    ///
    /// Returns `AdminError` on validation or backend failure.
    pub async fn set_main_quiz_visible(&self, visible: bool) -> Result<EventSettings, AdminError> {
        self.update_settings(|draft| draft.main_quiz_visible = visible)
            .await
    }

    /// Toggle the dashboard leaderboard.
    ///
    /// # Errors
    ///
    /// Returns `AdminError` on validation or backend failure.
    pub async fn set_leaderboard_visible(
        &self,
        visible: bool,
    ) -> Result<EventSettings, AdminError> {
        self.update_settings(|draft| draft.leaderboard_visible = visible)
            .await
    }

    /// Save the external form link and its visibility together.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Settings` for an invalid URL and
    /// `AdminError::Storage` on backend failure.
    pub async fn set_external_form(
        &self,
        url: Option<String>,
        visible: bool,
    ) -> Result<EventSettings, AdminError> {
        self.update_settings(|draft| {
            draft.external_form_url = url;
            draft.external_form_visible = visible;
        })
        .await
    }

    async fn update_settings(
        &self,
        apply: impl FnOnce(&mut EventSettingsDraft),
    ) -> Result<EventSettings, AdminError> {
        let mut draft = self
            .settings
            .get_settings()
            .await?
            .unwrap_or_default()
            .to_draft();
        apply(&mut draft);
        let settings = draft.validate()?;
        self.settings.save_settings(&settings).await?;
        Ok(settings)
    }

    /// Results for the admin table, highest score first.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storage` on backend failure.
    pub async fn results(&self) -> Result<Vec<ScoreRecord>, AdminError> {
        let mut results = self.results.list_results().await?;
        sort_standings(&mut results);
        Ok(results)
    }

    /// Delete every submitted result. Attempt flags are left in place, so
    /// cleared participants still cannot retake the main quiz.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::Storage` on backend failure.
    pub async fn clear_results(&self) -> Result<(), AdminError> {
        self.results.clear_results().await?;
        info!("quiz results cleared");
        Ok(())
    }
}
