use std::sync::Arc;

use mehfil_core::model::{DayContent, DayNumber, UserIdentity};
use storage::repository::{ContentRepository, DaySummary, NoteRepository};

use crate::error::ContentServiceError;

/// What the day page shows: the day's media plus the viewer's own notes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayView {
    pub content: Option<DayContent>,
    pub notes: String,
}

/// Read access to day content and read/write access to per-identity notes.
#[derive(Clone)]
pub struct ContentService {
    contents: Arc<dyn ContentRepository>,
    notes: Arc<dyn NoteRepository>,
}

impl ContentService {
    #[must_use]
    pub fn new(contents: Arc<dyn ContentRepository>, notes: Arc<dyn NoteRepository>) -> Self {
        Self { contents, notes }
    }

    /// All stored days, sorted numerically. Gaps between day numbers are
    /// normal.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError` on backend failure.
    pub async fn list_days(&self) -> Result<Vec<DaySummary>, ContentServiceError> {
        Ok(self.contents.list_days().await?)
    }

    /// The day page for one viewer: stored content (if any) and the
    /// viewer's notes (empty string until first saved).
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError` on backend failure.
    pub async fn day_view(
        &self,
        day: DayNumber,
        identity: &UserIdentity,
    ) -> Result<DayView, ContentServiceError> {
        let content = self.contents.get_day(day).await?;
        let notes = self.notes.get_note(day, identity).await?.unwrap_or_default();
        Ok(DayView { content, notes })
    }

    /// Save the viewer's note text for a day, replacing any previous note.
    ///
    /// # Errors
    ///
    /// Returns `ContentServiceError` on backend failure.
    pub async fn save_note(
        &self,
        day: DayNumber,
        identity: &UserIdentity,
        body: &str,
    ) -> Result<(), ContentServiceError> {
        self.notes.save_note(day, identity, body).await?;
        Ok(())
    }
}
