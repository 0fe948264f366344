use std::sync::Arc;

use mehfil_core::model::{UserIdentity, sort_standings};
use storage::repository::{
    AttemptRepository, ContentRepository, DaySummary, ResultRepository, SettingsRepository,
};

use crate::error::DashboardError;

/// State of the main-quiz card.
///
/// A finished attempt shows as completed even if the quiz is later hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainQuizCard {
    /// Already attempted; entry stays closed.
    Completed,
    /// Visible and not yet attempted; entry is open.
    Open,
    /// Hidden by the admin; entry is closed.
    Locked,
}

impl MainQuizCard {
    #[must_use]
    pub fn can_enter(self) -> bool {
        matches!(self, MainQuizCard::Open)
    }
}

/// One leaderboard line. Only the name leaves the stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub name: String,
    pub score: u32,
}

/// Everything the dashboard shows for one signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub days: Vec<DaySummary>,
    pub main_quiz: MainQuizCard,
    pub demo_quiz_open: bool,
    /// The external form link, present only when enabled and configured.
    pub external_form_url: Option<String>,
    /// Standings, present only while the admin has the leaderboard on.
    pub leaderboard: Option<Vec<LeaderboardRow>>,
}

/// Assembles the dashboard from stored days, settings, results, and the
/// viewer's attempt flag.
#[derive(Clone)]
pub struct DashboardService {
    contents: Arc<dyn ContentRepository>,
    settings: Arc<dyn SettingsRepository>,
    results: Arc<dyn ResultRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl DashboardService {
    #[must_use]
    pub fn new(
        contents: Arc<dyn ContentRepository>,
        settings: Arc<dyn SettingsRepository>,
        results: Arc<dyn ResultRepository>,
        attempts: Arc<dyn AttemptRepository>,
    ) -> Self {
        Self {
            contents,
            settings,
            results,
            attempts,
        }
    }

    /// Build the dashboard for one signed-in identity.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` on backend failure.
    pub async fn dashboard(&self, identity: &UserIdentity) -> Result<DashboardView, DashboardError> {
        let days = self.contents.list_days().await?;
        let settings = self.settings.get_settings().await?.unwrap_or_default();
        let attempted = self.attempts.has_attempted(identity).await?;

        let main_quiz = if attempted {
            MainQuizCard::Completed
        } else if settings.main_quiz_visible() {
            MainQuizCard::Open
        } else {
            MainQuizCard::Locked
        };

        let leaderboard = if settings.leaderboard_visible() {
            Some(self.standings().await?)
        } else {
            None
        };

        Ok(DashboardView {
            days,
            main_quiz,
            // The practice quiz is never gated.
            demo_quiz_open: true,
            external_form_url: settings.external_form_link().map(str::to_owned),
            leaderboard,
        })
    }

    /// Current standings, highest score first with ties in submission
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError` on backend failure.
    pub async fn standings(&self) -> Result<Vec<LeaderboardRow>, DashboardError> {
        let mut records = self.results.list_results().await?;
        sort_standings(&mut records);
        Ok(records
            .iter()
            .enumerate()
            .map(|(index, record)| LeaderboardRow {
                rank: index + 1,
                name: record.name().to_owned(),
                score: record.score(),
            })
            .collect())
    }
}
