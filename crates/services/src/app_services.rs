use std::sync::Arc;

use mehfil_core::Clock;
use storage::repository::Storage;

use crate::admin_service::AdminService;
use crate::auth_service::{AdminCredentials, AuthService};
use crate::content_service::ContentService;
use crate::dashboard::DashboardService;
use crate::error::AppServicesError;
use crate::quiz::{QuestionSource, QuizService};
use crate::sheets::{HttpSheetFetcher, SheetFetcher};

/// Assembles app-facing services over one storage backend and one sheet
/// fetcher.
#[derive(Clone)]
pub struct AppServices {
    auth: Arc<AuthService>,
    quiz: Arc<QuizService>,
    content: Arc<ContentService>,
    dashboard: Arc<DashboardService>,
    admin: Arc<AdminService>,
    storage: Storage,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the published sheets.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let fetcher: Arc<dyn SheetFetcher> = Arc::new(HttpSheetFetcher::from_env());
        Ok(Self::from_parts(
            storage,
            fetcher,
            AdminCredentials::from_env(),
            clock,
        ))
    }

    /// Wire services over explicit parts. Tests pass in-memory storage and
    /// a stub fetcher.
    #[must_use]
    pub fn from_parts(
        storage: Storage,
        fetcher: Arc<dyn SheetFetcher>,
        admin_credentials: AdminCredentials,
        clock: Clock,
    ) -> Self {
        let auth = Arc::new(AuthService::new(
            Arc::clone(&fetcher),
            Arc::clone(&storage.sessions),
            admin_credentials,
        ));
        let source = QuestionSource::new(Arc::clone(&fetcher), Arc::clone(&storage.quiz_bank));
        let quiz = Arc::new(QuizService::new(
            clock,
            source,
            Arc::clone(&storage.settings),
            Arc::clone(&storage.results),
            Arc::clone(&storage.attempts),
        ));
        let content = Arc::new(ContentService::new(
            Arc::clone(&storage.contents),
            Arc::clone(&storage.notes),
        ));
        let dashboard = Arc::new(DashboardService::new(
            Arc::clone(&storage.contents),
            Arc::clone(&storage.settings),
            Arc::clone(&storage.results),
            Arc::clone(&storage.attempts),
        ));
        let admin = Arc::new(AdminService::new(
            Arc::clone(&storage.contents),
            Arc::clone(&storage.quiz_bank),
            Arc::clone(&storage.settings),
            Arc::clone(&storage.results),
            fetcher,
        ));

        Self {
            auth,
            quiz,
            content,
            dashboard,
            admin,
            storage,
        }
    }

    #[must_use]
    pub fn auth(&self) -> Arc<AuthService> {
        Arc::clone(&self.auth)
    }

    #[must_use]
    pub fn quiz(&self) -> Arc<QuizService> {
        Arc::clone(&self.quiz)
    }

    #[must_use]
    pub fn content(&self) -> Arc<ContentService> {
        Arc::clone(&self.content)
    }

    #[must_use]
    pub fn dashboard(&self) -> Arc<DashboardService> {
        Arc::clone(&self.dashboard)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }
}
