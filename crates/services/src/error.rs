//! Shared error types for the services crate.

use thiserror::Error;

use mehfil_core::csv::TableError;
use mehfil_core::model::{ContentError, EventSettingsError, IdentityError};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors from fetching and parsing the published sheets.
///
/// Any variant means "data unavailable" to the caller; there is no retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("sheet request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Table(#[from] TableError),
}

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the quiz engine and `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("the quiz is not open")]
    NotAvailable,
    #[error("this quiz has already been attempted")]
    AlreadyAttempted,
    #[error("no usable questions in the quiz bank")]
    NoQuestions,
    #[error("the attempt is already finished")]
    Finished,
    #[error("the attempt is not finished yet")]
    NotFinished,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ContentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AdminService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdminError {
    #[error("invalid quiz CSV: {reason}")]
    InvalidQuizCsv { reason: String },
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Settings(#[from] EventSettingsError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AdminError {
    /// Storage-quota failures are surfaced distinctly: the caller keeps its
    /// draft so the admin can shrink uploads and retry.
    #[must_use]
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, AdminError::Storage(StorageError::QuotaExceeded))
    }
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
