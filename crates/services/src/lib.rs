#![forbid(unsafe_code)]

pub mod admin_service;
pub mod app_services;
pub mod auth_service;
pub mod content_service;
pub mod dashboard;
pub mod error;
pub mod quiz;
pub mod session;
pub mod sheets;

pub use mehfil_core::Clock;

pub use admin_service::{AdminService, QuizBankText};
pub use app_services::AppServices;
pub use auth_service::{AdminCredentials, AuthService};
pub use content_service::{ContentService, DayView};
pub use dashboard::{DashboardService, DashboardView, LeaderboardRow, MainQuizCard};
pub use error::{
    AdminError, AppServicesError, AuthError, ContentServiceError, DashboardError, FetchError,
    QuizError,
};
pub use quiz::{CurrentQuestion, QuestionSource, QuizAttempt, QuizProgress, QuizService, QuizStep};
pub use session::{AppSession, Page, RouteError};
pub use sheets::{HttpSheetFetcher, SheetEndpoints, SheetFetcher};
