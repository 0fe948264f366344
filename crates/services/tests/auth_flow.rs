use std::sync::Arc;

use async_trait::async_trait;
use mehfil_core::csv::Table;
use mehfil_core::time::fixed_clock;
use services::{AdminCredentials, AppServices, AppSession, AuthError, FetchError, Page, SheetFetcher};
use storage::repository::Storage;

const USER_SHEET: &str = "Name,Password\n\
    Ayesha,rose-42\n\
    Bilal,moon-7\n\
    \"Umm Kulthum\",star-9";

struct StubFetcher {
    users: Option<String>,
}

impl StubFetcher {
    fn sheet() -> Self {
        Self {
            users: Some(USER_SHEET.to_owned()),
        }
    }

    fn unavailable() -> Self {
        Self { users: None }
    }
}

#[async_trait]
impl SheetFetcher for StubFetcher {
    async fn fetch_users(&self) -> Result<Table, FetchError> {
        match self.users.as_ref() {
            Some(text) => Ok(Table::parse(text)?),
            None => Err(FetchError::HttpStatus(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            )),
        }
    }

    async fn fetch_main_quiz(&self) -> Result<Table, FetchError> {
        Ok(Table::parse("Q,A")?)
    }

    async fn fetch_demo_quiz(&self) -> Result<Table, FetchError> {
        Ok(Table::parse("Q,A")?)
    }
}

fn build_services(fetcher: StubFetcher) -> AppServices {
    AppServices::from_parts(
        Storage::in_memory(),
        Arc::new(fetcher),
        AdminCredentials::new("admin@example.com", "event-secret"),
        fixed_clock(),
    )
}

#[tokio::test]
async fn login_matches_sheet_rows_case_insensitively() {
    let services = build_services(StubFetcher::sheet());
    let auth = services.auth();

    let identity = auth.login("AYESHA", "rose-42").await.unwrap();
    assert_eq!(identity.name(), "AYESHA");

    // Quoted sheet names work too.
    assert!(auth.login("umm kulthum", "star-9").await.is_ok());
}

#[tokio::test]
async fn login_rejects_wrong_password_and_unknown_name() {
    let services = build_services(StubFetcher::sheet());
    let auth = services.auth();

    let err = auth.login("Ayesha", "ROSE-42").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = auth.login("nobody", "rose-42").await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let err = auth.login("   ", "rose-42").await.unwrap_err();
    assert!(matches!(err, AuthError::Identity(_)));
}

#[tokio::test]
async fn login_surfaces_unavailable_sheet_as_fetch_error() {
    let services = build_services(StubFetcher::unavailable());
    let err = services
        .auth()
        .login("Ayesha", "rose-42")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Fetch(_)));
}

#[tokio::test]
async fn sessions_persist_and_restore_across_startups() {
    let services = build_services(StubFetcher::sheet());
    let auth = services.auth();

    auth.login("Bilal", "moon-7").await.unwrap();

    // A later startup over the same storage restores straight to the
    // dashboard.
    let session = AppSession::restore(services.storage().sessions.as_ref())
        .await
        .unwrap();
    assert_eq!(session.page(), Page::Dashboard);
    assert_eq!(session.user().unwrap().name(), "Bilal");

    auth.logout().await.unwrap();
    let session = AppSession::restore(services.storage().sessions.as_ref())
        .await
        .unwrap();
    assert_eq!(session.page(), Page::Splash);
    assert!(session.user().is_none());
}

#[tokio::test]
async fn admin_login_uses_configured_pair() {
    let services = build_services(StubFetcher::sheet());
    let auth = services.auth();

    let err = auth
        .admin_login("admin@example.com", "wrong")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));

    let admin = auth
        .admin_login("admin@example.com", "event-secret")
        .await
        .unwrap();
    assert_eq!(admin.email(), "admin@example.com");

    let session = AppSession::restore(services.storage().sessions.as_ref())
        .await
        .unwrap();
    assert_eq!(session.page(), Page::AdminDashboard);

    auth.admin_logout().await.unwrap();
    assert!(auth.restore_admin().await.unwrap().is_none());
}
