use thiserror::Error;

use mehfil_core::model::{AdminIdentity, DayNumber, QuizKind, UserIdentity};
use storage::repository::{SessionRepository, StorageError};

/// Navigational pages. Rendering is out of scope; routing state is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Splash,
    Login,
    Dashboard,
    Content(DayNumber),
    Quiz(QuizKind),
    AdminLogin,
    AdminDashboard,
}

/// Why a navigation was refused.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum RouteError {
    #[error("sign in first")]
    SignInRequired,

    #[error("admin sign in first")]
    AdminRequired,
}

/// Current page plus the signed-in identities, restored from persisted
/// sessions at startup.
#[derive(Debug, Clone)]
pub struct AppSession {
    page: Page,
    user: Option<UserIdentity>,
    admin: Option<AdminIdentity>,
}

impl Default for AppSession {
    fn default() -> Self {
        Self::new()
    }
}

impl AppSession {
    /// A fresh session starting on the splash screen.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page: Page::Splash,
            user: None,
            admin: None,
        }
    }

    /// Restore from persisted sessions: a stored admin lands on the admin
    /// dashboard, a stored user on the user dashboard, anyone else on the
    /// splash screen. When both are stored the admin wins.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    pub async fn restore(sessions: &dyn SessionRepository) -> Result<Self, StorageError> {
        let user = sessions.load_user().await?;
        let admin = sessions.load_admin().await?;

        let page = if admin.is_some() {
            Page::AdminDashboard
        } else if user.is_some() {
            Page::Dashboard
        } else {
            Page::Splash
        };

        Ok(Self { page, user, admin })
    }

    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    #[must_use]
    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn admin(&self) -> Option<&AdminIdentity> {
        self.admin.as_ref()
    }

    /// Leave the splash screen once its delay elapses.
    pub fn finish_splash(&mut self) {
        if matches!(self.page, Page::Splash) {
            self.page = if self.user.is_some() {
                Page::Dashboard
            } else {
                Page::Login
            };
        }
    }

    pub fn on_user_login(&mut self, identity: UserIdentity) {
        self.user = Some(identity);
        self.page = Page::Dashboard;
    }

    pub fn on_user_logout(&mut self) {
        self.user = None;
        self.page = Page::Login;
    }

    pub fn on_admin_login(&mut self, identity: AdminIdentity) {
        self.admin = Some(identity);
        self.page = Page::AdminDashboard;
    }

    pub fn on_admin_logout(&mut self) {
        self.admin = None;
        self.page = Page::AdminLogin;
    }

    /// Move to a page, enforcing the sign-in guards.
    ///
    /// # Errors
    ///
    /// Returns `RouteError` when the page requires an identity that is not
    /// signed in; the current page is left unchanged.
    pub fn navigate(&mut self, page: Page) -> Result<(), RouteError> {
        match page {
            Page::Dashboard | Page::Content(_) | Page::Quiz(_) if self.user.is_none() => {
                Err(RouteError::SignInRequired)
            }
            Page::AdminDashboard if self.admin.is_none() => Err(RouteError::AdminRequired),
            _ => {
                self.page = page;
                Ok(())
            }
        }
    }
}
