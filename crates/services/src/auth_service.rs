use std::env;
use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use mehfil_core::model::{AdminIdentity, UserIdentity};
use storage::repository::SessionRepository;

use crate::error::AuthError;
use crate::sheets::SheetFetcher;

/// Header names in the published user sheet.
const NAME_COLUMN: &str = "Name";
const PASSWORD_COLUMN: &str = "Password";

/// The single admin credential pair.
#[derive(Clone)]
pub struct AdminCredentials {
    email: String,
    password: String,
}

impl AdminCredentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Reads `MEHFIL_ADMIN_EMAIL` / `MEHFIL_ADMIN_PASSWORD`, falling back to
    /// the built-in event pair.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            email: env::var("MEHFIL_ADMIN_EMAIL")
                .unwrap_or_else(|_| "meeladmehfil@2025.com".into()),
            password: env::var("MEHFIL_ADMIN_PASSWORD").unwrap_or_else(|_| "meeladmehfil".into()),
        }
    }

    fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email.trim() && self.password == password
    }
}

// Keep the password out of Debug output and logs.
impl fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Sign-in and session restore for users and the admin.
///
/// User credentials are checked against the published user sheet: names
/// compare case-insensitively, passwords exactly. Both checks are plaintext,
/// matching the sheet format.
#[derive(Clone)]
pub struct AuthService {
    fetcher: Arc<dyn SheetFetcher>,
    sessions: Arc<dyn SessionRepository>,
    admin: AdminCredentials,
}

impl AuthService {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn SheetFetcher>,
        sessions: Arc<dyn SessionRepository>,
        admin: AdminCredentials,
    ) -> Self {
        Self {
            fetcher,
            sessions,
            admin,
        }
    }

    /// Validate credentials against the user sheet and persist the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` when no sheet row matches,
    /// `AuthError::Fetch` when the sheet is unavailable, and storage errors
    /// when persisting the session fails.
    pub async fn login(&self, name: &str, password: &str) -> Result<UserIdentity, AuthError> {
        let identity = UserIdentity::new(name, password)?;
        let users = self.fetcher.fetch_users().await?;

        let valid = users.rows().any(|row| {
            match (row.get(NAME_COLUMN), row.get(PASSWORD_COLUMN)) {
                (Some(row_name), Some(row_password))
                    if !row_name.is_empty() && !row_password.is_empty() =>
                {
                    identity.matches_sheet_row(row_name, row_password)
                }
                _ => false,
            }
        });

        if !valid {
            warn!(name = identity.name(), "rejected sign-in");
            return Err(AuthError::InvalidCredentials);
        }

        self.sessions.save_user(&identity).await?;
        info!(name = identity.name(), "user signed in");
        Ok(identity)
    }

    /// Remove the persisted user session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on backend failure.
    pub async fn logout(&self) -> Result<(), AuthError> {
        self.sessions.clear_user().await?;
        Ok(())
    }

    /// The persisted user session, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on backend failure.
    pub async fn restore_user(&self) -> Result<Option<UserIdentity>, AuthError> {
        Ok(self.sessions.load_user().await?)
    }

    /// Validate admin credentials and persist the admin session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` on a mismatch and storage
    /// errors when persisting the session fails.
    pub async fn admin_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminIdentity, AuthError> {
        if !self.admin.matches(email, password) {
            warn!("rejected admin sign-in");
            return Err(AuthError::InvalidCredentials);
        }

        let identity = AdminIdentity::new(email)?;
        self.sessions.save_admin(&identity).await?;
        info!("admin signed in");
        Ok(identity)
    }

    /// Remove the persisted admin session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on backend failure.
    pub async fn admin_logout(&self) -> Result<(), AuthError> {
        self.sessions.clear_admin().await?;
        Ok(())
    }

    /// The persisted admin session, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` on backend failure.
    pub async fn restore_admin(&self) -> Result<Option<AdminIdentity>, AuthError> {
        Ok(self.sessions.load_admin().await?)
    }
}
