use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdentityError {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("password cannot be empty")]
    EmptyPassword,

    #[error("email cannot be empty")]
    EmptyEmail,
}

//
// ─── USER IDENTITY ─────────────────────────────────────────────────────────────
//

/// A participant identity: the `(name, password)` pair from the published
/// user sheet.
///
/// The pair itself is the identity. There is no generated user id, so two
/// participants who share the same pair are indistinguishable and share
/// notes and the main-quiz attempt flag.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserIdentity {
    name: String,
    password: String,
}

impl UserIdentity {
    /// Creates an identity from login input, trimming both parts.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if either part is empty or whitespace-only.
    pub fn new(
        name: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }
        let password = password.into().trim().to_owned();
        if password.is_empty() {
            return Err(IdentityError::EmptyPassword);
        }
        Ok(Self { name, password })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Whether a user-sheet row belongs to this identity.
    ///
    /// Names compare case-insensitively, passwords exactly.
    #[must_use]
    pub fn matches_sheet_row(&self, name: &str, password: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase() && self.password == password
    }
}

// Keep passwords out of Debug output and logs.
impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserIdentity")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

//
// ─── ADMIN IDENTITY ────────────────────────────────────────────────────────────
//

/// The signed-in admin, identified by email only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    email: String,
}

impl AdminIdentity {
    /// Creates an admin identity.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::EmptyEmail` if the email is empty or
    /// whitespace-only.
    pub fn new(email: impl Into<String>) -> Result<Self, IdentityError> {
        let email = email.into().trim().to_owned();
        if email.is_empty() {
            return Err(IdentityError::EmptyEmail);
        }
        Ok(Self { email })
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_trims_input() {
        let identity = UserIdentity::new("  Ayesha ", " secret ").unwrap();
        assert_eq!(identity.name(), "Ayesha");
        assert_eq!(identity.password(), "secret");
    }

    #[test]
    fn identity_rejects_empty_parts() {
        assert_eq!(
            UserIdentity::new("   ", "pw").unwrap_err(),
            IdentityError::EmptyName
        );
        assert_eq!(
            UserIdentity::new("name", "  ").unwrap_err(),
            IdentityError::EmptyPassword
        );
    }

    #[test]
    fn sheet_row_matching_is_case_insensitive_on_name_only() {
        let identity = UserIdentity::new("ayesha", "secret").unwrap();
        assert!(identity.matches_sheet_row("AYESHA", "secret"));
        assert!(identity.matches_sheet_row(" Ayesha ", "secret"));
        assert!(!identity.matches_sheet_row("ayesha", "SECRET"));
        assert!(!identity.matches_sheet_row("someone-else", "secret"));
    }

    #[test]
    fn identities_sharing_the_pair_are_equal() {
        let a = UserIdentity::new("Ayesha", "secret").unwrap();
        let b = UserIdentity::new("Ayesha", "secret").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn debug_omits_password() {
        let identity = UserIdentity::new("Ayesha", "secret").unwrap();
        let rendered = format!("{identity:?}");
        assert!(rendered.contains("Ayesha"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn admin_identity_rejects_empty_email() {
        assert_eq!(
            AdminIdentity::new("  ").unwrap_err(),
            IdentityError::EmptyEmail
        );
        let admin = AdminIdentity::new("admin@example.com").unwrap();
        assert_eq!(admin.email(), "admin@example.com");
    }
}
