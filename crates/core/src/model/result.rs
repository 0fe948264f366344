use chrono::{DateTime, Utc};

use crate::model::identity::{IdentityError, UserIdentity};

/// One submitted main-quiz result.
///
/// Results form an append-only sequence; a second record for the same
/// identity is prevented upstream by the attempt flag, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    identity: UserIdentity,
    score: u32,
    submitted_at: DateTime<Utc>,
}

impl ScoreRecord {
    #[must_use]
    pub fn new(identity: UserIdentity, score: u32, submitted_at: DateTime<Utc>) -> Self {
        Self {
            identity,
            score,
            submitted_at,
        }
    }

    /// Rehydrate a record from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError` if the persisted name or password is empty.
    pub fn from_persisted(
        name: String,
        password: String,
        score: u32,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self, IdentityError> {
        Ok(Self {
            identity: UserIdentity::new(name, password)?,
            score,
            submitted_at,
        })
    }

    #[must_use]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.identity.name()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

/// Order results for display: highest score first, earlier submission
/// breaking ties (the sort is stable over submission order).
pub fn sort_standings(records: &mut [ScoreRecord]) {
    records.sort_by(|a, b| b.score.cmp(&a.score));
}
