use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mehfil_core::model::{
    AdminIdentity, ContentItem, ContentItemKind, DayContent, DayNumber, EventSettings,
    ScoreRecord, UserIdentity,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    /// The backend ran out of space. Kept separate from `Connection` so
    /// callers can tell the admin to shrink uploads instead of retrying.
    #[error("storage limit exceeded")]
    QuotaExceeded,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape for one content item.
///
/// Flattens the `ContentItem` enum into nullable columns so repositories can
/// serialize without leaking storage concerns into the domain layer.
#[derive(Debug, Clone)]
pub struct ContentItemRecord {
    pub kind: String,
    pub url: Option<String>,
    pub file_name: Option<String>,
    pub file_data: Option<Vec<u8>>,
}

impl ContentItemRecord {
    #[must_use]
    pub fn from_item(item: &ContentItem) -> Self {
        match item {
            ContentItem::VideoLink { url } | ContentItem::DocumentLink { url } => Self {
                kind: item.kind().as_str().to_owned(),
                url: Some(url.to_string()),
                file_name: None,
                file_data: None,
            },
            ContentItem::DocumentUpload { name, data }
            | ContentItem::AudioUpload { name, data } => Self {
                kind: item.kind().as_str().to_owned(),
                url: None,
                file_name: Some(name.clone()),
                file_data: Some(data.clone()),
            },
        }
    }

    /// Convert the record back into a domain `ContentItem`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if the kind is unknown or the
    /// columns do not match it.
    pub fn into_item(self) -> Result<ContentItem, StorageError> {
        let kind = ContentItemKind::parse(&self.kind).ok_or_else(|| {
            StorageError::Serialization(format!("unknown content item kind: {}", self.kind))
        })?;

        match kind {
            ContentItemKind::VideoLink | ContentItemKind::DocumentLink => {
                let raw = self
                    .url
                    .ok_or_else(|| StorageError::Serialization("link item without url".into()))?;
                let url = raw
                    .parse()
                    .map_err(|_| StorageError::Serialization(format!("invalid url: {raw}")))?;
                Ok(match kind {
                    ContentItemKind::VideoLink => ContentItem::VideoLink { url },
                    _ => ContentItem::DocumentLink { url },
                })
            }
            ContentItemKind::DocumentUpload | ContentItemKind::AudioUpload => {
                let name = self.file_name.ok_or_else(|| {
                    StorageError::Serialization("upload item without file name".into())
                })?;
                let data = self.file_data.ok_or_else(|| {
                    StorageError::Serialization("upload item without file data".into())
                })?;
                Ok(match kind {
                    ContentItemKind::DocumentUpload => ContentItem::DocumentUpload { name, data },
                    _ => ContentItem::AudioUpload { name, data },
                })
            }
        }
    }
}

/// Day number plus its card subtitle, for dashboard listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySummary {
    pub day: DayNumber,
    pub date_label: Option<String>,
}

//
// ─── REPOSITORY CONTRACTS ──────────────────────────────────────────────────────
//

/// Repository contract for per-day learning content.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Replace the whole stored value for the day (last writer wins).
    ///
    /// The write is atomic: on failure the previously saved day is left
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::QuotaExceeded` when the backend is out of
    /// space, or other storage errors.
    async fn upsert_day(&self, content: &DayContent) -> Result<(), StorageError>;

    /// Fetch one day's content.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure; a missing day is `Ok(None)`.
    async fn get_day(&self, day: DayNumber) -> Result<Option<DayContent>, StorageError>;

    /// All stored days, sorted numerically. Gaps are expected.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_days(&self) -> Result<Vec<DaySummary>, StorageError>;
}

/// Repository contract for per-day, per-identity note text.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn save_note(
        &self,
        day: DayNumber,
        identity: &UserIdentity,
        body: &str,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure; no note yet is `Ok(None)`.
    async fn get_note(
        &self,
        day: DayNumber,
        identity: &UserIdentity,
    ) -> Result<Option<String>, StorageError>;
}

/// Repository contract for the admin's main-quiz CSV override.
#[async_trait]
pub trait QuizBankRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn set_override(&self, csv_text: &str) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure; no override is `Ok(None)`.
    async fn get_override(&self) -> Result<Option<String>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure. Clearing an absent
    /// override is not an error.
    async fn clear_override(&self) -> Result<(), StorageError>;
}

/// Repository contract for event-wide settings.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure; never-saved settings are
    /// `Ok(None)` and callers fall back to defaults.
    async fn get_settings(&self) -> Result<Option<EventSettings>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn save_settings(&self, settings: &EventSettings) -> Result<(), StorageError>;
}

/// Repository contract for submitted main-quiz results.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append one result and return its storage id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn append_result(&self, record: &ScoreRecord) -> Result<i64, StorageError>;

    /// All results in submission order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn list_results(&self) -> Result<Vec<ScoreRecord>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn clear_results(&self) -> Result<(), StorageError>;
}

/// Repository contract for the one-shot main-quiz attempt flag.
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure. Marking twice is not an
    /// error; the first timestamp wins.
    async fn mark_attempted(
        &self,
        identity: &UserIdentity,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn has_attempted(&self, identity: &UserIdentity) -> Result<bool, StorageError>;
}

/// Repository contract for the restored-at-startup sign-in sessions.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn save_user(&self, identity: &UserIdentity) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure; no session is `Ok(None)`.
    async fn load_user(&self) -> Result<Option<UserIdentity>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn clear_user(&self) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn save_admin(&self, identity: &AdminIdentity) -> Result<(), StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure; no session is `Ok(None)`.
    async fn load_admin(&self) -> Result<Option<AdminIdentity>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failure.
    async fn clear_admin(&self) -> Result<(), StorageError>;
}

//
// ─── IN-MEMORY BACKEND ─────────────────────────────────────────────────────────
//

#[derive(Default)]
struct InMemoryState {
    days: BTreeMap<DayNumber, DayContent>,
    notes: HashMap<(DayNumber, UserIdentity), String>,
    quiz_override: Option<String>,
    settings: Option<EventSettings>,
    results: Vec<ScoreRecord>,
    attempts: HashMap<UserIdentity, DateTime<Utc>>,
    user_session: Option<UserIdentity>,
    admin_session: Option<AdminIdentity>,
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn upsert_day(&self, content: &DayContent) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.days.insert(content.day(), content.clone());
        Ok(())
    }

    async fn get_day(&self, day: DayNumber) -> Result<Option<DayContent>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.days.get(&day).cloned())
    }

    async fn list_days(&self) -> Result<Vec<DaySummary>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .days
            .values()
            .map(|content| DaySummary {
                day: content.day(),
                date_label: content.date_label().map(str::to_owned),
            })
            .collect())
    }
}

#[async_trait]
impl NoteRepository for InMemoryRepository {
    async fn save_note(
        &self,
        day: DayNumber,
        identity: &UserIdentity,
        body: &str,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.notes.insert((day, identity.clone()), body.to_owned());
        Ok(())
    }

    async fn get_note(
        &self,
        day: DayNumber,
        identity: &UserIdentity,
    ) -> Result<Option<String>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.notes.get(&(day, identity.clone())).cloned())
    }
}

#[async_trait]
impl QuizBankRepository for InMemoryRepository {
    async fn set_override(&self, csv_text: &str) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.quiz_override = Some(csv_text.to_owned());
        Ok(())
    }

    async fn get_override(&self) -> Result<Option<String>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.quiz_override.clone())
    }

    async fn clear_override(&self) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.quiz_override = None;
        Ok(())
    }
}

#[async_trait]
impl SettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<EventSettings>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.settings.clone())
    }

    async fn save_settings(&self, settings: &EventSettings) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.settings = Some(settings.clone());
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(&self, record: &ScoreRecord) -> Result<i64, StorageError> {
        let mut guard = self.lock()?;
        guard.results.push(record.clone());
        i64::try_from(guard.results.len())
            .map_err(|_| StorageError::Serialization("result id overflow".into()))
    }

    async fn list_results(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.results.clone())
    }

    async fn clear_results(&self) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.results.clear();
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn mark_attempted(
        &self,
        identity: &UserIdentity,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.attempts.entry(identity.clone()).or_insert(at);
        Ok(())
    }

    async fn has_attempted(&self, identity: &UserIdentity) -> Result<bool, StorageError> {
        let guard = self.lock()?;
        Ok(guard.attempts.contains_key(identity))
    }
}

#[async_trait]
impl SessionRepository for InMemoryRepository {
    async fn save_user(&self, identity: &UserIdentity) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.user_session = Some(identity.clone());
        Ok(())
    }

    async fn load_user(&self) -> Result<Option<UserIdentity>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.user_session.clone())
    }

    async fn clear_user(&self) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.user_session = None;
        Ok(())
    }

    async fn save_admin(&self, identity: &AdminIdentity) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.admin_session = Some(identity.clone());
        Ok(())
    }

    async fn load_admin(&self) -> Result<Option<AdminIdentity>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.admin_session.clone())
    }

    async fn clear_admin(&self) -> Result<(), StorageError> {
        let mut guard = self.lock()?;
        guard.admin_session = None;
        Ok(())
    }
}

//
// ─── STORAGE AGGREGATE ─────────────────────────────────────────────────────────
//

/// Aggregates all repositories behind trait objects for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub contents: Arc<dyn ContentRepository>,
    pub notes: Arc<dyn NoteRepository>,
    pub quiz_bank: Arc<dyn QuizBankRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub results: Arc<dyn ResultRepository>,
    pub attempts: Arc<dyn AttemptRepository>,
    pub sessions: Arc<dyn SessionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            contents: Arc::new(repo.clone()),
            notes: Arc::new(repo.clone()),
            quiz_bank: Arc::new(repo.clone()),
            settings: Arc::new(repo.clone()),
            results: Arc::new(repo.clone()),
            attempts: Arc::new(repo.clone()),
            sessions: Arc::new(repo),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use mehfil_core::model::ContentItemDraft;
    use mehfil_core::time::fixed_now;

    fn build_day(day: u32, label: &str) -> DayContent {
        let item = ContentItemDraft::VideoLink {
            url: "https://youtu.be/abc".into(),
        }
        .validate()
        .unwrap();
        DayContent::new(DayNumber::new(day), Some(label.into()), vec![item])
    }

    fn build_identity(name: &str) -> UserIdentity {
        UserIdentity::new(name, "pw").unwrap()
    }

    #[tokio::test]
    async fn days_list_sorted_with_gaps() {
        let repo = InMemoryRepository::new();
        repo.upsert_day(&build_day(4, "Day four")).await.unwrap();
        repo.upsert_day(&build_day(1, "Day one")).await.unwrap();
        repo.upsert_day(&build_day(10, "Day ten")).await.unwrap();

        let days = repo.list_days().await.unwrap();
        let numbers: Vec<u32> = days.iter().map(|d| d.day.value()).collect();
        assert_eq!(numbers, [1, 4, 10]);
    }

    #[tokio::test]
    async fn upsert_day_overwrites_whole_value() {
        let repo = InMemoryRepository::new();
        repo.upsert_day(&build_day(1, "old")).await.unwrap();
        repo.upsert_day(&build_day(1, "new")).await.unwrap();

        let stored = repo.get_day(DayNumber::new(1)).await.unwrap().unwrap();
        assert_eq!(stored.date_label(), Some("new"));
        assert_eq!(repo.list_days().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn notes_are_scoped_by_day_and_identity() {
        let repo = InMemoryRepository::new();
        let day = DayNumber::new(2);
        let ayesha = build_identity("ayesha");
        let bilal = build_identity("bilal");

        repo.save_note(day, &ayesha, "mine").await.unwrap();
        assert_eq!(
            repo.get_note(day, &ayesha).await.unwrap().as_deref(),
            Some("mine")
        );
        assert_eq!(repo.get_note(day, &bilal).await.unwrap(), None);
        assert_eq!(repo.get_note(DayNumber::new(3), &ayesha).await.unwrap(), None);
    }

    #[tokio::test]
    async fn attempt_flag_keeps_first_timestamp() {
        let repo = InMemoryRepository::new();
        let identity = build_identity("ayesha");
        assert!(!repo.has_attempted(&identity).await.unwrap());

        repo.mark_attempted(&identity, fixed_now()).await.unwrap();
        repo.mark_attempted(&identity, fixed_now() + chrono::Duration::hours(1))
            .await
            .unwrap();
        assert!(repo.has_attempted(&identity).await.unwrap());
    }

    #[tokio::test]
    async fn results_keep_submission_order() {
        let repo = InMemoryRepository::new();
        for (name, score) in [("a", 3), ("b", 9), ("c", 5)] {
            let record = ScoreRecord::new(build_identity(name), score, fixed_now());
            repo.append_result(&record).await.unwrap();
        }

        let results = repo.list_results().await.unwrap();
        let names: Vec<_> = results.iter().map(ScoreRecord::name).collect();
        assert_eq!(names, ["a", "b", "c"]);

        repo.clear_results().await.unwrap();
        assert!(repo.list_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn sessions_store_user_and_admin_independently() {
        let repo = InMemoryRepository::new();
        let user = build_identity("ayesha");
        let admin = AdminIdentity::new("admin@example.com").unwrap();

        repo.save_user(&user).await.unwrap();
        repo.save_admin(&admin).await.unwrap();
        assert_eq!(repo.load_user().await.unwrap(), Some(user));
        assert_eq!(repo.load_admin().await.unwrap(), Some(admin));

        repo.clear_user().await.unwrap();
        assert_eq!(repo.load_user().await.unwrap(), None);
        assert!(repo.load_admin().await.unwrap().is_some());
    }

    #[test]
    fn item_record_round_trips() {
        let item = ContentItemDraft::AudioUpload {
            name: "recitation.mp3".into(),
            data: vec![1, 2, 3],
        }
        .validate()
        .unwrap();
        let record = ContentItemRecord::from_item(&item);
        assert_eq!(record.kind, "audio_upload");
        assert_eq!(record.into_item().unwrap(), item);
    }

    #[test]
    fn item_record_rejects_unknown_kind() {
        let record = ContentItemRecord {
            kind: "hologram".into(),
            url: None,
            file_name: None,
            file_data: None,
        };
        assert!(matches!(
            record.into_item().unwrap_err(),
            StorageError::Serialization(_)
        ));
    }
}
