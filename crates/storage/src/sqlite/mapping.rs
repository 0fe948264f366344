use chrono::{DateTime, Utc};
use mehfil_core::model::{ContentItem, DayNumber, ScoreRecord};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::{ContentItemRecord, StorageError};

/// SQLite primary result code for a full database or disk.
const SQLITE_FULL: &str = "13";

/// Map a sqlx error, keeping out-of-space failures distinct so the admin
/// can be told to shrink uploads instead of retrying.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &err {
        let full = db.code().is_some_and(|code| code == SQLITE_FULL)
            || db.message().contains("database or disk is full");
        if full {
            return StorageError::QuotaExceeded;
        }
    }
    StorageError::Connection(err.to_string())
}

pub(crate) fn day_i64(day: DayNumber) -> i64 {
    i64::from(day.value())
}

pub(crate) fn day_from_i64(raw: i64) -> Result<DayNumber, StorageError> {
    u32::try_from(raw)
        .map(DayNumber::new)
        .map_err(|_| StorageError::Serialization(format!("day out of range: {raw}")))
}

pub(crate) fn map_item_row(row: &SqliteRow) -> Result<ContentItem, StorageError> {
    let record = ContentItemRecord {
        kind: row
            .try_get("kind")
            .map_err(|e| StorageError::Serialization(e.to_string()))?,
        url: row
            .try_get("url")
            .map_err(|e| StorageError::Serialization(e.to_string()))?,
        file_name: row
            .try_get("file_name")
            .map_err(|e| StorageError::Serialization(e.to_string()))?,
        file_data: row
            .try_get("file_data")
            .map_err(|e| StorageError::Serialization(e.to_string()))?,
    };
    record.into_item()
}

pub(crate) fn map_result_row(row: &SqliteRow) -> Result<ScoreRecord, StorageError> {
    let name: String = row
        .try_get("user_name")
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let password: String = row
        .try_get("user_password")
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let score: i64 = row
        .try_get("score")
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    let submitted_at: DateTime<Utc> = row
        .try_get("submitted_at")
        .map_err(|e| StorageError::Serialization(e.to_string()))?;

    let score = u32::try_from(score)
        .map_err(|_| StorageError::Serialization(format!("score out of range: {score}")))?;

    ScoreRecord::from_persisted(name, password, score, submitted_at)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}
