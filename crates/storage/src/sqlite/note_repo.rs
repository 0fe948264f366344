use mehfil_core::model::{DayNumber, UserIdentity};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{day_i64, map_sqlx_err};
use crate::repository::{NoteRepository, StorageError};

#[async_trait::async_trait]
impl NoteRepository for SqliteRepository {
    async fn save_note(
        &self,
        day: DayNumber,
        identity: &UserIdentity,
        body: &str,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO notes (day, user_name, user_password, body)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(day, user_name, user_password) DO UPDATE SET
                body = excluded.body
            ",
        )
        .bind(day_i64(day))
        .bind(identity.name())
        .bind(identity.password())
        .bind(body)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn get_note(
        &self,
        day: DayNumber,
        identity: &UserIdentity,
    ) -> Result<Option<String>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT body FROM notes
            WHERE day = ?1 AND user_name = ?2 AND user_password = ?3
            ",
        )
        .bind(day_i64(day))
        .bind(identity.name())
        .bind(identity.password())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        row.map(|row| {
            row.try_get("body")
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
        .transpose()
    }
}
