use chrono::{DateTime, Utc};
use mehfil_core::model::UserIdentity;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::map_sqlx_err;
use crate::repository::{AttemptRepository, QuizBankRepository, StorageError};

#[async_trait::async_trait]
impl QuizBankRepository for SqliteRepository {
    async fn set_override(&self, csv_text: &str) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO quiz_override (id, csv_text)
            VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET
                csv_text = excluded.csv_text
            ",
        )
        .bind(csv_text)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn get_override(&self) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT csv_text FROM quiz_override WHERE id = 1")
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_err)?;

        row.map(|row| {
            row.try_get("csv_text")
                .map_err(|e| StorageError::Serialization(e.to_string()))
        })
        .transpose()
    }

    async fn clear_override(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_override WHERE id = 1")
            .execute(self.pool())
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn mark_attempted(
        &self,
        identity: &UserIdentity,
        at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        // First mark wins; re-marking after a retried finalize is harmless.
        sqlx::query(
            r"
            INSERT INTO quiz_attempts (user_name, user_password, attempted_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_name, user_password) DO NOTHING
            ",
        )
        .bind(identity.name())
        .bind(identity.password())
        .bind(at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn has_attempted(&self, identity: &UserIdentity) -> Result<bool, StorageError> {
        let row = sqlx::query(
            r"
            SELECT 1 FROM quiz_attempts
            WHERE user_name = ?1 AND user_password = ?2
            ",
        )
        .bind(identity.name())
        .bind(identity.password())
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        Ok(row.is_some())
    }
}
