use mehfil_core::model::ScoreRecord;

use super::SqliteRepository;
use super::mapping::{map_result_row, map_sqlx_err};
use crate::repository::{ResultRepository, StorageError};

#[async_trait::async_trait]
impl ResultRepository for SqliteRepository {
    async fn append_result(&self, record: &ScoreRecord) -> Result<i64, StorageError> {
        let done = sqlx::query(
            r"
            INSERT INTO quiz_results (user_name, user_password, score, submitted_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
        )
        .bind(record.identity().name())
        .bind(record.identity().password())
        .bind(i64::from(record.score()))
        .bind(record.submitted_at())
        .execute(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        Ok(done.last_insert_rowid())
    }

    async fn list_results(&self) -> Result<Vec<ScoreRecord>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT user_name, user_password, score, submitted_at
            FROM quiz_results
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in &rows {
            results.push(map_result_row(row)?);
        }
        Ok(results)
    }

    async fn clear_results(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM quiz_results")
            .execute(self.pool())
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
