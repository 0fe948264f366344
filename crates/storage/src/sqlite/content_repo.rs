use mehfil_core::model::{DayContent, DayNumber};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{day_from_i64, day_i64, map_item_row, map_sqlx_err};
use crate::repository::{ContentItemRecord, ContentRepository, DaySummary, StorageError};

#[async_trait::async_trait]
impl ContentRepository for SqliteRepository {
    async fn upsert_day(&self, content: &DayContent) -> Result<(), StorageError> {
        // One transaction per save: a failed write (including a full disk)
        // must leave the previously saved day untouched.
        let mut tx = self.pool().begin().await.map_err(map_sqlx_err)?;
        let day = day_i64(content.day());

        sqlx::query(
            r"
            INSERT INTO day_contents (day, date_label)
            VALUES (?1, ?2)
            ON CONFLICT(day) DO UPDATE SET
                date_label = excluded.date_label
            ",
        )
        .bind(day)
        .bind(content.date_label())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_err)?;

        sqlx::query("DELETE FROM content_items WHERE day = ?1")
            .bind(day)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

        for (position, item) in content.items().iter().enumerate() {
            let record = ContentItemRecord::from_item(item);
            let position = i64::try_from(position)
                .map_err(|_| StorageError::Serialization("item position overflow".into()))?;
            sqlx::query(
                r"
                INSERT INTO content_items (day, position, kind, url, file_name, file_data)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
            )
            .bind(day)
            .bind(position)
            .bind(record.kind)
            .bind(record.url)
            .bind(record.file_name)
            .bind(record.file_data)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
        }

        tx.commit().await.map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn get_day(&self, day: DayNumber) -> Result<Option<DayContent>, StorageError> {
        let row = sqlx::query("SELECT day, date_label FROM day_contents WHERE day = ?1")
            .bind(day_i64(day))
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let date_label: Option<String> = row
            .try_get("date_label")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let item_rows = sqlx::query(
            r"
            SELECT kind, url, file_name, file_data
            FROM content_items
            WHERE day = ?1
            ORDER BY position ASC
            ",
        )
        .bind(day_i64(day))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        let mut items = Vec::with_capacity(item_rows.len());
        for item_row in &item_rows {
            items.push(map_item_row(item_row)?);
        }

        Ok(Some(DayContent::new(day, date_label, items)))
    }

    async fn list_days(&self) -> Result<Vec<DaySummary>, StorageError> {
        let rows = sqlx::query("SELECT day, date_label FROM day_contents ORDER BY day ASC")
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_err)?;

        let mut days = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_day: i64 = row
                .try_get("day")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            let date_label: Option<String> = row
                .try_get("date_label")
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            days.push(DaySummary {
                day: day_from_i64(raw_day)?,
                date_label,
            });
        }
        Ok(days)
    }
}
