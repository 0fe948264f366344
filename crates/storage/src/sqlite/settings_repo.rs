use async_trait::async_trait;
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::map_sqlx_err;
use crate::repository::{SettingsRepository, StorageError};
use mehfil_core::model::EventSettings;

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<EventSettings>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT
                main_quiz_visible,
                leaderboard_visible,
                external_form_url,
                external_form_visible
            FROM event_settings
            WHERE id = 1
            ",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let main_quiz_visible: bool = row
            .try_get("main_quiz_visible")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let leaderboard_visible: bool = row
            .try_get("leaderboard_visible")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let external_form_url: Option<String> = row
            .try_get("external_form_url")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        let external_form_visible: bool = row
            .try_get("external_form_visible")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        EventSettings::from_persisted(
            main_quiz_visible,
            leaderboard_visible,
            external_form_url,
            external_form_visible,
        )
        .map(Some)
        .map_err(|err| StorageError::Serialization(err.to_string()))
    }

    async fn save_settings(&self, settings: &EventSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO event_settings (
                id,
                main_quiz_visible,
                leaderboard_visible,
                external_form_url,
                external_form_visible
            )
            VALUES (1, ?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO UPDATE SET
                main_quiz_visible = excluded.main_quiz_visible,
                leaderboard_visible = excluded.leaderboard_visible,
                external_form_url = excluded.external_form_url,
                external_form_visible = excluded.external_form_visible
            ",
        )
        .bind(settings.main_quiz_visible())
        .bind(settings.leaderboard_visible())
        .bind(settings.external_form_url())
        .bind(settings.external_form_visible())
        .execute(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }
}
