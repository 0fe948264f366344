use mehfil_core::model::{AdminIdentity, UserIdentity};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::map_sqlx_err;
use crate::repository::{SessionRepository, StorageError};

#[async_trait::async_trait]
impl SessionRepository for SqliteRepository {
    async fn save_user(&self, identity: &UserIdentity) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_sessions (scope, user_name, user_password, admin_email)
            VALUES ('user', ?1, ?2, NULL)
            ON CONFLICT(scope) DO UPDATE SET
                user_name = excluded.user_name,
                user_password = excluded.user_password
            ",
        )
        .bind(identity.name())
        .bind(identity.password())
        .execute(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn load_user(&self) -> Result<Option<UserIdentity>, StorageError> {
        let row = sqlx::query(
            "SELECT user_name, user_password FROM app_sessions WHERE scope = 'user'",
        )
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let name: Option<String> = row
            .try_get("user_name")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        let password: Option<String> = row
            .try_get("user_password")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        match (name, password) {
            (Some(name), Some(password)) => UserIdentity::new(name, password)
                .map(Some)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            _ => Err(StorageError::Serialization(
                "user session row missing credentials".into(),
            )),
        }
    }

    async fn clear_user(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM app_sessions WHERE scope = 'user'")
            .execute(self.pool())
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }

    async fn save_admin(&self, identity: &AdminIdentity) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO app_sessions (scope, user_name, user_password, admin_email)
            VALUES ('admin', NULL, NULL, ?1)
            ON CONFLICT(scope) DO UPDATE SET
                admin_email = excluded.admin_email
            ",
        )
        .bind(identity.email())
        .execute(self.pool())
        .await
        .map_err(map_sqlx_err)?;

        Ok(())
    }

    async fn load_admin(&self) -> Result<Option<AdminIdentity>, StorageError> {
        let row = sqlx::query("SELECT admin_email FROM app_sessions WHERE scope = 'admin'")
            .fetch_optional(self.pool())
            .await
            .map_err(map_sqlx_err)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let email: Option<String> = row
            .try_get("admin_email")
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        email
            .ok_or_else(|| StorageError::Serialization("admin session row missing email".into()))
            .and_then(|email| {
                AdminIdentity::new(email)
                    .map(Some)
                    .map_err(|e| StorageError::Serialization(e.to_string()))
            })
    }

    async fn clear_admin(&self) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM app_sessions WHERE scope = 'admin'")
            .execute(self.pool())
            .await
            .map_err(map_sqlx_err)?;
        Ok(())
    }
}
