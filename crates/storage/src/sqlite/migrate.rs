use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

/// Runs a single, consolidated migration for the current schema.
///
/// Creates the full schema: day contents with their items, notes, the quiz
/// override, event settings, results, attempt flags, and sign-in sessions.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: full schema.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS day_contents (
                    day INTEGER PRIMARY KEY CHECK (day >= 0),
                    date_label TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS content_items (
                    day INTEGER NOT NULL,
                    position INTEGER NOT NULL CHECK (position >= 0),
                    kind TEXT NOT NULL,
                    url TEXT,
                    file_name TEXT,
                    file_data BLOB,
                    PRIMARY KEY (day, position),
                    FOREIGN KEY (day) REFERENCES day_contents(day) ON DELETE CASCADE
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS notes (
                    day INTEGER NOT NULL,
                    user_name TEXT NOT NULL,
                    user_password TEXT NOT NULL,
                    body TEXT NOT NULL,
                    PRIMARY KEY (day, user_name, user_password)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_override (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    csv_text TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS event_settings (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    main_quiz_visible INTEGER NOT NULL,
                    leaderboard_visible INTEGER NOT NULL,
                    external_form_url TEXT,
                    external_form_visible INTEGER NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_results (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    user_name TEXT NOT NULL,
                    user_password TEXT NOT NULL,
                    score INTEGER NOT NULL CHECK (score >= 0),
                    submitted_at TEXT NOT NULL
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS quiz_attempts (
                    user_name TEXT NOT NULL,
                    user_password TEXT NOT NULL,
                    attempted_at TEXT NOT NULL,
                    PRIMARY KEY (user_name, user_password)
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE TABLE IF NOT EXISTS app_sessions (
                    scope TEXT PRIMARY KEY CHECK (scope IN ('user', 'admin')),
                    user_name TEXT,
                    user_password TEXT,
                    admin_email TEXT
                );
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                CREATE INDEX IF NOT EXISTS idx_quiz_results_score
                    ON quiz_results (score DESC, id ASC);
            ",
        )
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
