//! SQLite connection pool and migration runner.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::config::DatabaseConfig;
use crate::persistence::PersistenceError;

/// Holds a connection pool to the SQLite database.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (or create) the database described by `config`, run migrations,
    /// and return a ready-to-use `Database`.
    pub async fn open(config: &DatabaseConfig) -> Result<Self, PersistenceError> {
        if let Some(parent) = config.path.parent() {
            std::fs::create_dir_all(parent).map_err(PersistenceError::Io)?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .idle_timeout(config.idle_timeout)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(sqlx::Error::from)?;

        tracing::info!(
            path = %config.path.display(),
            max_connections = config.max_connections,
            "Opened database"
        );

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Create an in-memory database for testing. Migrations are applied.
    #[cfg(test)]
    pub async fn new_in_memory() -> Result<Self, PersistenceError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(sqlx::Error::from)?
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(sqlx::Error::from)?;

        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Run embedded migrations from `server/migrations/`. Each file is applied
    /// in its own transaction; already-applied files are skipped.
    async fn run_migrations(&self) -> Result<(), PersistenceError> {
        let migrator = sqlx::migrate!("./migrations");
        migrator
            .run(&self.pool)
            .await
            .map_err(|e| PersistenceError::Migration(e.to_string()))?;
        tracing::info!(migrations = migrator.iter().count(), "Schema is up to date");
        Ok(())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_in_memory() {
        let db = Database::new_in_memory().await.unwrap();
        let row: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(row.0, 1);
    }

    #[tokio::test]
    async fn test_migrations_create_tables() {
        let db = Database::new_in_memory().await.unwrap();
        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
                .fetch_all(db.pool())
                .await
                .unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        for table in [
            "words",
            "groups",
            "word_groups",
            "study_activities",
            "study_sessions",
            "word_review_items",
        ] {
            assert!(names.contains(&table), "missing table {table}");
        }
    }

    #[tokio::test]
    async fn test_migrations_install_count_triggers() {
        let db = Database::new_in_memory().await.unwrap();
        let triggers: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type='trigger' ORDER BY name")
                .fetch_all(db.pool())
                .await
                .unwrap();
        let names: Vec<&str> = triggers.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(names, vec!["word_groups_count_delete", "word_groups_count_insert"]);
    }

    #[tokio::test]
    async fn test_open_file_based_twice() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::at(dir.path().join("nested").join("test.db"));

        let db = Database::open(&config).await.unwrap();
        sqlx::query("INSERT INTO groups (name) VALUES ('Verbs')")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;
        assert!(config.path.exists());

        // Reopening must not re-apply migrations or lose data.
        let db = Database::open(&config).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_open_path_with_url_characters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("what?#1.db");
        let config = DatabaseConfig::at(&path);

        let db = Database::open(&config).await.unwrap();
        sqlx::query("INSERT INTO groups (name) VALUES ('Verbs')")
            .execute(db.pool())
            .await
            .unwrap();
        db.close().await;

        assert!(path.exists());
        assert!(!dir.path().join("what").exists());
    }
}
