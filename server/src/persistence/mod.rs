//! Persistence layer for the vocabulary backend.
//!
//! [`traits`] defines one async repository trait per aggregate; [`sqlite`]
//! implements them on top of a shared `sqlx::SqlitePool`. Every operation is a
//! self-contained call against the pool. Dropping the returned future aborts
//! the query, which is how callers impose a deadline (see [`with_deadline`]).

pub mod sqlite;
pub mod traits;

use std::fmt;
use std::future::Future;
use std::time::Duration;

use portal::ValidationError;

/// The entities a lookup can fail to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Word,
    Group,
    StudyActivity,
    StudySession,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Entity::Word => "word",
            Entity::Group => "group",
            Entity::StudyActivity => "study activity",
            Entity::StudySession => "study session",
        })
    }
}

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("no study sessions recorded yet")]
    NoStudySessions,
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("referenced {entity} {id} does not exist")]
    MissingParent { entity: Entity, id: i64 },
    #[error("seed word {word} names unknown group {group}")]
    UnknownSeedGroup { word: String, group: String },
    #[error("seed group {0} is listed more than once")]
    DuplicateSeedGroup(String),
    #[error("foreign key violation: {0}")]
    Referential(String),
    #[error("storage error: {0}")]
    Storage(sqlx::Error),
    #[error("migration failed: {0}")]
    Migration(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),
}

impl From<sqlx::Error> for PersistenceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_foreign_key_violation() {
                return PersistenceError::Referential(db.message().to_string());
            }
        }
        PersistenceError::Storage(err)
    }
}

/// How an error is surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The requested entity does not exist (404-like). Not retried.
    NotFound,
    /// Caller input failed shape checks (400-like). Never retried.
    Validation,
    /// The store failed (500-like). Only idempotent reads may be retried.
    Storage,
    /// A write referenced a missing parent. Not retried.
    Referential,
}

impl PersistenceError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PersistenceError::NotFound { .. } | PersistenceError::NoStudySessions => {
                ErrorClass::NotFound
            }
            PersistenceError::Validation(_)
            | PersistenceError::UnknownSeedGroup { .. }
            | PersistenceError::DuplicateSeedGroup(_) => ErrorClass::Validation,
            PersistenceError::MissingParent { .. } | PersistenceError::Referential(_) => {
                ErrorClass::Referential
            }
            PersistenceError::Storage(_)
            | PersistenceError::Migration(_)
            | PersistenceError::Io(_)
            | PersistenceError::Json(_)
            | PersistenceError::Timeout(_) => ErrorClass::Storage,
        }
    }

    pub(crate) fn not_found(entity: Entity, id: i64) -> Self {
        PersistenceError::NotFound { entity, id }
    }
}

/// Run a repository call under a deadline. Expiry drops (and so cancels) the
/// in-flight query.
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, PersistenceError>
where
    F: Future<Output = Result<T, PersistenceError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(PersistenceError::Timeout(deadline)),
    }
}
