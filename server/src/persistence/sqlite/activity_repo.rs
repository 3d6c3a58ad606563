//! SQLite-backed repository for the study activity catalog.

use portal::{Page, PageRequest, StudyActivity, StudyActivityDetails};
use sqlx::SqlitePool;

use super::helpers::count_to_total;
use crate::persistence::traits::StudyActivityRepository;
use crate::persistence::{Entity, PersistenceError};

#[derive(sqlx::FromRow)]
struct ActivityRow {
    id: i64,
    name: String,
    url: String,
}

impl From<ActivityRow> for StudyActivity {
    fn from(r: ActivityRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            url: r.url,
        }
    }
}

/// SQLite implementation of [`StudyActivityRepository`].
pub struct SqliteStudyActivityRepository {
    pool: SqlitePool,
}

impl SqliteStudyActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl StudyActivityRepository for SqliteStudyActivityRepository {
    async fn list(&self, page: PageRequest) -> Result<Page<StudyActivity>, PersistenceError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_activities")
            .fetch_one(&self.pool)
            .await?;

        let rows: Vec<ActivityRow> = sqlx::query_as(
            "SELECT id, name, url FROM study_activities ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(
            rows.into_iter().map(StudyActivity::from).collect(),
            count_to_total(total),
            page,
        ))
    }

    async fn get(&self, id: i64) -> Result<StudyActivity, PersistenceError> {
        let row: Option<ActivityRow> =
            sqlx::query_as("SELECT id, name, url FROM study_activities WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(StudyActivity::from)
            .ok_or(PersistenceError::not_found(Entity::StudyActivity, id))
    }

    async fn details(&self, id: i64) -> Result<StudyActivityDetails, PersistenceError> {
        // One row per existing activity, so an activity without sessions
        // still reports zero and a missing one yields no row at all.
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT COUNT(ss.id)
            FROM study_activities sa
            LEFT JOIN study_sessions ss ON ss.study_activity_id = sa.id
            WHERE sa.id = ?
            GROUP BY sa.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        total
            .map(|total_sessions| StudyActivityDetails { total_sessions })
            .ok_or(PersistenceError::not_found(Entity::StudyActivity, id))
    }
}
