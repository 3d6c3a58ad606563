//! SQLite-backed dashboard statistics.
//!
//! Nothing here is cached: every call recomputes its figures from the tables.

use chrono::{DateTime, NaiveDate, Utc};
use portal::{LastStudySession, QuickStats, StudyProgress};
use sqlx::SqlitePool;

use crate::persistence::traits::DashboardRepository;
use crate::persistence::PersistenceError;

#[derive(sqlx::FromRow)]
struct LastSessionRow {
    id: i64,
    study_activity_id: i64,
    activity_name: String,
    created_at: DateTime<Utc>,
    group_id: i64,
    group_name: String,
}

impl From<LastSessionRow> for LastStudySession {
    fn from(r: LastSessionRow) -> Self {
        Self {
            id: r.id,
            study_activity_id: r.study_activity_id,
            activity_name: r.activity_name,
            created_at: r.created_at,
            group_id: r.group_id,
            group_name: r.group_name,
        }
    }
}

/// SQLite implementation of [`DashboardRepository`].
pub struct SqliteDashboardRepository {
    pool: SqlitePool,
}

impl SqliteDashboardRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Length of the run of consecutive session days ending on `today`.
    ///
    /// Distinct session dates are ranked newest first; a date belongs to the
    /// run when its distance in days from `today` equals its rank minus one.
    /// No session today means a streak of zero. Sessions dated after `today`
    /// are ignored.
    async fn current_streak(&self, today: NaiveDate) -> Result<i64, PersistenceError> {
        let today = today.format("%Y-%m-%d").to_string();
        let streak: i64 = sqlx::query_scalar(
            r#"
            WITH study_days AS (
                SELECT DISTINCT date(created_at) AS study_date
                FROM study_sessions
                WHERE date(created_at) <= ?
            ), ranked AS (
                SELECT CAST(julianday(?) - julianday(study_date) AS INTEGER) AS days_ago,
                       ROW_NUMBER() OVER (ORDER BY study_date DESC) AS rn
                FROM study_days
            )
            SELECT COUNT(*) FROM ranked WHERE days_ago = rn - 1
            "#,
        )
        .bind(&today)
        .bind(&today)
        .fetch_one(&self.pool)
        .await?;

        Ok(streak)
    }
}

impl DashboardRepository for SqliteDashboardRepository {
    async fn last_study_session(&self) -> Result<LastStudySession, PersistenceError> {
        let row: Option<LastSessionRow> = sqlx::query_as(
            r#"
            SELECT ss.id, ss.study_activity_id, sa.name AS activity_name,
                   ss.created_at, ss.group_id, g.name AS group_name
            FROM study_sessions ss
            JOIN study_activities sa ON sa.id = ss.study_activity_id
            JOIN groups g ON g.id = ss.group_id
            ORDER BY ss.created_at DESC, ss.id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(LastStudySession::from)
            .ok_or(PersistenceError::NoStudySessions)
    }

    async fn study_progress(&self) -> Result<StudyProgress, PersistenceError> {
        // Reviews of deleted words are not counted as studied.
        let total_words_studied: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT wri.word_id)
            FROM word_review_items wri
            JOIN words w ON w.id = wri.word_id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total_available_words: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
            .fetch_one(&self.pool)
            .await?;

        Ok(StudyProgress {
            total_words_studied,
            total_available_words,
        })
    }

    async fn quick_stats(&self) -> Result<QuickStats, PersistenceError> {
        self.quick_stats_on(Utc::now().date_naive()).await
    }

    async fn quick_stats_on(&self, today: NaiveDate) -> Result<QuickStats, PersistenceError> {
        let success_rate: i64 = sqlx::query_scalar(
            r#"
            SELECT CASE
                WHEN COUNT(*) > 0
                THEN CAST(ROUND(100.0 * SUM(CASE WHEN correct = 1 THEN 1 ELSE 0 END) / COUNT(*)) AS INTEGER)
                ELSE 0
            END
            FROM word_review_items
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        let total_study_sessions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM study_sessions")
            .fetch_one(&self.pool)
            .await?;

        let total_active_groups: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM groups WHERE words_count > 0")
                .fetch_one(&self.pool)
                .await?;

        let current_streak = self.current_streak(today).await?;

        Ok(QuickStats {
            success_rate,
            total_study_sessions,
            total_active_groups,
            current_streak,
        })
    }
}
