//! SQLite-backed repository for study sessions and word reviews.

use chrono::{DateTime, Utc};
use portal::{
    NewStudySession, NewWordReview, Page, PageRequest, StudySession, StudySessionFilter,
    StudySessionSummary, WordReviewItem, WordStats,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::group_repo::WordStatsRow;
use super::helpers::{count_to_total, encode_timestamp, normalize_timestamp};
use super::query::{push_page, Conditions};
use crate::persistence::traits::StudySessionRepository;
use crate::persistence::{Entity, PersistenceError};

/// Sessions joined with their names and review aggregates. Callers append the
/// `WHERE` clause, then `GROUP BY ss.id`.
const SUMMARY_SELECT: &str = r#"
    SELECT ss.id, ss.group_id, ss.study_activity_id,
           sa.name AS activity_name,
           g.name AS group_name,
           ss.created_at AS start_time,
           COALESCE(MAX(wri.created_at), ss.created_at) AS end_time,
           COUNT(wri.id) AS total_words_reviewed
    FROM study_sessions ss
    JOIN study_activities sa ON sa.id = ss.study_activity_id
    JOIN groups g ON g.id = ss.group_id
    LEFT JOIN word_review_items wri ON wri.study_session_id = ss.id
"#;

/// Row type for session summaries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    group_id: i64,
    study_activity_id: i64,
    activity_name: String,
    group_name: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    total_words_reviewed: i64,
}

impl From<SummaryRow> for StudySessionSummary {
    fn from(r: SummaryRow) -> Self {
        Self {
            id: r.id,
            group_id: r.group_id,
            study_activity_id: r.study_activity_id,
            activity_name: r.activity_name,
            group_name: r.group_name,
            start_time: r.start_time,
            end_time: r.end_time,
            total_words_reviewed: r.total_words_reviewed,
        }
    }
}

/// Row type for review queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    word_id: i64,
    study_session_id: i64,
    correct: bool,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for WordReviewItem {
    fn from(r: ReviewRow) -> Self {
        Self {
            id: r.id,
            word_id: r.word_id,
            study_session_id: r.study_session_id,
            correct: r.correct,
            created_at: r.created_at,
        }
    }
}

/// Paged session summaries, newest first. Shared with the group listing.
pub(crate) async fn list_summaries(
    pool: &SqlitePool,
    filter: &StudySessionFilter,
    page: PageRequest,
) -> Result<Page<StudySessionSummary>, PersistenceError> {
    let conditions = Conditions::for_sessions(filter);

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM study_sessions ss");
    conditions.push_where(&mut count);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let mut select = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
    conditions.push_where(&mut select);
    select.push(" GROUP BY ss.id ORDER BY ss.created_at DESC, ss.id DESC");
    push_page(&mut select, page);

    let rows: Vec<SummaryRow> = select.build_query_as().fetch_all(pool).await?;
    Ok(Page::new(
        rows.into_iter().map(StudySessionSummary::from).collect(),
        count_to_total(total),
        page,
    ))
}

/// SQLite implementation of [`StudySessionRepository`].
pub struct SqliteStudySessionRepository {
    pool: SqlitePool,
}

impl SqliteStudySessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn require(&self, session_id: i64) -> Result<(), PersistenceError> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM study_sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await?;
        exists
            .map(|_| ())
            .ok_or(PersistenceError::not_found(Entity::StudySession, session_id))
    }

    /// Name the parent a rejected review pointed at, session first.
    async fn missing_parent(&self, review: &NewWordReview) -> Result<PersistenceError, PersistenceError> {
        let session: Option<i64> = sqlx::query_scalar("SELECT 1 FROM study_sessions WHERE id = ?")
            .bind(review.study_session_id)
            .fetch_optional(&self.pool)
            .await?;
        if session.is_none() {
            return Ok(PersistenceError::MissingParent {
                entity: Entity::StudySession,
                id: review.study_session_id,
            });
        }
        Ok(PersistenceError::MissingParent {
            entity: Entity::Word,
            id: review.word_id,
        })
    }
}

impl StudySessionRepository for SqliteStudySessionRepository {
    async fn create(&self, session: &NewStudySession) -> Result<StudySession, PersistenceError> {
        let created_at = normalize_timestamp(session.created_at);

        let result = sqlx::query(
            "INSERT INTO study_sessions (group_id, study_activity_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(session.group_id)
        .bind(session.study_activity_id)
        .bind(encode_timestamp(&created_at))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(
            id,
            group_id = session.group_id,
            study_activity_id = session.study_activity_id,
            "Created study session"
        );
        Ok(NewStudySession {
            created_at,
            ..*session
        }
        .into_session(id))
    }

    async fn create_word_review(&self, review: &NewWordReview) -> Result<WordReviewItem, PersistenceError> {
        let created_at = normalize_timestamp(review.created_at);

        // The parent checks and the insert are one statement, so a concurrent
        // delete cannot slip in between them.
        let result = sqlx::query(
            r#"
            INSERT INTO word_review_items (word_id, study_session_id, correct, created_at)
            SELECT ?, ?, ?, ?
            WHERE EXISTS (SELECT 1 FROM study_sessions WHERE id = ?)
              AND EXISTS (SELECT 1 FROM words WHERE id = ?)
            "#,
        )
        .bind(review.word_id)
        .bind(review.study_session_id)
        .bind(review.correct)
        .bind(encode_timestamp(&created_at))
        .bind(review.study_session_id)
        .bind(review.word_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(self.missing_parent(review).await?);
        }

        let id = result.last_insert_rowid();
        tracing::debug!(
            id,
            study_session_id = review.study_session_id,
            word_id = review.word_id,
            correct = review.correct,
            "Recorded word review"
        );
        Ok(NewWordReview {
            created_at,
            ..*review
        }
        .into_review(id))
    }

    async fn list(
        &self,
        filter: &StudySessionFilter,
        page: PageRequest,
    ) -> Result<Page<StudySessionSummary>, PersistenceError> {
        list_summaries(&self.pool, filter, page).await
    }

    async fn words(&self, session_id: i64, page: PageRequest) -> Result<Page<WordStats>, PersistenceError> {
        self.require(session_id).await?;

        // Reviews of deleted words have nothing to join and drop out of both
        // the count and the page.
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(DISTINCT w.id)
            FROM word_review_items wri
            JOIN words w ON w.id = wri.word_id
            WHERE wri.study_session_id = ?
            "#,
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<WordStatsRow> = sqlx::query_as(
            r#"
            SELECT w.id, w.kanji, w.romaji, w.english, w.parts,
                   SUM(CASE WHEN wri.correct = 1 THEN 1 ELSE 0 END) AS correct_count,
                   SUM(CASE WHEN wri.correct = 0 THEN 1 ELSE 0 END) AS wrong_count
            FROM word_review_items wri
            JOIN words w ON w.id = wri.word_id
            WHERE wri.study_session_id = ?
            GROUP BY w.id
            ORDER BY w.id
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(session_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(WordStatsRow::into_stats)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(
            items,
            count_to_total(total),
            page,
        ))
    }

    async fn details(&self, session_id: i64) -> Result<StudySessionSummary, PersistenceError> {
        let mut select = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
        select
            .push(" WHERE ss.id = ")
            .push_bind(session_id)
            .push(" GROUP BY ss.id");

        let row: Option<SummaryRow> = select.build_query_as().fetch_optional(&self.pool).await?;
        row.map(StudySessionSummary::from)
            .ok_or(PersistenceError::not_found(Entity::StudySession, session_id))
    }

    async fn reviews(&self, session_id: i64) -> Result<Vec<WordReviewItem>, PersistenceError> {
        self.require(session_id).await?;

        let rows: Vec<ReviewRow> = sqlx::query_as(
            r#"
            SELECT id, word_id, study_session_id, correct, created_at
            FROM word_review_items
            WHERE study_session_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(WordReviewItem::from).collect())
    }
}
