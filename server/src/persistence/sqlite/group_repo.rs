//! SQLite-backed repository for word groups.

use portal::{
    Group, GroupSortKey, GroupWordSortKey, Page, PageRequest, RawGroupWords, SortOrder,
    StudySessionFilter, StudySessionSummary, WordStats,
};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::helpers::{count_to_total, decode_parts, group_sort_column, group_word_sort_column, order_keyword};
use super::query::push_page;
use super::session_repo::list_summaries;
use super::word_repo::WordRow;
use crate::persistence::traits::GroupRepository;
use crate::persistence::{Entity, PersistenceError};

/// Row type for group queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
struct GroupRow {
    id: i64,
    name: String,
    words_count: i64,
}

impl From<GroupRow> for Group {
    fn from(r: GroupRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            words_count: r.words_count,
        }
    }
}

/// Row type for words annotated with review counts, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
pub(crate) struct WordStatsRow {
    id: i64,
    kanji: String,
    romaji: String,
    english: String,
    parts: Option<String>,
    correct_count: i64,
    wrong_count: i64,
}

impl WordStatsRow {
    pub(crate) fn into_stats(self) -> Result<WordStats, PersistenceError> {
        Ok(WordStats {
            id: self.id,
            kanji: self.kanji,
            romaji: self.romaji,
            english: self.english,
            parts: decode_parts(self.parts.as_deref())?,
            correct_count: self.correct_count,
            wrong_count: self.wrong_count,
        })
    }
}

/// SQLite implementation of [`GroupRepository`].
pub struct SqliteGroupRepository {
    pool: SqlitePool,
}

impl SqliteGroupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find(&self, id: i64) -> Result<Option<Group>, PersistenceError> {
        let row: Option<GroupRow> =
            sqlx::query_as("SELECT id, name, words_count FROM groups WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Group::from))
    }

    async fn require(&self, id: i64) -> Result<Group, PersistenceError> {
        self.find(id)
            .await?
            .ok_or(PersistenceError::not_found(Entity::Group, id))
    }
}

impl GroupRepository for SqliteGroupRepository {
    async fn create(&self, name: &str) -> Result<Group, PersistenceError> {
        let result = sqlx::query("INSERT INTO groups (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, name, "Created group");
        Ok(Group {
            id,
            name: name.to_string(),
            words_count: 0,
        })
    }

    async fn list(
        &self,
        page: PageRequest,
        sort_by: GroupSortKey,
        order: SortOrder,
    ) -> Result<Page<Group>, PersistenceError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM groups")
            .fetch_one(&self.pool)
            .await?;

        let mut select =
            QueryBuilder::<Sqlite>::new("SELECT g.id, g.name, g.words_count FROM groups g ORDER BY ");
        select
            .push(group_sort_column(sort_by))
            .push(" ")
            .push(order_keyword(order))
            .push(", g.id");
        push_page(&mut select, page);

        let rows: Vec<GroupRow> = select.build_query_as().fetch_all(&self.pool).await?;
        Ok(Page::new(
            rows.into_iter().map(Group::from).collect(),
            count_to_total(total),
            page,
        ))
    }

    async fn get(&self, id: i64) -> Result<Group, PersistenceError> {
        self.require(id).await
    }

    async fn words(
        &self,
        group_id: i64,
        page: PageRequest,
        sort_by: GroupWordSortKey,
        order: SortOrder,
    ) -> Result<Page<WordStats>, PersistenceError> {
        self.require(group_id).await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM word_groups WHERE group_id = ?")
            .bind(group_id)
            .fetch_one(&self.pool)
            .await?;

        let mut select = QueryBuilder::<Sqlite>::new(
            r#"
            SELECT w.id, w.kanji, w.romaji, w.english, w.parts,
                   COALESCE(r.correct_count, 0) AS correct_count,
                   COALESCE(r.wrong_count, 0) AS wrong_count
            FROM words w
            JOIN word_groups wg ON wg.word_id = w.id
            LEFT JOIN (
                SELECT word_id,
                       SUM(CASE WHEN correct = 1 THEN 1 ELSE 0 END) AS correct_count,
                       SUM(CASE WHEN correct = 0 THEN 1 ELSE 0 END) AS wrong_count
                FROM word_review_items
                GROUP BY word_id
            ) r ON r.word_id = w.id
            WHERE wg.group_id = "#,
        );
        select
            .push_bind(group_id)
            .push(" ORDER BY ")
            .push(group_word_sort_column(sort_by))
            .push(" ")
            .push(order_keyword(order))
            .push(", w.id");
        push_page(&mut select, page);

        let rows: Vec<WordStatsRow> = select.build_query_as().fetch_all(&self.pool).await?;
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

    async fn words_raw(&self, group_id: i64) -> Result<RawGroupWords, PersistenceError> {
        let group = self.require(group_id).await?;

        let rows: Vec<WordRow> = sqlx::query_as(
            r#"
            SELECT w.id, w.kanji, w.romaji, w.english, w.parts
            FROM words w
            JOIN word_groups wg ON wg.word_id = w.id
            WHERE wg.group_id = ?
            ORDER BY w.id
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        let words = rows
            .into_iter()
            .map(WordRow::into_word)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RawGroupWords {
            group_id: group.id,
            group_name: group.name,
            words,
        })
    }

    async fn study_sessions(
        &self,
        group_id: i64,
        page: PageRequest,
    ) -> Result<Page<StudySessionSummary>, PersistenceError> {
        self.require(group_id).await?;
        list_summaries(&self.pool, &StudySessionFilter::default().group(group_id), page).await
    }
}
