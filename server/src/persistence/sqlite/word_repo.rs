//! SQLite-backed repository for words and group membership.

use portal::{NewWord, Page, PageRequest, Word, WordFilter};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::helpers::{count_to_total, decode_parts, encode_parts};
use super::query::{push_page, Conditions};
use crate::persistence::traits::WordRepository;
use crate::persistence::{Entity, PersistenceError};

/// Row type for word queries, mapped via `sqlx::FromRow`.
#[derive(sqlx::FromRow)]
pub(crate) struct WordRow {
    id: i64,
    kanji: String,
    romaji: String,
    english: String,
    parts: Option<String>,
}

impl WordRow {
    pub(crate) fn into_word(self) -> Result<Word, PersistenceError> {
        Ok(Word {
            id: self.id,
            kanji: self.kanji,
            romaji: self.romaji,
            english: self.english,
            parts: decode_parts(self.parts.as_deref())?,
        })
    }
}

/// SQLite implementation of [`WordRepository`].
pub struct SqliteWordRepository {
    pool: SqlitePool,
}

impl SqliteWordRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl WordRepository for SqliteWordRepository {
    async fn create(&self, word: &NewWord) -> Result<Word, PersistenceError> {
        let parts = encode_parts(&word.parts)?;

        let result = sqlx::query(
            "INSERT INTO words (kanji, romaji, english, parts) VALUES (?, ?, ?, ?)",
        )
        .bind(&word.kanji)
        .bind(&word.romaji)
        .bind(&word.english)
        .bind(parts)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        tracing::debug!(id, kanji = %word.kanji, "Created word");
        Ok(word.clone().into_word(id))
    }

    async fn get(&self, id: i64) -> Result<Word, PersistenceError> {
        let row: Option<WordRow> = sqlx::query_as(
            "SELECT id, kanji, romaji, english, parts FROM words WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(PersistenceError::not_found(Entity::Word, id))?
            .into_word()
    }

    async fn update(&self, word: &Word) -> Result<(), PersistenceError> {
        let parts = encode_parts(&word.parts)?;

        let result = sqlx::query(
            "UPDATE words SET kanji = ?, romaji = ?, english = ?, parts = ? WHERE id = ?",
        )
        .bind(&word.kanji)
        .bind(&word.romaji)
        .bind(&word.english)
        .bind(parts)
        .bind(word.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::not_found(Entity::Word, word.id));
        }
        tracing::debug!(id = word.id, "Updated word");
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), PersistenceError> {
        // Memberships go with the word (ON DELETE CASCADE); reviews stay.
        let result = sqlx::query("DELETE FROM words WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(id, deleted = result.rows_affected(), "Deleted word");
        Ok(())
    }

    async fn list(&self, filter: &WordFilter, page: PageRequest) -> Result<Page<Word>, PersistenceError> {
        let conditions = Conditions::for_words(filter);

        let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM words w");
        conditions.push_where(&mut count);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Sqlite>::new(
            "SELECT w.id, w.kanji, w.romaji, w.english, w.parts FROM words w",
        );
        conditions.push_where(&mut select);
        select.push(" ORDER BY w.id");
        push_page(&mut select, page);

        let rows: Vec<WordRow> = select.build_query_as().fetch_all(&self.pool).await?;
        let words = rows
            .into_iter()
            .map(WordRow::into_word)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page::new(words, count_to_total(total), page))
    }

    async fn add_to_group(&self, word_id: i64, group_id: i64) -> Result<(), PersistenceError> {
        // A missing word or group trips the foreign keys and surfaces as
        // `Referential`. An existing pair is ignored, which also keeps the
        // count trigger from firing twice.
        let result = sqlx::query("INSERT OR IGNORE INTO word_groups (word_id, group_id) VALUES (?, ?)")
            .bind(word_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(word_id, group_id, added = result.rows_affected(), "Added word to group");
        Ok(())
    }

    async fn remove_from_group(&self, word_id: i64, group_id: i64) -> Result<(), PersistenceError> {
        let result = sqlx::query("DELETE FROM word_groups WHERE word_id = ? AND group_id = ?")
            .bind(word_id)
            .bind(group_id)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            word_id,
            group_id,
            removed = result.rows_affected(),
            "Removed word from group"
        );
        Ok(())
    }
}
