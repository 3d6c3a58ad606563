//! One-time import of the starter vocabulary from JSON files.
//!
//! A seed directory holds `study_activities.json`, `groups.json` and
//! `words.json`. Everything is inserted in a single transaction, and the
//! import is skipped when the `words` table already has rows. The emptiness
//! check runs inside that transaction, so of two concurrent imports at most
//! one commits; the other either sees the words or fails with a storage error.

use std::collections::HashMap;
use std::path::Path;

use portal::models::empty_parts;
use portal::NewWord;
use serde::Deserialize;
use serde_json::Value;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::info;

use super::helpers::encode_parts;
use crate::persistence::PersistenceError;

const ACTIVITIES_FILE: &str = "study_activities.json";
const GROUPS_FILE: &str = "groups.json";
const WORDS_FILE: &str = "words.json";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub skipped: bool,
    pub study_activities: u64,
    pub groups: u64,
    pub words: u64,
    pub memberships: u64,
}

#[derive(Debug, Deserialize)]
struct SeedActivity {
    name: String,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct SeedGroup {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SeedWord {
    kanji: String,
    romaji: String,
    english: String,
    #[serde(default = "empty_parts")]
    parts: Value,
    #[serde(default)]
    groups: Vec<String>,
}

pub async fn seed_from_dir(pool: &SqlitePool, dir: &Path) -> Result<SeedReport, PersistenceError> {
    info!(seed_dir = %dir.display(), "Starting seed import");

    let mut tx = pool.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM words")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        info!(words = existing, "Database already has words, skipping seed import");
        tx.rollback().await?;
        return Ok(SeedReport {
            skipped: true,
            ..SeedReport::default()
        });
    }

    let activities: Vec<SeedActivity> = load(dir, ACTIVITIES_FILE)?;
    let groups: Vec<SeedGroup> = load(dir, GROUPS_FILE)?;
    let words: Vec<SeedWord> = load(dir, WORDS_FILE)?;

    info!(
        study_activities = activities.len(),
        groups = groups.len(),
        words = words.len(),
        "Loaded seed records"
    );

    insert_activities(&mut tx, &activities).await?;
    let group_ids = insert_groups(&mut tx, &groups).await?;
    let memberships = insert_words(&mut tx, &words, &group_ids).await?;

    tx.commit().await?;

    let report = SeedReport {
        skipped: false,
        study_activities: activities.len() as u64,
        groups: groups.len() as u64,
        words: words.len() as u64,
        memberships,
    };

    info!(
        study_activities = report.study_activities,
        groups = report.groups,
        words = report.words,
        memberships = report.memberships,
        "Seed import completed"
    );

    Ok(report)
}

fn load<T: serde::de::DeserializeOwned>(dir: &Path, file: &str) -> Result<Vec<T>, PersistenceError> {
    let raw = std::fs::read_to_string(dir.join(file))?;
    Ok(serde_json::from_str(&raw)?)
}

async fn insert_activities(
    tx: &mut Transaction<'_, Sqlite>,
    activities: &[SeedActivity],
) -> Result<(), PersistenceError> {
    for activity in activities {
        sqlx::query("INSERT INTO study_activities (name, url) VALUES (?, ?)")
            .bind(&activity.name)
            .bind(&activity.url)
            .execute(&mut **tx)
            .await?;
    }
    Ok(())
}

async fn insert_groups(
    tx: &mut Transaction<'_, Sqlite>,
    groups: &[SeedGroup],
) -> Result<HashMap<String, i64>, PersistenceError> {
    let mut ids = HashMap::with_capacity(groups.len());
    for group in groups {
        if ids.contains_key(&group.name) {
            return Err(PersistenceError::DuplicateSeedGroup(group.name.clone()));
        }
        let result = sqlx::query("INSERT INTO groups (name) VALUES (?)")
            .bind(&group.name)
            .execute(&mut **tx)
            .await?;
        ids.insert(group.name.clone(), result.last_insert_rowid());
    }
    Ok(ids)
}

/// Insert every word and its memberships. Returns the number of memberships.
async fn insert_words(
    tx: &mut Transaction<'_, Sqlite>,
    words: &[SeedWord],
    group_ids: &HashMap<String, i64>,
) -> Result<u64, PersistenceError> {
    let mut memberships = 0;
    for word in words {
        NewWord::new(&word.kanji, &word.romaji, &word.english).validate()?;

        let result = sqlx::query("INSERT INTO words (kanji, romaji, english, parts) VALUES (?, ?, ?, ?)")
            .bind(&word.kanji)
            .bind(&word.romaji)
            .bind(&word.english)
            .bind(encode_parts(&word.parts)?)
            .execute(&mut **tx)
            .await?;
        let word_id = result.last_insert_rowid();

        for name in &word.groups {
            let group_id = group_ids.get(name).ok_or_else(|| PersistenceError::UnknownSeedGroup {
                word: word.kanji.clone(),
                group: name.clone(),
            })?;
            let inserted = sqlx::query("INSERT OR IGNORE INTO word_groups (word_id, group_id) VALUES (?, ?)")
                .bind(word_id)
                .bind(group_id)
                .execute(&mut **tx)
                .await?;
            memberships += inserted.rows_affected();
        }
    }
    Ok(memberships)
}
