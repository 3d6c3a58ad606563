//! Records stored in, and derived from, the vocabulary database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A vocabulary entry.
///
/// `parts` is owned by the client: the store keeps it as one opaque JSON value
/// and never looks inside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Word {
    pub id: i64,
    pub kanji: String,
    pub romaji: String,
    pub english: String,
    pub parts: Value,
}

/// Input for creating a [`Word`]. The id is assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewWord {
    pub kanji: String,
    pub romaji: String,
    pub english: String,
    #[serde(default = "empty_parts")]
    pub parts: Value,
}

impl NewWord {
    pub fn new(kanji: impl Into<String>, romaji: impl Into<String>, english: impl Into<String>) -> Self {
        Self {
            kanji: kanji.into(),
            romaji: romaji.into(),
            english: english.into(),
            parts: empty_parts(),
        }
    }

    pub fn with_parts(mut self, parts: Value) -> Self {
        self.parts = parts;
        self
    }

    /// Attach the id assigned on insert.
    pub fn into_word(self, id: i64) -> Word {
        Word {
            id,
            kanji: self.kanji,
            romaji: self.romaji,
            english: self.english,
            parts: self.parts,
        }
    }
}

/// The value `parts` takes when a word carries no metadata.
pub fn empty_parts() -> Value {
    Value::Object(serde_json::Map::new())
}

/// A named collection of words.
///
/// `words_count` is a cached member count kept on the group row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    pub id: i64,
    pub name: String,
    #[serde(rename = "word_count")]
    pub words_count: i64,
}

/// A word annotated with how often it was answered correctly or wrongly.
///
/// Whether the counts cover all history or a single session depends on the
/// listing that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordStats {
    pub id: i64,
    pub kanji: String,
    pub romaji: String,
    pub english: String,
    #[serde(default = "empty_parts")]
    pub parts: Value,
    pub correct_count: i64,
    pub wrong_count: i64,
}

/// Every word of a group including `parts`, for export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawGroupWords {
    pub group_id: i64,
    pub group_name: String,
    pub words: Vec<Word>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyActivity {
    pub id: i64,
    pub name: String,
    #[serde(rename = "thumbnail_url")]
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyActivityDetails {
    pub total_sessions: i64,
}

/// One study event: group G studied with activity A at time T.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudySession {
    pub id: i64,
    pub group_id: i64,
    pub study_activity_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewStudySession {
    pub group_id: i64,
    pub study_activity_id: i64,
    pub created_at: DateTime<Utc>,
}

impl NewStudySession {
    /// A session starting now.
    pub fn now(group_id: i64, study_activity_id: i64) -> Self {
        Self {
            group_id,
            study_activity_id,
            created_at: Utc::now(),
        }
    }

    pub fn into_session(self, id: i64) -> StudySession {
        StudySession {
            id,
            group_id: self.group_id,
            study_activity_id: self.study_activity_id,
            created_at: self.created_at,
        }
    }
}

/// A single correct/wrong judgment of one word within one session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WordReviewItem {
    pub id: i64,
    pub word_id: i64,
    pub study_session_id: i64,
    pub correct: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewWordReview {
    pub word_id: i64,
    pub study_session_id: i64,
    pub correct: bool,
    pub created_at: DateTime<Utc>,
}

impl NewWordReview {
    pub fn now(study_session_id: i64, word_id: i64, correct: bool) -> Self {
        Self {
            word_id,
            study_session_id,
            correct,
            created_at: Utc::now(),
        }
    }

    pub fn into_review(self, id: i64) -> WordReviewItem {
        WordReviewItem {
            id,
            word_id: self.word_id,
            study_session_id: self.study_session_id,
            correct: self.correct,
            created_at: self.created_at,
        }
    }
}

/// A session joined with its activity and group names and its review total.
///
/// `end_time` is the time of the latest review, or `start_time` when the
/// session has none.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudySessionSummary {
    pub id: i64,
    pub group_id: i64,
    pub study_activity_id: i64,
    pub activity_name: String,
    pub group_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub total_words_reviewed: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastStudySession {
    pub id: i64,
    pub study_activity_id: i64,
    pub activity_name: String,
    pub created_at: DateTime<Utc>,
    pub group_id: i64,
    pub group_name: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudyProgress {
    pub total_words_studied: i64,
    pub total_available_words: i64,
}

impl StudyProgress {
    /// Studied words as a fraction of the catalog, `0.0` for an empty catalog.
    pub fn ratio(&self) -> f64 {
        if self.total_available_words <= 0 {
            return 0.0;
        }
        self.total_words_studied as f64 / self.total_available_words as f64
    }

    /// [`ratio`](Self::ratio) as a whole percentage.
    pub fn percentage(&self) -> i64 {
        (self.ratio() * 100.0).round() as i64
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuickStats {
    pub success_rate: i64,
    pub total_study_sessions: i64,
    pub total_active_groups: i64,
    pub current_streak: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_word_defaults_to_empty_parts() {
        let word: NewWord =
            serde_json::from_value(json!({"kanji": "食べる", "romaji": "taberu", "english": "eat"}))
                .unwrap();
        assert_eq!(word.parts, json!({}));
    }

    #[test]
    fn into_word_keeps_every_field() {
        let parts = json!([{"kanji": "食", "romaji": ["ta"]}]);
        let word = NewWord::new("食べる", "taberu", "eat")
            .with_parts(parts.clone())
            .into_word(7);
        assert_eq!(word.id, 7);
        assert_eq!(word.kanji, "食べる");
        assert_eq!(word.parts, parts);
    }

    #[test]
    fn activity_url_serializes_as_thumbnail_url() {
        let activity = StudyActivity {
            id: 1,
            name: "Flashcards".to_string(),
            url: "https://example.com/flash.png".to_string(),
        };
        let value = serde_json::to_value(&activity).unwrap();
        assert_eq!(value["thumbnail_url"], "https://example.com/flash.png");
        assert!(value.get("url").is_none());
    }

    #[test]
    fn progress_ratio_handles_empty_catalog() {
        let progress = StudyProgress {
            total_words_studied: 0,
            total_available_words: 0,
        };
        assert_eq!(progress.ratio(), 0.0);
        assert_eq!(progress.percentage(), 0);
    }

    #[test]
    fn progress_percentage_rounds() {
        let progress = StudyProgress {
            total_words_studied: 1,
            total_available_words: 3,
        };
        assert_eq!(progress.percentage(), 33);

        let progress = StudyProgress {
            total_words_studied: 2,
            total_available_words: 3,
        };
        assert_eq!(progress.percentage(), 67);
    }
}
