//! Shape checks for caller input.
//!
//! Repositories assume their input already passed these checks; front ends
//! run them before calling in.

use crate::models::{NewWord, Word};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("invalid parts JSON: {0}")]
    InvalidParts(String),
}

impl NewWord {
    /// Kanji, romaji and English must all be non-empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("kanji", &self.kanji)?;
        require("romaji", &self.romaji)?;
        require("english", &self.english)
    }
}

impl Word {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id < 1 {
            return Err(ValidationError::InvalidId(self.id.to_string()));
        }
        require("kanji", &self.kanji)?;
        require("romaji", &self.romaji)?;
        require("english", &self.english)
    }
}

/// Parse a caller-supplied id such as a path segment or query value.
pub fn parse_id(raw: &str) -> Result<i64, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ValidationError::InvalidId(raw.to_string()))
}

/// Parse a caller-supplied `parts` blob.
pub fn parse_parts(raw: &str) -> Result<serde_json::Value, ValidationError> {
    serde_json::from_str(raw).map_err(|e| ValidationError::InvalidParts(e.to_string()))
}

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}
