//! Sort keys accepted by the group listings.
//!
//! Caller-supplied strings are mapped onto these enums with
//! [`from_param`](SortOrder::from_param)-style constructors. Anything that is
//! not a recognized value silently becomes the default rather than an error.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Returned by the `FromStr` impls when a value is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized sort value: {0}")]
pub struct UnknownSortValue(pub String);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = UnknownSortValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(UnknownSortValue(other.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns a group listing can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSortKey {
    #[default]
    Name,
    WordsCount,
}

impl GroupSortKey {
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupSortKey::Name => "name",
            GroupSortKey::WordsCount => "words_count",
        }
    }
}

impl FromStr for GroupSortKey {
    type Err = UnknownSortValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(GroupSortKey::Name),
            "words_count" => Ok(GroupSortKey::WordsCount),
            other => Err(UnknownSortValue(other.to_string())),
        }
    }
}

impl fmt::Display for GroupSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns the words of a group can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupWordSortKey {
    #[default]
    Kanji,
    Romaji,
    English,
    CorrectCount,
    WrongCount,
}

impl GroupWordSortKey {
    pub fn from_param(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupWordSortKey::Kanji => "kanji",
            GroupWordSortKey::Romaji => "romaji",
            GroupWordSortKey::English => "english",
            GroupWordSortKey::CorrectCount => "correct_count",
            GroupWordSortKey::WrongCount => "wrong_count",
        }
    }
}

impl FromStr for GroupWordSortKey {
    type Err = UnknownSortValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kanji" => Ok(GroupWordSortKey::Kanji),
            "romaji" => Ok(GroupWordSortKey::Romaji),
            "english" => Ok(GroupWordSortKey::English),
            "correct_count" => Ok(GroupWordSortKey::CorrectCount),
            "wrong_count" => Ok(GroupWordSortKey::WrongCount),
            other => Err(UnknownSortValue(other.to_string())),
        }
    }
}

impl fmt::Display for GroupWordSortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_roundtrip() {
        for order in [SortOrder::Asc, SortOrder::Desc] {
            assert_eq!(order.as_str().parse::<SortOrder>().unwrap(), order);
        }
    }

    #[test]
    fn unknown_values_fall_back_silently() {
        assert_eq!(SortOrder::from_param(Some("sideways")), SortOrder::Asc);
        assert_eq!(SortOrder::from_param(None), SortOrder::Asc);
        assert_eq!(GroupSortKey::from_param(Some("id; DROP TABLE groups")), GroupSortKey::Name);
        assert_eq!(GroupWordSortKey::from_param(Some("parts")), GroupWordSortKey::Kanji);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(SortOrder::from_param(Some("DESC")), SortOrder::Asc);
        assert!("Name".parse::<GroupSortKey>().is_err());
    }

    #[test]
    fn recognized_keys_parse() {
        assert_eq!(GroupSortKey::from_param(Some("words_count")), GroupSortKey::WordsCount);
        assert_eq!(
            GroupWordSortKey::from_param(Some("wrong_count")),
            GroupWordSortKey::WrongCount
        );
        assert_eq!(SortOrder::from_param(Some("desc")), SortOrder::Desc);
    }

    #[test]
    fn as_str_matches_from_str_for_every_word_key() {
        let keys = [
            GroupWordSortKey::Kanji,
            GroupWordSortKey::Romaji,
            GroupWordSortKey::English,
            GroupWordSortKey::CorrectCount,
            GroupWordSortKey::WrongCount,
        ];
        for key in keys {
            assert_eq!(key.to_string().parse::<GroupWordSortKey>().unwrap(), key);
        }
    }
}
