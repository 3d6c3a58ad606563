//! Optional predicates for the filtered listings.
//!
//! Every field is independent; the listing applies the conjunction of the
//! fields that are set.

use serde::{Deserialize, Serialize};

/// Filter for the word listing.
///
/// The text fields are case-sensitive substring matches. Empty strings are
/// treated as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFilter {
    pub kanji: Option<String>,
    pub romaji: Option<String>,
    pub english: Option<String>,
    pub group_id: Option<i64>,
}

impl WordFilter {
    pub fn kanji(mut self, value: impl Into<String>) -> Self {
        self.kanji = Some(value.into());
        self
    }

    pub fn romaji(mut self, value: impl Into<String>) -> Self {
        self.romaji = Some(value.into());
        self
    }

    pub fn english(mut self, value: impl Into<String>) -> Self {
        self.english = Some(value.into());
        self
    }

    pub fn in_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn kanji_term(&self) -> Option<&str> {
        non_empty(self.kanji.as_deref())
    }

    pub fn romaji_term(&self) -> Option<&str> {
        non_empty(self.romaji.as_deref())
    }

    pub fn english_term(&self) -> Option<&str> {
        non_empty(self.english.as_deref())
    }

    /// Ids below 1 never name a group and are ignored.
    pub fn group(&self) -> Option<i64> {
        self.group_id.filter(|id| *id > 0)
    }
}

/// Filter for the study session listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySessionFilter {
    pub study_activity_id: Option<i64>,
    pub group_id: Option<i64>,
}

impl StudySessionFilter {
    pub fn activity(mut self, study_activity_id: i64) -> Self {
        self.study_activity_id = Some(study_activity_id);
        self
    }

    pub fn group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn activity_id(&self) -> Option<i64> {
        self.study_activity_id.filter(|id| *id > 0)
    }

    pub fn group_id(&self) -> Option<i64> {
        self.group_id.filter(|id| *id > 0)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_terms_are_unset() {
        let filter = WordFilter::default().kanji("").romaji("tabe");
        assert_eq!(filter.kanji_term(), None);
        assert_eq!(filter.romaji_term(), Some("tabe"));
        assert_eq!(filter.english_term(), None);
    }

    #[test]
    fn non_positive_ids_are_unset() {
        assert_eq!(WordFilter::default().in_group(0).group(), None);
        assert_eq!(WordFilter::default().in_group(3).group(), Some(3));

        let filter = StudySessionFilter::default().activity(-1).group(2);
        assert_eq!(filter.activity_id(), None);
        assert_eq!(filter.group_id(), Some(2));
    }
}
