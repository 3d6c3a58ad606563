//! Composes `WHERE` clauses for filtered listings.
//!
//! Every fragment pushed here is a fixed string owned by this module; filter
//! values are always bound as parameters.

use portal::{PageRequest, StudySessionFilter, WordFilter};
use sqlx::{QueryBuilder, Sqlite};

/// Text columns a word listing can be narrowed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextColumn {
    Kanji,
    Romaji,
    English,
}

impl TextColumn {
    fn as_sql(self) -> &'static str {
        match self {
            TextColumn::Kanji => "w.kanji",
            TextColumn::Romaji => "w.romaji",
            TextColumn::English => "w.english",
        }
    }
}

/// Id columns a session listing can be narrowed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IdColumn {
    SessionActivity,
    SessionGroup,
}

impl IdColumn {
    fn as_sql(self) -> &'static str {
        match self {
            IdColumn::SessionActivity => "ss.study_activity_id",
            IdColumn::SessionGroup => "ss.group_id",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate<'a> {
    /// Case-sensitive substring match. `instr` is used because SQLite `LIKE`
    /// folds ASCII case.
    Contains(TextColumn, &'a str),
    /// The word belongs to the group.
    InGroup(i64),
    Equals(IdColumn, i64),
}

/// An ordered conjunction of predicates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(crate) struct Conditions<'a> {
    predicates: Vec<Predicate<'a>>,
}

impl<'a> Conditions<'a> {
    /// Predicates for a word listing. The word table must be aliased `w`.
    pub fn for_words(filter: &'a WordFilter) -> Self {
        let mut predicates = Vec::new();
        if let Some(term) = filter.kanji_term() {
            predicates.push(Predicate::Contains(TextColumn::Kanji, term));
        }
        if let Some(term) = filter.romaji_term() {
            predicates.push(Predicate::Contains(TextColumn::Romaji, term));
        }
        if let Some(term) = filter.english_term() {
            predicates.push(Predicate::Contains(TextColumn::English, term));
        }
        if let Some(group_id) = filter.group() {
            predicates.push(Predicate::InGroup(group_id));
        }
        Self { predicates }
    }

    /// Predicates for a session listing. The session table must be aliased `ss`.
    pub fn for_sessions(filter: &StudySessionFilter) -> Self {
        let mut predicates = Vec::new();
        if let Some(id) = filter.activity_id() {
            predicates.push(Predicate::Equals(IdColumn::SessionActivity, id));
        }
        if let Some(id) = filter.group_id() {
            predicates.push(Predicate::Equals(IdColumn::SessionGroup, id));
        }
        Self { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Append ` WHERE p1 AND p2 ...`, or nothing when there are no predicates.
    pub fn push_where(&self, qb: &mut QueryBuilder<'a, Sqlite>) {
        for (i, predicate) in self.predicates.iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            match *predicate {
                Predicate::Contains(column, term) => {
                    qb.push("instr(")
                        .push(column.as_sql())
                        .push(", ")
                        .push_bind(term)
                        .push(") > 0");
                }
                Predicate::InGroup(group_id) => {
                    qb.push(
                        "EXISTS (SELECT 1 FROM word_groups wg \
                         WHERE wg.word_id = w.id AND wg.group_id = ",
                    )
                    .push_bind(group_id)
                    .push(")");
                }
                Predicate::Equals(column, value) => {
                    qb.push(column.as_sql()).push(" = ").push_bind(value);
                }
            }
        }
    }
}

/// Append ` LIMIT ? OFFSET ?` for the requested page.
pub(crate) fn push_page(qb: &mut QueryBuilder<'_, Sqlite>, page: PageRequest) {
    qb.push(" LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal::Listing;

    #[test]
    fn empty_filter_adds_nothing() {
        let filter = WordFilter::default();
        let conditions = Conditions::for_words(&filter);
        assert!(conditions.is_empty());

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM words w");
        conditions.push_where(&mut qb);
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM words w");
    }

    #[test]
    fn word_predicates_are_conjoined_and_bound() {
        let filter = WordFilter::default().kanji("食").english("eat").in_group(3);
        let mut qb = QueryBuilder::new("SELECT w.id FROM words w");
        Conditions::for_words(&filter).push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT w.id FROM words w WHERE instr(w.kanji, ?) > 0 AND instr(w.english, ?) > 0 \
             AND EXISTS (SELECT 1 FROM word_groups wg WHERE wg.word_id = w.id AND wg.group_id = ?)"
        );
    }

    #[test]
    fn blank_terms_are_ignored() {
        let filter = WordFilter::default().romaji("").in_group(0);
        assert!(Conditions::for_words(&filter).is_empty());
    }

    #[test]
    fn session_predicates() {
        let filter = StudySessionFilter::default().activity(2).group(5);
        let mut qb = QueryBuilder::new("SELECT ss.id FROM study_sessions ss");
        Conditions::for_sessions(&filter).push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT ss.id FROM study_sessions ss WHERE ss.study_activity_id = ? AND ss.group_id = ?"
        );
    }

    #[test]
    fn page_clause() {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT 1");
        push_page(&mut qb, PageRequest::new(3, 10, Listing::Words));
        assert_eq!(qb.sql(), "SELECT 1 LIMIT ? OFFSET ?");
    }
}
