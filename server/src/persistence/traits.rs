//! Async repository trait definitions for the persistence layer.
//!
//! Each trait covers one aggregate. Front ends bind against these signatures
//! and never see SQL. Listings take a normalized [`PageRequest`] and return a
//! [`Page`] carrying the total number of matching records.
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send` and can be driven from `tokio::spawn`.

use std::future::Future;

use chrono::NaiveDate;
use portal::{
    Group, GroupSortKey, GroupWordSortKey, LastStudySession, NewStudySession, NewWord,
    NewWordReview, Page, PageRequest, QuickStats, RawGroupWords, SortOrder, StudyActivity,
    StudyActivityDetails, StudyProgress, StudySession, StudySessionFilter, StudySessionSummary,
    Word, WordFilter, WordReviewItem, WordStats,
};

use super::PersistenceError;

/// Repository for vocabulary words and their group memberships.
pub trait WordRepository: Send + Sync {
    fn create(&self, word: &NewWord) -> impl Future<Output = Result<Word, PersistenceError>> + Send;
    fn get(&self, id: i64) -> impl Future<Output = Result<Word, PersistenceError>> + Send;
    /// Full overwrite by id. Last writer wins.
    fn update(&self, word: &Word) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn delete(&self, id: i64) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    fn list(
        &self,
        filter: &WordFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<Word>, PersistenceError>> + Send;
    /// Idempotent: adding an existing membership is a no-op.
    fn add_to_group(
        &self,
        word_id: i64,
        group_id: i64,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
    /// Idempotent: removing a missing membership is a no-op.
    fn remove_from_group(
        &self,
        word_id: i64,
        group_id: i64,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

/// Repository for word groups and their nested listings.
pub trait GroupRepository: Send + Sync {
    fn create(&self, name: &str) -> impl Future<Output = Result<Group, PersistenceError>> + Send;
    fn list(
        &self,
        page: PageRequest,
        sort_by: GroupSortKey,
        order: SortOrder,
    ) -> impl Future<Output = Result<Page<Group>, PersistenceError>> + Send;
    fn get(&self, id: i64) -> impl Future<Output = Result<Group, PersistenceError>> + Send;
    /// Review counts cover each word's whole history, not just this group.
    fn words(
        &self,
        group_id: i64,
        page: PageRequest,
        sort_by: GroupWordSortKey,
        order: SortOrder,
    ) -> impl Future<Output = Result<Page<WordStats>, PersistenceError>> + Send;
    fn words_raw(
        &self,
        group_id: i64,
    ) -> impl Future<Output = Result<RawGroupWords, PersistenceError>> + Send;
    fn study_sessions(
        &self,
        group_id: i64,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<StudySessionSummary>, PersistenceError>> + Send;
}

/// Repository for the study activity catalog.
pub trait StudyActivityRepository: Send + Sync {
    fn list(
        &self,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<StudyActivity>, PersistenceError>> + Send;
    fn get(&self, id: i64) -> impl Future<Output = Result<StudyActivity, PersistenceError>> + Send;
    fn details(
        &self,
        id: i64,
    ) -> impl Future<Output = Result<StudyActivityDetails, PersistenceError>> + Send;
}

/// Repository for study sessions and the reviews recorded in them.
///
/// Sessions and reviews are append-only: there is no update or delete.
pub trait StudySessionRepository: Send + Sync {
    fn create(
        &self,
        session: &NewStudySession,
    ) -> impl Future<Output = Result<StudySession, PersistenceError>> + Send;
    /// Implementations must check both parents and insert atomically.
    fn create_word_review(
        &self,
        review: &NewWordReview,
    ) -> impl Future<Output = Result<WordReviewItem, PersistenceError>> + Send;
    fn list(
        &self,
        filter: &StudySessionFilter,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<StudySessionSummary>, PersistenceError>> + Send;
    /// Review counts are scoped to the one session.
    fn words(
        &self,
        session_id: i64,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<WordStats>, PersistenceError>> + Send;
    fn details(
        &self,
        session_id: i64,
    ) -> impl Future<Output = Result<StudySessionSummary, PersistenceError>> + Send;
    fn reviews(
        &self,
        session_id: i64,
    ) -> impl Future<Output = Result<Vec<WordReviewItem>, PersistenceError>> + Send;
}

/// Read-only statistics computed across all tables on every call.
pub trait DashboardRepository: Send + Sync {
    fn last_study_session(
        &self,
    ) -> impl Future<Output = Result<LastStudySession, PersistenceError>> + Send;
    fn study_progress(&self) -> impl Future<Output = Result<StudyProgress, PersistenceError>> + Send;
    /// Stats with the streak measured up to the current UTC date.
    fn quick_stats(&self) -> impl Future<Output = Result<QuickStats, PersistenceError>> + Send;
    fn quick_stats_on(
        &self,
        today: NaiveDate,
    ) -> impl Future<Output = Result<QuickStats, PersistenceError>> + Send;
}
