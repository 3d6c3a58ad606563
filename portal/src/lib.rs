//! Domain types for the lang-portal vocabulary backend.
//!
//! This crate has no I/O. It defines the records the persistence layer reads
//! and writes, the typed pagination/sort/filter parameters every listing takes,
//! and the shape checks applied to caller input before it reaches storage.

pub mod filter;
pub mod models;
pub mod pagination;
pub mod sort;
pub mod validation;

pub use filter::{StudySessionFilter, WordFilter};
pub use models::{
    Group, LastStudySession, NewStudySession, NewWord, NewWordReview, QuickStats, RawGroupWords,
    StudyActivity, StudyActivityDetails, StudyProgress, StudySession, StudySessionSummary, Word,
    WordReviewItem, WordStats,
};
pub use pagination::{total_pages, Listing, Page, PageRequest};
pub use sort::{GroupSortKey, GroupWordSortKey, SortOrder, UnknownSortValue};
pub use validation::{parse_id, parse_parts, ValidationError};
