//! SQLite-backed repository implementations.
//!
//! ## Database setup
//!
//! [`Database`] wraps a `sqlx::SqlitePool` configured with:
//! - **WAL mode**: one writer and multiple concurrent readers.
//! - **Foreign keys enabled**: enforced at the connection level.
//! - **Embedded migrations**: `sqlx::migrate!` applies `migrations/*.sql` in
//!   order when [`Database::open`] is called.
//!
//! ## Repository types
//!
//! Each `Sqlite*Repository` holds a cloned `SqlitePool` and implements the
//! corresponding trait from [`crate::persistence::traits`]:
//!
//! | Type | Trait |
//! |------|-------|
//! | [`SqliteWordRepository`] | `WordRepository` |
//! | [`SqliteGroupRepository`] | `GroupRepository` |
//! | [`SqliteStudyActivityRepository`] | `StudyActivityRepository` |
//! | [`SqliteStudySessionRepository`] | `StudySessionRepository` |
//! | [`SqliteDashboardRepository`] | `DashboardRepository` |
//!
//! Timestamps are stored as fixed-width RFC 3339 `TEXT` in UTC and word
//! `parts` as JSON `TEXT`, both through the helpers in [`helpers`].
//!
//! ## Seeding
//!
//! [`seed_from_dir`] performs a one-time, all-or-nothing import of the
//! starter vocabulary. It is a no-op once the `words` table has rows.

mod activity_repo;
mod dashboard_repo;
mod database;
mod group_repo;
mod query;
mod seed;
mod session_repo;
mod word_repo;
#[cfg(test)]
mod integration_tests;
pub(crate) mod helpers;

pub use activity_repo::SqliteStudyActivityRepository;
pub use dashboard_repo::SqliteDashboardRepository;
pub use database::Database;
pub use group_repo::SqliteGroupRepository;
pub use seed::{seed_from_dir, SeedReport};
pub use session_repo::SqliteStudySessionRepository;
pub use word_repo::SqliteWordRepository;
