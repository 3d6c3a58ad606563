//! Persistence core of the lang-portal vocabulary backend.
//!
//! [`persistence`] holds the repository traits and their SQLite
//! implementations; [`config`] resolves paths and pool tunables from the
//! environment. The `lang-portal` binary is a thin CLI over both.

pub mod config;
pub mod persistence;
