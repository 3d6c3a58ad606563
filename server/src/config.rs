//! Configuration for the lang-portal backend.
//!
//! Every tunable has a compile-time default and can be overridden at runtime
//! through a dedicated environment variable. Numeric values that fail to parse
//! fall back to their default.
//!
//! Data directory precedence:
//! 1. `LANG_PORTAL_DATA_DIR` environment variable
//! 2. the platform data directory (e.g. `~/.local/share/lang-portal`)
//! 3. `./data` (fallback for development)

use std::path::PathBuf;
use std::time::Duration;

const DEV_DATA_DIR: &str = "./data";
const DATABASE_FILE: &str = "words.db";

/// Pool size. Acquisition waits when every connection is busy.
const DEFAULT_MAX_CONNECTIONS: u32 = 25;
const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 15 * 60;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

/// Connection settings for [`Database::open`](crate::persistence::sqlite::Database::open).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    /// Defaults for a database file at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            idle_timeout: Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS),
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        }
    }

    /// Resolve every field from the environment.
    pub fn from_env() -> Self {
        Self {
            path: get_database_path(),
            max_connections: env_or("LANG_PORTAL_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS).max(1),
            idle_timeout: Duration::from_secs(env_or(
                "LANG_PORTAL_IDLE_TIMEOUT_SECS",
                DEFAULT_IDLE_TIMEOUT_SECS,
            )),
            acquire_timeout: Duration::from_secs(env_or(
                "LANG_PORTAL_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )),
        }
    }
}

/// Get the data directory holding the database file.
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LANG_PORTAL_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(dirs) = directories::ProjectDirs::from("", "", "lang-portal") {
        return dirs.data_dir().to_path_buf();
    }

    PathBuf::from(DEV_DATA_DIR)
}

/// Get the SQLite database path.
///
/// Priority:
/// 1. `LANG_PORTAL_DATABASE_PATH` env variable if set
/// 2. `words.db` inside [`get_data_dir`]
pub fn get_database_path() -> PathBuf {
    if let Ok(path) = std::env::var("LANG_PORTAL_DATABASE_PATH") {
        return PathBuf::from(path);
    }

    get_data_dir().join(DATABASE_FILE)
}

/// Get the directory holding the seed JSON files.
///
/// Defaults to the version-controlled `server/defaults/seed`.
pub fn get_seed_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("LANG_PORTAL_SEED_DIR") {
        return PathBuf::from(dir);
    }

    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("defaults").join("seed")
}

/// Deadline applied to each front-end operation.
pub fn get_query_timeout() -> Duration {
    Duration::from_secs(env_or("LANG_PORTAL_QUERY_TIMEOUT_SECS", DEFAULT_QUERY_TIMEOUT_SECS))
}

/// Directory for rolling log files. `None` logs to stderr.
pub fn get_log_dir() -> Option<PathBuf> {
    std::env::var("LANG_PORTAL_LOG_DIR").ok().map(PathBuf::from)
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
