//! `lang-portal`: command-line front end for the vocabulary store.
//!
//! Every subcommand opens the database (applying pending migrations), runs one
//! repository operation under the configured deadline, and prints the result
//! as pretty JSON on stdout. Logs go to stderr, or to a daily rolling file
//! when `LANG_PORTAL_LOG_DIR` is set.
//!
//! The exit code reflects the error class: 1 storage, 2 validation,
//! 3 not found, 4 referential.

use std::process::ExitCode;

use clap::Parser;
use lang_portal_server::config;
use lang_portal_server::persistence::{ErrorClass, PersistenceError};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::Cli;

/// Initialise tracing. The returned guard must live until exit so buffered
/// file output is flushed.
fn init_tracing() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    match config::get_log_dir() {
        Some(log_dir) => {
            std::fs::create_dir_all(&log_dir).ok();
            let file_appender = tracing_appender::rolling::daily(log_dir, "lang-portal");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true),
                )
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<PersistenceError>().map(PersistenceError::class) {
        Some(ErrorClass::Validation) => 2,
        Some(ErrorClass::NotFound) => 3,
        Some(ErrorClass::Referential) => 4,
        Some(ErrorClass::Storage) | None => 1,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let _guard = init_tracing();

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}
