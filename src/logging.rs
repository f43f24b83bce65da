use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_FILE_NAME: &str = "vexa.log";
pub const LOG_ENV_VAR: &str = "VEXA_LOG";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Sends JSON logs to `<log_dir>/vexa.log`. The terminal belongs to the
/// chat UI, so nothing is written to stdout. The returned guard flushes the
/// writer on drop and must outlive the app.
pub fn init(log_dir: &Path, verbose: bool) -> Option<WorkerGuard> {
    if let Err(e) = fs::create_dir_all(log_dir) {
        eprintln!("Failed to create log directory {}: {e}", log_dir.display());
        return None;
    }

    let log_path = log_dir.join(LOG_FILE_NAME);
    let file = match fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open log file: {e}");
            return None;
        }
    };

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    let subscriber = tracing_subscriber::registry().with(build_filter(verbose)).with(
        fmt::layer()
            .json()
            .with_writer(non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true),
    );

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return None;
    }

    LOG_PATH.set(log_path).ok();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Logging initialized");

    Some(guard)
}

pub fn log_file_path() -> Option<&'static PathBuf> {
    LOG_PATH.get()
}
