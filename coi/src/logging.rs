//! File logging for coi.
//!
//! The TUI owns stderr, so `tracing` output goes to `coi.log` in
//! `$COI_LOG_DIR` (the system temp dir by default). The filter comes from
//! `$COI_LOG` using `EnvFilter` syntax.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives environment variable.
pub const LOG_ENV: &str = "COI_LOG";
/// Log directory environment variable.
pub const LOG_DIR_ENV: &str = "COI_LOG_DIR";
const LOG_FILE: &str = "coi.log";
const DEFAULT_FILTER: &str = "coi=info,coi_core=info,warn";

/// Directory the log file is written to.
pub fn log_dir() -> PathBuf {
    std::env::var_os(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// Installs the global subscriber.
///
/// Returns the guard that flushes the background writer on drop; keep it
/// alive until the process exits. Returns `None` (and logs nothing) when the
/// log file cannot be created, since there is nowhere else to write.
pub fn init() -> Option<WorkerGuard> {
    let dir = log_dir();
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(&dir)
        .ok()?;
    let (non_blocking, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .try_init()
        .ok()?;

    tracing::info!(dir = %dir.display(), "logging to {LOG_FILE}");
    Some(guard)
}
