//! Logging setup
//!
//! Log lines go to a daily rolling file instead of the terminal so they never
//! interleave with the interactive menu.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::MetaConfig;

/// Build the file name prefix for the rolling log files
fn log_file_name(meta: &MetaConfig) -> String {
    format!("{}.log", meta.log_prefix)
}

/// Install the global tracing subscriber.
///
/// The returned guard flushes buffered lines when dropped and must be held by
/// the caller for the lifetime of the process.
pub fn init_logging(meta: &MetaConfig) -> Result<WorkerGuard> {
    let log_dir = PathBuf::from(&meta.log_dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, log_file_name(meta));
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!(err))?;

    Ok(guard)
}
