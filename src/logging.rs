//! Tracing setup for the `snapshelf` binary.
//!
//! Events go to the systemd journal when one is reachable, else to
//! `snapshelf.log` in the given directory, rotated daily.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive variable, e.g. `SNAPSHELF_LOG=snapshelf=debug`.
pub const LOG_ENV: &str = "SNAPSHELF_LOG";

const LOG_FILE: &str = "snapshelf.log";

/// Keeps the file writer's worker thread alive until exit.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn fallback_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("snapshelf")
        .join("logs")
}

#[cfg(target_os = "linux")]
fn try_journald() -> Result<bool> {
    let Ok(layer) = tracing_journald::layer() else {
        return Ok(false);
    };
    tracing_subscriber::registry()
        .with(filter())
        .with(layer)
        .try_init()?;
    Ok(true)
}

#[cfg(not(target_os = "linux"))]
fn try_journald() -> Result<bool> {
    Ok(false)
}

fn init_file(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = FILE_GUARD.set(guard);

    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()?;
    Ok(())
}

/// Install the global subscriber. Fails if one is already installed.
///
/// `log_dir` is only used without journald; `None` picks the platform's
/// local data directory.
pub fn init(log_dir: Option<PathBuf>) -> Result<()> {
    if try_journald()? {
        tracing::debug!("Logging to journald");
        return Ok(());
    }

    let dir = log_dir.unwrap_or_else(fallback_dir);
    init_file(&dir)?;
    tracing::debug!(dir = %dir.display(), "Logging to file");
    Ok(())
}
