//! File logging. The terminal belongs to the TUI, so everything goes to a
//! daily-rotated file under the config directory.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "soundgrid=info";

/// Install the global subscriber. Keep the guard alive until exit or the
/// tail of the log is lost.
pub fn init(log_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("creating log directory {}", log_dir.display()))?;

    let appender = tracing_appender::rolling::daily(log_dir, "soundgrid.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_thread_names(true),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(guard)
}
