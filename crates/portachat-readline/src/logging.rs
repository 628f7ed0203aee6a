//! File logging for the REPL.
//!
//! Log lines go to a daily-rolling file so they never interleave with the
//! conversation on the terminal.

use anyhow::{Context, Result};
use portachat_infrastructure::PortachatPaths;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `default_directive`. The returned guard must be kept
/// alive until exit or buffered lines are lost.
pub fn init(paths: &PortachatPaths, default_directive: &str) -> Result<WorkerGuard> {
    let logs_dir = paths.logs_dir()?;
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "portachat.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!("[Bootstrap] Logging to {}", logs_dir.display());
    Ok(guard)
}
