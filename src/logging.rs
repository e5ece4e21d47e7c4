//! File-backed tracing setup.
//!
//! The terminal belongs to the UI, so log lines go to
//! `<data dir>/logs/shotcraft.log`. `RUST_LOG` overrides the configured filter.

use crate::config::Config;
use color_eyre::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Keep the guard alive for the whole run,
/// dropping it flushes and stops the writer thread.
pub fn init(config: &Config) -> Result<WorkerGuard> {
    let log_dir = Config::data_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, "shotcraft.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| color_eyre::eyre::eyre!("Failed to install logger: {}", error))?;

    tracing::info!(dir = %log_dir.display(), "logging started");
    Ok(guard)
}
