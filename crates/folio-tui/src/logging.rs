//! File logging. The terminal belongs to the UI, so diagnostics go to
//! `<config dir>/folio/logs/folio.log`.

use anyhow::Result;
use folio_core::Config;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Filter variable, e.g. `FOLIO_LOG=folio_core=debug`.
const LOG_ENV: &str = "FOLIO_LOG";

/// Keep the returned guard alive for the whole run or buffered lines are lost.
pub fn init() -> Result<WorkerGuard> {
    let log_dir = Config::config_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, "folio.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    Ok(guard)
}
