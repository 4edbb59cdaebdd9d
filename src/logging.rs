use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Sets up console logging plus a daily-rotated JSON log file under `logs/`.
///
/// A `RUST_LOG` setting replaces the default filter entirely; without one,
/// the crate logs at `info` so stage summaries show up and per-row drop
/// messages stay quiet.
///
/// Returns the appender guard. The caller holds it for the life of the
/// process; dropping it flushes any buffered log lines.
pub fn init_logging() -> WorkerGuard {
    // The rolling appender expects the directory to already exist
    let _ = fs::create_dir_all("logs");

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily("logs", "permit_map.log"));

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("permit_map=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    guard
}
