//! Rotating log system
//!
//! Console output for interactive runs plus daily-rotating JSON files in
//! ./logs/ so render passes can be inspected after the fact.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging. The returned guard must stay alive for the duration
/// of the program or buffered file output is dropped on exit.
pub fn init_logging(log_dir: &str) -> WorkerGuard {
    let log_path = Path::new(log_dir);
    if !log_path.exists() {
        std::fs::create_dir_all(log_path).expect("Failed to create log directory");
    }

    // Rotates daily, files named disaster_timeline.YYYY-MM-DD.log
    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "disaster_timeline.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Default to INFO globally, DEBUG for our own pipeline; RUST_LOG overrides
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,disaster_timeline=debug"));

    // Console: human-readable. File: JSON lines for easier parsing.
    let console_layer = fmt::layer().with_target(true);
    let file_layer = fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_target(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    tracing::debug!("Logging initialized. Log directory: {}", log_dir);
    guard
}
