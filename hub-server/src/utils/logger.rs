//! Logging Infrastructure
//!
//! `RUST_LOG` style filtering, plain or JSON lines, optional daily log file.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger with defaults (info, plain text, stdout)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger
///
/// `log_dir` switches output to a daily rolling file `hub-server.YYYY-MM-DD`
/// when the directory exists or can be created. Calling this twice is a no-op.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let filter = || {
        EnvFilter::try_new(log_level.unwrap_or("info")).unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let file_dir = log_dir.filter(|dir| {
        let path = Path::new(dir);
        path.exists() || std::fs::create_dir_all(path).is_ok()
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter())
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    let result = match (file_dir, json) {
        (Some(dir), true) => builder
            .json()
            .with_writer(tracing_appender::rolling::daily(dir, "hub-server"))
            .try_init(),
        (Some(dir), false) => builder
            .with_ansi(false)
            .with_writer(tracing_appender::rolling::daily(dir, "hub-server"))
            .try_init(),
        (None, true) => builder.json().try_init(),
        (None, false) => builder.try_init(),
    };

    if result.is_err() {
        tracing::debug!("Logger already initialized");
    }
}
