//! Logging Infrastructure
//!
//! One subscriber per process, installed from `main`. Components log through
//! `tracing` macros and pick up the current request span from `TraceLayer`.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "shop-server";

/// Initialize the logger with defaults (info, plain text, stdout)
pub fn init_logger() {
    init_logger_with_file(None, false, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// `RUST_LOG` wins over `log_level` when set. When `log_dir` exists the
/// output goes to a daily rolling file instead of stdout.
pub fn init_logger_with_file(log_level: Option<&str>, json: bool, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("shop_server={level},tower_http={level}")));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    let file_appender = log_dir
        .map(Path::new)
        .filter(|path| path.is_dir())
        .map(|path| tracing_appender::rolling::daily(path, LOG_FILE_PREFIX));

    match (file_appender, json) {
        (Some(appender), true) => builder.json().with_writer(appender).with_ansi(false).init(),
        (Some(appender), false) => builder.with_writer(appender).with_ansi(false).init(),
        (None, true) => builder.json().init(),
        (None, false) => builder.init(),
    }
}
