//! Logging Infrastructure
//!
//! The library never installs a subscriber on its own; the embedding
//! application calls one of these once at startup.

use std::path::Path;

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_file(None, None, None);
}

/// Initialize the logger with optional JSON format and file output
///
/// Returns false when a global subscriber was already installed.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    json: Option<bool>,
    log_dir: Option<&str>,
) -> bool {
    let level = log_level.unwrap_or("info");
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    // 日志目录存在时写入按天滚动的文件
    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "wheel-core");
            let builder = builder.with_ansi(false).with_writer(file_appender);
            return if json.unwrap_or(false) {
                builder.json().try_init().is_ok()
            } else {
                builder.try_init().is_ok()
            };
        }
    }

    if json.unwrap_or(false) {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    }
}

/// Logger for tests: output captured by the test harness, repeat calls are no-ops
pub fn init_test_logger() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
