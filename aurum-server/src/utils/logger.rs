//! Logging Infrastructure
//!
//! `RUST_LOG` wins when set; otherwise `LOG_LEVEL` applies to this crate and
//! tower_http. With `LOG_DIR` the output goes to a daily rolling file.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber
pub fn init_logger(log_level: &str, log_dir: Option<&str>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("aurum_server={log_level},tower_http={log_level}"))
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(true);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        match std::fs::create_dir_all(log_path) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(log_path, "aurum-server");
                subscriber.with_ansi(false).with_writer(file_appender).init();
                return;
            }
            Err(e) => eprintln!("Cannot create log directory {dir}: {e}, logging to stdout"),
        }
    }

    subscriber.init();
}
