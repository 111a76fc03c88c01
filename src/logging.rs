// src/logging.rs

use crate::config::{config_dir, Config};
use crate::errors::{ChatError, ChatResult};
use crate::models::ApiCallLog;
use flexi_logger::{detailed_format, FileSpec, Logger, LoggerHandle};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Starts file logging. The terminal UI owns the screen, so nothing is
/// written to stdout or stderr. Keep the handle alive for the program's lifetime.
pub fn init_logger(config: &Config) -> ChatResult<LoggerHandle> {
    let directory = match &config.log_dir {
        Some(dir) => dir.clone(),
        None => config_dir()?.join("logs"),
    };

    Logger::try_with_str(&config.log_level)
        .map_err(|e| ChatError::config_error(format!("Invalid log level: {}", e)))?
        .log_to_file(FileSpec::default().directory(directory).basename("integrai"))
        .format(detailed_format)
        .start()
        .map_err(|e| ChatError::config_error(format!("Failed to start logger: {}", e)))
}

pub fn format_api_call(log: &ApiCallLog) -> String {
    format!(
        "[{}] {} - {} - Status: {} - Time: {}ms\n",
        log.timestamp.to_rfc3339(),
        log.endpoint,
        log.request_summary,
        log.response_status,
        log.response_time_ms
    )
}

/// Appends an API call record to `path`.
pub fn log_api_call(log: &ApiCallLog, path: &Path) -> ChatResult<()> {
    let mut file = OpenOptions::new().append(true).create(true).open(path)?;
    file.write_all(format_api_call(log).as_bytes())?;
    Ok(())
}
