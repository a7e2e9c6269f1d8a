//! Console Logger
//!
//! `log` backend for browser apps. Lines go to the browser console on wasm32
//! and to stderr elsewhere, prefixed with a timestamp and the app name.

use std::sync::OnceLock;

use log::{Level, LevelFilter, Log, Metadata, Record};
use thiserror::Error;

static LOGGER: OnceLock<ConsoleLogger> = OnceLock::new();

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("a logger is already installed")]
    AlreadyInitialized,
}

/// Install the global logger. Fails if any logger was installed before.
pub fn init_logger(app_name: &str, level: LevelFilter) -> Result<(), LoggerError> {
    let logger = LOGGER.get_or_init(|| ConsoleLogger::new(app_name, level));
    log::set_logger(logger).map_err(|_| LoggerError::AlreadyInitialized)?;
    log::set_max_level(level);
    Ok(())
}

pub struct ConsoleLogger {
    app_name: String,
    level: LevelFilter,
}

impl ConsoleLogger {
    pub fn new(app_name: &str, level: LevelFilter) -> Self {
        Self {
            app_name: app_name.to_string(),
            level,
        }
    }

    pub fn format_line(&self, level: Level, message: &str) -> String {
        format!(
            "{} [{}] {:<5} {}",
            chrono::Utc::now().format("%H:%M:%S%.3f"),
            self.app_name,
            level,
            message
        )
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = self.format_line(record.level(), &record.args().to_string());
        write_line(record.level(), &line);
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
fn write_line(level: Level, line: &str) {
    let value = wasm_bindgen::JsValue::from_str(line);
    match level {
        Level::Error => web_sys::console::error_1(&value),
        Level::Warn => web_sys::console::warn_1(&value),
        Level::Info => web_sys::console::info_1(&value),
        Level::Debug | Level::Trace => web_sys::console::debug_1(&value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn write_line(_level: Level, line: &str) {
    eprintln!("{}", line);
}
