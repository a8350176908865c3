// LivePaper Client - Systemd-Style Logger
// Copyright (C) 2025 Akaere Networks
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Systemd-style logging for the LivePaper client
//!
//! The library only ever logs through the `log_*!` macros. Until a binary
//! calls [`Logger::init`] (or [`init_from_args`]) every message is dropped,
//! so embedding applications see no output they did not ask for.
//!
//! - Log levels follow syslog priorities (err, warning, notice, info, debug)
//! - Terminal output is coloured when stderr is a TTY
//! - Journald output emits `KEY=value` records with `SYSLOG_IDENTIFIER=livepaper`

use std::sync::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Log levels following systemd priority conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Error conditions (3)
    Error = 3,
    /// Warning conditions (4)
    Warning = 4,
    /// Normal but significant condition (5)
    Notice = 5,
    /// Informational message (6)
    Info = 6,
    /// Debug-level message (7)
    Debug = 7,
}

impl LogLevel {
    /// Convert numeric priority to LogLevel
    pub fn from_priority(priority: u8) -> Self {
        match priority {
            0..=3 => LogLevel::Error,
            4 => LogLevel::Warning,
            5 => LogLevel::Notice,
            6 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }

    /// Get the priority number for systemd
    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERR",
            LogLevel::Warning => "WARNING",
            LogLevel::Notice => "NOTICE",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    /// Get color code for terminal output
    pub fn color_code(self) -> &'static str {
        match self {
            LogLevel::Error => "\x1b[31m",   // Red
            LogLevel::Warning => "\x1b[33m", // Yellow
            LogLevel::Notice => "\x1b[36m",  // Cyan
            LogLevel::Info => "\x1b[32m",    // Green
            LogLevel::Debug => "\x1b[37m",   // White/gray
        }
    }
}

/// Logger configuration
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Minimum log level to output
    pub min_level: LogLevel,
    /// Whether to use colors in output
    pub use_colors: bool,
    /// Whether to include timestamps
    pub include_timestamp: bool,
    /// Whether to include the emitting module path
    pub include_target: bool,
    /// Whether to format for journald (structured format)
    pub journald_format: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            use_colors: atty::is(atty::Stream::Stderr),
            include_timestamp: true,
            include_target: false,
            journald_format: false,
        }
    }
}

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

#[derive(Debug)]
pub struct Logger {
    config: LoggerConfig,
    min_level: AtomicU8,
}

impl Logger {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            min_level: AtomicU8::new(config.min_level.priority()),
            config,
        }
    }

    /// Initialize the global logger
    pub fn init(config: LoggerConfig) -> Result<(), LoggerError> {
        let logger = Self::new(config);

        let mut global_logger = LOGGER.lock().map_err(|_| LoggerError::InitError)?;
        if global_logger.is_some() {
            return Err(LoggerError::AlreadyInitialized);
        }
        *global_logger = Some(logger);

        Ok(())
    }

    /// Set the minimum log level at runtime
    pub fn set_min_level(&self, level: LogLevel) {
        self.min_level.store(level.priority(), Ordering::Relaxed);
    }

    /// Check if a log level should be output
    pub fn should_log(&self, level: LogLevel) -> bool {
        level.priority() <= self.min_level.load(Ordering::Relaxed)
    }

    pub fn log(&self, level: LogLevel, target: &str, message: &str) {
        if !self.should_log(level) {
            return;
        }

        let timestamp = if self.config.include_timestamp {
            Some(
                SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs(),
            )
        } else {
            None
        };

        eprintln!("{}", self.format(level, target, message, timestamp));
    }

    fn format(&self, level: LogLevel, target: &str, message: &str, timestamp: Option<u64>) -> String {
        if self.config.journald_format {
            self.format_journald(level, target, message, timestamp)
        } else {
            self.format_terminal(level, target, message, timestamp)
        }
    }

    /// Format for journald structured output
    fn format_journald(&self, level: LogLevel, target: &str, message: &str, timestamp: Option<u64>) -> String {
        let mut output = String::new();

        output.push_str(&format!("PRIORITY={}\n", level.priority()));
        output.push_str(&format!("MESSAGE={}\n", message));

        if self.config.include_target && !target.is_empty() {
            output.push_str(&format!("CODE_FILE={}\n", target));
        }

        if let Some(ts) = timestamp {
            output.push_str(&format!("_SOURCE_REALTIME_TIMESTAMP={}\n", ts * 1_000_000)); // microseconds
        }

        output.push_str("SYSLOG_IDENTIFIER=livepaper\n");

        output
    }

    fn format_terminal(&self, level: LogLevel, target: &str, message: &str, timestamp: Option<u64>) -> String {
        let mut output = String::new();

        if let Some(ts) = timestamp {
            let datetime = chrono::DateTime::from_timestamp(ts as i64, 0)
                .unwrap_or_default()
                .format("%Y-%m-%d %H:%M:%S");
            output.push_str(&format!("{} ", datetime));
        }

        if self.config.use_colors {
            output.push_str(&format!("{}[{}]\x1b[0m ", level.color_code(), level.as_str()));
        } else {
            output.push_str(&format!("[{}] ", level.as_str()));
        }

        if self.config.include_target && !target.is_empty() {
            output.push_str(&format!("{}: ", target));
        }

        output.push_str(message);
        output
    }
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Error, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Warning, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Info, module_path!(), &format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::core::logger::log_with_level($crate::core::logger::LogLevel::Debug, module_path!(), &format!($($arg)*))
    };
}

/// Internal function to log with level
pub fn log_with_level(level: LogLevel, target: &str, message: &str) {
    if let Ok(logger_guard) = LOGGER.lock() {
        if let Some(ref logger) = *logger_guard {
            logger.log(level, target, message);
        }
    }
}

/// Logger initialization errors
#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    #[error("Logger already initialized")]
    AlreadyInitialized,
    #[error("Failed to initialize logger")]
    InitError,
}

/// Initialize logger from CLI arguments
pub fn init_from_args(debug: bool, journald: bool) -> Result<(), LoggerError> {
    let min_level = if debug { LogLevel::Debug } else { LogLevel::Notice };

    let config = LoggerConfig {
        min_level,
        use_colors: atty::is(atty::Stream::Stderr) && !journald,
        include_timestamp: !journald,
        include_target: debug,
        journald_format: journald,
    };

    Logger::init(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(min_level: LogLevel) -> Logger {
        Logger::new(LoggerConfig {
            min_level,
            use_colors: false,
            include_timestamp: false,
            include_target: false,
            journald_format: false,
        })
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Error < LogLevel::Warning);
        assert!(LogLevel::Info < LogLevel::Debug);
    }

    #[test]
    fn test_log_level_from_priority() {
        assert_eq!(LogLevel::from_priority(0), LogLevel::Error);
        assert_eq!(LogLevel::from_priority(4), LogLevel::Warning);
        assert_eq!(LogLevel::from_priority(6), LogLevel::Info);
        assert_eq!(LogLevel::from_priority(42), LogLevel::Debug);
    }

    #[test]
    fn test_logger_level_filtering() {
        let logger = plain(LogLevel::Warning);

        assert!(logger.should_log(LogLevel::Error));
        assert!(logger.should_log(LogLevel::Warning));
        assert!(!logger.should_log(LogLevel::Info));

        logger.set_min_level(LogLevel::Debug);
        assert!(logger.should_log(LogLevel::Debug));
    }

    #[test]
    fn test_terminal_format_without_colors() {
        let logger = plain(LogLevel::Info);
        let line = logger.format(LogLevel::Warning, "livepaper::resources", "upload failed", None);
        assert_eq!(line, "[WARNING] upload failed");
    }

    #[test]
    fn test_journald_format() {
        let logger = Logger::new(LoggerConfig {
            journald_format: true,
            include_timestamp: false,
            include_target: true,
            ..LoggerConfig::default()
        });
        let record = logger.format(LogLevel::Error, "livepaper::client", "boom", None);

        assert!(record.starts_with("PRIORITY=3\n"));
        assert!(record.contains("MESSAGE=boom\n"));
        assert!(record.contains("CODE_FILE=livepaper::client\n"));
        assert!(record.ends_with("SYSLOG_IDENTIFIER=livepaper\n"));
    }
}
