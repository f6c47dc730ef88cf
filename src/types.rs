use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// The operation that produced a result.
///
/// - `Single`: one process.
/// - `Pipe`: `left | right`, left's combined output feeds right's input.
/// - `And`: `left && right`, right runs only if left succeeded.
/// - `Or`: `left || right`, right runs only if left failed.
/// - `Background`: `exec &`, started detached and drained later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationType {
    Single,
    Pipe,
    And,
    Or,
    Background,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationType::Single => "single",
            OperationType::Pipe => "pipe",
            OperationType::And => "and",
            OperationType::Or => "or",
            OperationType::Background => "background",
        };
        f.write_str(s)
    }
}

/// Log level accepted by [`crate::logging::init_logging`] and the
/// `[logging]` config section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!(
                "invalid log level: {other} (expected error, warn, info, debug or trace)"
            )),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
