// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::pipeline::DEFAULT_SHUTDOWN_TIMEOUT;
use crate::types::LogLevel;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [engine]
/// shutdown_timeout = "5s"
///
/// [process]
/// current_dir = "/tmp"
/// env = { LANG = "C" }
///
/// [logging]
/// level = "debug"
/// ```
///
/// All sections are optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawShellConfig {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub process: ProcessSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Grace period for cancelled work, e.g. `"250ms"`, `"5s"`, `"1m"`.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout: String,
}

fn default_shutdown_timeout() -> String {
    format!("{}s", DEFAULT_SHUTDOWN_TIMEOUT.as_secs())
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// `[process]` section: applied to every command built by a
/// [`Shell`](crate::Shell).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProcessSection {
    #[serde(default)]
    pub current_dir: Option<PathBuf>,

    /// Extra environment variables, on top of the inherited environment.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// `[logging]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingSection {
    #[serde(default)]
    pub level: Option<LogLevel>,
}

/// Validated configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub shutdown_timeout: Duration,
    pub current_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub log_level: Option<LogLevel>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            current_dir: None,
            env: BTreeMap::new(),
            log_level: None,
        }
    }
}
