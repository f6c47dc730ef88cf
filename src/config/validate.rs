// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{RawShellConfig, ShellConfig};
use crate::errors::{Result, ShellpipeError};

impl TryFrom<RawShellConfig> for ShellConfig {
    type Error = ShellpipeError;

    fn try_from(raw: RawShellConfig) -> std::result::Result<Self, Self::Error> {
        let shutdown_timeout = validate_shutdown_timeout(&raw.engine.shutdown_timeout)?;
        validate_process_section(&raw)?;

        Ok(ShellConfig {
            shutdown_timeout,
            current_dir: raw.process.current_dir,
            env: raw.process.env,
            log_level: raw.logging.level,
        })
    }
}

fn validate_shutdown_timeout(value: &str) -> Result<Duration> {
    let timeout = parse_duration(value).map_err(|e| {
        ShellpipeError::ConfigError(format!("[engine].shutdown_timeout: {e}"))
    })?;

    if timeout.is_zero() {
        return Err(ShellpipeError::ConfigError(
            "[engine].shutdown_timeout must be greater than zero".to_string(),
        ));
    }

    Ok(timeout)
}

fn validate_process_section(cfg: &RawShellConfig) -> Result<()> {
    if let Some(dir) = &cfg.process.current_dir {
        if dir.as_os_str().is_empty() {
            return Err(ShellpipeError::ConfigError(
                "[process].current_dir must not be empty".to_string(),
            ));
        }
    }

    for key in cfg.process.env.keys() {
        if key.is_empty() || key.contains('=') {
            return Err(ShellpipeError::ConfigError(format!(
                "[process].env has invalid variable name '{key}'"
            )));
        }
    }

    Ok(())
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| "duration missing unit suffix".to_string())?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    match unit.as_str() {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        "m" => Ok(Duration::from_secs(value * 60)),
        "h" => Ok(Duration::from_secs(value * 60 * 60)),
        _ => Err(format!(
            "unsupported duration unit '{}'; expected ms, s, m, or h",
            unit
        )),
    }
}
