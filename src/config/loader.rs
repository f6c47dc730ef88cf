// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::model::{RawShellConfig, ShellConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawShellConfig`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to
/// get a usable [`ShellConfig`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawShellConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;

    let config: RawShellConfig = toml::from_str(&contents)?;

    Ok(config)
}

/// Parse and validate configuration from TOML text.
pub fn load_from_str(contents: &str) -> Result<ShellConfig> {
    let raw: RawShellConfig = toml::from_str(contents)?;
    ShellConfig::try_from(raw)
}

/// Load a configuration file from path and validate it.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks that the shutdown timeout parses and is non-zero, and that the
///   `[process]` section is sane.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ShellConfig> {
    let raw_config = load_from_path(&path)?;
    let config = ShellConfig::try_from(raw_config)?;
    Ok(config)
}

/// `Shellpipe.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Shellpipe.toml")
}
