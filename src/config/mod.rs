// src/config/mod.rs

//! Configuration loading and validation for shellpipe.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk or text (`loader.rs`).
//! - Validate and convert the raw model (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_from_str};
pub use model::{
    EngineSection, LoggingSection, ProcessSection, RawShellConfig, ShellConfig,
};
pub use validate::parse_duration;
