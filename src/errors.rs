// src/errors.rs

//! Crate-wide error types.
//!
//! - [`ExecError`] describes how a single execution failed. It is `Clone`
//!   because composite results mirror the error of the child that decided
//!   their outcome.
//! - [`ShellpipeError`] covers setup concerns (config files, logging).

use std::io;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    /// Spawning the process or wiring its streams failed.
    #[error("failed to start process '{program}': {message}")]
    StartFailure { program: String, message: String },

    /// The process ran and exited with a non-zero status.
    #[error("exit status {code}")]
    NonZeroExit { code: i32 },

    /// The process was terminated by a signal.
    #[error("terminated by signal {}", signal.map_or_else(|| "unknown".to_string(), |s| s.to_string()))]
    Signal { signal: Option<i32> },

    /// The run was cancelled before the process could be started.
    #[error("context cancelled")]
    Cancelled,

    /// Waiting for the process failed (never started, or reaping failed).
    #[error("waiting for process failed: {message}")]
    Wait { message: String },

    /// Stream plumbing between stages failed.
    #[error("stream error: {message}")]
    Io { message: String },
}

impl ExecError {
    pub fn start_failure(program: &str, err: &io::Error) -> Self {
        ExecError::StartFailure {
            program: program.to_string(),
            message: err.to_string(),
        }
    }

    /// Exit code reported alongside this error: the OS status for a
    /// non-zero exit, `-1` for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecError::NonZeroExit { code } => *code,
            _ => -1,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, ExecError::Cancelled)
    }
}

impl From<io::Error> for ExecError {
    fn from(err: io::Error) -> Self {
        ExecError::Io {
            message: err.to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ShellpipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ShellpipeError>;
