// src/lib.rs

//! Compose external processes into shell-like pipelines and run them.
//!
//! - [`pipeline`]: the [`Executable`] tree and its `|`, `&&`, `||`, `&`
//!   combinators
//! - [`engine`]: the per-call visitor that executes a tree
//! - [`exec`]: the process primitive and the pluggable [`Launcher`]
//! - [`result`]: the [`RunResult`] tree
//! - [`config`] / [`logging`]: ambient setup for embedding programs

pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod pipeline;
pub mod result;
pub mod shell;
pub mod types;

pub use config::ShellConfig;
pub use errors::{ExecError, ShellpipeError};
pub use exec::{CommandSpec, Launcher, SystemLauncher};
pub use pipeline::{DEFAULT_SHUTDOWN_TIMEOUT, Executable, cmd};
pub use result::RunResult;
pub use shell::Shell;
pub use types::{LogLevel, OperationType};

pub use tokio_util::sync::CancellationToken;
