// src/exec/launcher.rs

//! Pluggable process launcher.
//!
//! Every leaf of a pipeline starts its process through a `Launcher` instead
//! of calling [`CommandSpec::spawn`] directly. Production code uses
//! [`SystemLauncher`]; tests can wrap it to observe or veto process starts.

use std::fmt::Debug;

use crate::errors::ExecError;

use super::process::{CommandSpec, ProcessRunner};

/// Trait abstracting how a single process is started.
pub trait Launcher: Send + Sync + Debug {
    /// Start the process described by `spec`.
    ///
    /// Errors are reported as [`ExecError::StartFailure`].
    fn start(&self, spec: &CommandSpec) -> Result<ProcessRunner, ExecError>;
}

/// Launcher that spawns real OS processes through `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn start(&self, spec: &CommandSpec) -> Result<ProcessRunner, ExecError> {
        spec.spawn()
    }
}
