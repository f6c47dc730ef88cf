// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually starting OS processes, using
//! `tokio::process::Command`, and handing the engine a runner with one
//! combined output stream and one input stream.
//!
//! - [`process`] holds the command description and the running handle,
//!   including the staged SIGTERM-then-kill shutdown.
//! - [`launcher`] provides the `Launcher` trait and the production
//!   `SystemLauncher`, which tests can replace with an instrumented one.

pub mod launcher;
pub mod process;

pub use launcher::{Launcher, SystemLauncher};
pub use process::{CombinedOutput, CommandSpec, ProcessRunner};
