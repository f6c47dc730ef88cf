// src/engine/mod.rs

//! Execution engine for pipeline trees.
//!
//! This module ties together:
//! - the per-call [`ExecutionVisitor`], which applies the semantics of each
//!   operator (`|`, `&&`, `||`, `&`)
//! - stage chaining for pipes, which connects process streams directly
//! - the background job list a visitor drains before its `run` returns
//!
//! Operator dispatch lives in [`visitor`]; stream plumbing for `|` is in
//! [`stage`]; detached work is tracked by [`jobs`].

pub mod jobs;
pub mod stage;
pub mod visitor;

pub use jobs::{BackgroundJob, JobList};
pub use stage::{Stage, combine_pipe};
pub use visitor::ExecutionVisitor;
