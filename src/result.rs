// src/result.rs

//! The result tree produced by running an [`Executable`](crate::Executable).

use std::borrow::Cow;

use crate::errors::ExecError;
use crate::types::OperationType;

/// Outcome of one node of an executed tree.
///
/// The shape mirrors the tree that was run: composites carry their operands'
/// results in `children`, and a branch that never ran appears as a
/// `skipped` child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Operation that produced this result.
    pub op: OperationType,
    /// Combined stdout+stderr bytes.
    pub stdout: Vec<u8>,
    /// Only set when a pipe surfaces a failing side's stderr field.
    pub stderr: Vec<u8>,
    pub exit_code: i32,
    pub error: Option<ExecError>,
    /// True if this branch was short-circuited by `&&` / `||`.
    pub skipped: bool,
    pub children: Vec<RunResult>,
    /// Errors of drained background jobs. They never change `exit_code` or
    /// `error`.
    pub background_errors: Vec<ExecError>,
}

impl RunResult {
    /// An empty successful result.
    pub fn new(op: OperationType) -> Self {
        Self {
            op,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: 0,
            error: None,
            skipped: false,
            children: Vec::new(),
            background_errors: Vec::new(),
        }
    }

    /// Result for a branch that was never run.
    pub fn skipped(op: OperationType) -> Self {
        Self {
            skipped: true,
            ..Self::new(op)
        }
    }

    pub fn failed(op: OperationType, error: ExecError) -> Self {
        Self {
            exit_code: error.exit_code(),
            error: Some(error),
            ..Self::new(op)
        }
    }

    /// Build a result from captured output and a process outcome.
    pub fn from_outcome(op: OperationType, stdout: Vec<u8>, outcome: Result<(), ExecError>) -> Self {
        let mut result = Self::new(op);
        result.stdout = stdout;
        if let Err(err) = outcome {
            result.exit_code = err.exit_code();
            result.error = Some(err);
        }
        result
    }

    /// No error and a zero exit code.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.exit_code == 0
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    /// Convert into a `Result`, failing with this node's error.
    pub fn into_result(self) -> Result<RunResult, ExecError> {
        match &self.error {
            Some(err) => Err(err.clone()),
            None => Ok(self),
        }
    }

    /// Copy output, exit code and error from `other`.
    pub(crate) fn mirror(&mut self, other: &RunResult) {
        self.stdout = other.stdout.clone();
        self.stderr = other.stderr.clone();
        self.exit_code = other.exit_code;
        self.error = other.error.clone();
    }
}
