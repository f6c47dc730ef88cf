// src/engine/visitor.rs

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::ExecError;
use crate::pipeline::{Executable, Leaf, Node};
use crate::result::RunResult;
use crate::types::OperationType;

use super::jobs::{BackgroundJob, JobList};
use super::stage::{Stage, StageOutput, drain_output};

type LaunchFuture<'a> = Pin<Box<dyn Future<Output = Result<Stage, RunResult>> + Send + 'a>>;

/// Executes one node of a tree for a single `run` call.
///
/// Each `run` creates its own visitor, so background jobs are scoped to the
/// call that started them and drained by it.
pub struct ExecutionVisitor {
    token: CancellationToken,
    shutdown_timeout: Duration,
    jobs: JobList,
}

impl ExecutionVisitor {
    pub fn new(token: CancellationToken, shutdown_timeout: Duration) -> Self {
        Self {
            token,
            shutdown_timeout,
            jobs: JobList::new(),
        }
    }

    /// Run a single process to completion, capturing its combined output.
    pub async fn visit_process(&mut self, leaf: &Leaf) -> RunResult {
        if self.token.is_cancelled() {
            return RunResult::failed(OperationType::Single, ExecError::Cancelled);
        }

        let mut runner = match leaf.start() {
            Ok(runner) => runner,
            Err(err) => return RunResult::failed(OperationType::Single, err),
        };
        runner.close_input();

        let mut output = runner
            .take_output()
            .map(|out| Box::new(out) as StageOutput);
        let mut captured = Vec::new();
        let grace = self.shutdown_timeout;

        let drained = tokio::select! {
            _ = drain_output(output.as_mut(), &mut captured) => true,
            _ = self.token.cancelled() => false,
        };
        drop(output);

        let outcome = if drained {
            tokio::select! {
                outcome = runner.wait() => outcome,
                _ = self.token.cancelled() => runner.shutdown(grace).await,
            }
        } else {
            info!(command = %leaf.spec(), "run cancelled; stopping process");
            runner.shutdown(grace).await
        };

        RunResult::from_outcome(OperationType::Single, captured, outcome)
    }

    /// `left | right`, streamed through one chain of processes.
    pub async fn visit_pipe(&mut self, left: &Executable, right: &Executable) -> RunResult {
        if self.token.is_cancelled() {
            return RunResult::failed(OperationType::Pipe, ExecError::Cancelled);
        }

        let mut chain = match self.launch_pipe(left, right).await {
            Ok(chain) => chain,
            Err(result) => return result,
        };
        chain.close_input();

        let mut output = chain.take_output();
        let mut captured = Vec::new();
        let grace = self.shutdown_timeout;

        let drained = tokio::select! {
            _ = drain_output(output.as_mut(), &mut captured) => true,
            _ = self.token.cancelled() => false,
        };
        drop(output);

        if !drained {
            info!("run cancelled; stopping pipeline");
            chain.shutdown(grace).await;
        }

        chain.finish(Some(captured), &self.token, grace).await
    }

    /// `left && right`: right only runs if left succeeded.
    pub async fn visit_and(&mut self, left: &Executable, right: &Executable) -> RunResult {
        let left_result = left.run(&self.token).await;
        let mut result = RunResult::new(OperationType::And);

        if !left_result.is_success() {
            debug!(skipped = %right, "left side of && failed; skipping right side");
            result.mirror(&left_result);
            result.children = vec![left_result, RunResult::skipped(right.operation())];
            return result;
        }

        let right_result = right.run(&self.token).await;
        result.mirror(&right_result);
        result.children = vec![left_result, right_result];
        result
    }

    /// `left || right`: right only runs if left failed, and recovers the
    /// overall result if it succeeds.
    pub async fn visit_or(&mut self, left: &Executable, right: &Executable) -> RunResult {
        let left_result = left.run(&self.token).await;
        let mut result = RunResult::new(OperationType::Or);

        if left_result.is_success() {
            debug!(skipped = %right, "left side of || succeeded; skipping right side");
            result.mirror(&left_result);
            result.children = vec![left_result, RunResult::skipped(right.operation())];
            return result;
        }

        let right_result = right.run(&self.token).await;
        result.stdout = right_result.stdout.clone();
        result.stderr = right_result.stderr.clone();
        result.exit_code = right_result.exit_code;
        result.error = if right_result.is_success() {
            None
        } else {
            right_result.error.clone()
        };
        result.children = vec![left_result, right_result];
        result
    }

    /// `exec &`: start detached and return a placeholder success at once.
    pub fn visit_background(&mut self, exec: &Executable) -> RunResult {
        info!(job = %exec, "starting background job");
        self.jobs.push(BackgroundJob::spawn(exec));
        RunResult::new(OperationType::Background)
    }

    /// Drain tracked background jobs into `result`, unless it failed.
    pub async fn finish(mut self, mut result: RunResult) -> RunResult {
        if result.error.is_none() {
            self.jobs
                .drain(&mut result, &self.token, self.shutdown_timeout)
                .await;
        } else if !self.jobs.is_empty() {
            debug!(
                jobs = self.jobs.len(),
                "run failed; leaving background jobs undrained"
            );
        }
        result
    }

    /// Start `left | right` as one chain.
    fn launch_pipe<'a>(&'a mut self, left: &'a Executable, right: &'a Executable) -> LaunchFuture<'a> {
        Box::pin(async move {
            let mut left_stage = self.launch(left).await.map_err(|left_result| {
                let right_result = RunResult::skipped(right.operation());
                pipe_failure(left_result, right_result)
            })?;

            let right_stage = match self.launch(right).await {
                Ok(stage) => stage,
                Err(right_result) => {
                    // Right never started; whatever started on the left is
                    // stopped and reported alongside the start failure.
                    let grace = self.shutdown_timeout;
                    left_stage.close_input();
                    drop(left_stage.take_output());
                    left_stage.shutdown(grace).await;
                    let left_result = left_stage.finish(None, &self.token, grace).await;
                    return Err(pipe_failure(left_result, right_result));
                }
            };

            Ok(Stage::chain(left_stage, right_stage))
        })
    }

    /// Start one pipe operand.
    ///
    /// Leaves become live processes and nested pipes are flattened into the
    /// same chain. Any other composite runs through the generic path and
    /// contributes its captured output.
    fn launch<'a>(&'a mut self, exec: &'a Executable) -> LaunchFuture<'a> {
        Box::pin(async move {
            match exec {
                Executable::Leaf(leaf) => {
                    if self.token.is_cancelled() {
                        return Err(RunResult::failed(OperationType::Single, ExecError::Cancelled));
                    }
                    leaf.start()
                        .map(Stage::Process)
                        .map_err(|err| RunResult::failed(OperationType::Single, err))
                }
                Executable::Pipeline(p) => match p.node() {
                    Node::Pipe(left, right) => self.launch_pipe(left, right).await,
                    Node::And(..) | Node::Or(..) | Node::Background(_) => {
                        Ok(Stage::resolved(exec.run(&self.token).await))
                    }
                },
            }
        })
    }
}

/// Pipe result for a chain that could not be fully started. The start
/// failure decides the outcome.
fn pipe_failure(left: RunResult, right: RunResult) -> RunResult {
    let cause = if right.error.is_some() && !right.skipped { &right } else { &left };
    let mut result = RunResult::new(OperationType::Pipe);
    result.error = cause.error.clone();
    result.exit_code = cause.exit_code;
    result.stderr = cause.stderr.clone();
    result.children = vec![left, right];
    result
}
