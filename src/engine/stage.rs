// src/engine/stage.rs

//! Runner-level chaining for `|`.
//!
//! A pipe tree is flattened into a chain of stages whose streams are wired
//! directly to each other, so bytes flow between processes without being
//! buffered through intermediate results.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::exec::ProcessRunner;
use crate::result::RunResult;
use crate::types::OperationType;

pub type StageOutput = Box<dyn AsyncRead + Send + Unpin>;
pub type StageInput = Box<dyn AsyncWrite + Send + Unpin>;

type StageFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One started element of a pipe chain.
pub enum Stage {
    /// A live process.
    Process(ProcessRunner),
    /// `left | right`, with a copy task moving left's output into right.
    Chain {
        left: Box<Stage>,
        right: Box<Stage>,
        copy: JoinHandle<io::Result<u64>>,
    },
    /// A non-pipe composite that already ran to completion. Its captured
    /// output is replayed downstream; it reads no input.
    Resolved {
        result: RunResult,
        output: Option<Vec<u8>>,
    },
}

impl Stage {
    pub fn resolved(result: RunResult) -> Self {
        let output = Some(result.stdout.clone());
        Stage::Resolved { result, output }
    }

    /// Wire `left`'s output into `right`'s input.
    pub fn chain(mut left: Stage, mut right: Stage) -> Stage {
        let output = left.take_output();
        let input = right.take_input();
        let copy = tokio::spawn(copy_stream(output, input));
        Stage::Chain {
            left: Box::new(left),
            right: Box::new(right),
            copy,
        }
    }

    /// Output of the last element of the chain.
    pub fn take_output(&mut self) -> Option<StageOutput> {
        match self {
            Stage::Process(runner) => runner
                .take_output()
                .map(|out| Box::new(out) as StageOutput),
            Stage::Chain { right, .. } => right.take_output(),
            Stage::Resolved { output, .. } => output
                .take()
                .map(|bytes| Box::new(io::Cursor::new(bytes)) as StageOutput),
        }
    }

    /// Input of the first element of the chain.
    pub fn take_input(&mut self) -> Option<StageInput> {
        match self {
            Stage::Process(runner) => runner.take_input().map(|inp| Box::new(inp) as StageInput),
            Stage::Chain { left, .. } => left.take_input(),
            Stage::Resolved { .. } => None,
        }
    }

    pub fn close_input(&mut self) {
        drop(self.take_input());
    }

    /// Stop every live process in the chain, downstream first.
    pub fn shutdown(&mut self, grace: Duration) -> StageFuture<'_, ()> {
        Box::pin(async move {
            match self {
                Stage::Process(runner) => {
                    if let Err(e) = runner.shutdown(grace).await {
                        debug!(command = %runner.label(), error = %e, "stage stopped");
                    }
                }
                Stage::Chain { left, right, .. } => {
                    right.shutdown(grace).await;
                    left.shutdown(grace).await;
                }
                Stage::Resolved { .. } => {}
            }
        })
    }

    /// Await the chain and build its result tree.
    ///
    /// `captured` is the drained output of the last element. Waiting on a
    /// process yields to `token`: on cancellation the process is shut down
    /// with `grace`.
    pub fn finish<'a>(
        self,
        captured: Option<Vec<u8>>,
        token: &'a CancellationToken,
        grace: Duration,
    ) -> StageFuture<'a, RunResult> {
        Box::pin(async move {
            match self {
                Stage::Process(mut runner) => {
                    let outcome = tokio::select! {
                        outcome = runner.wait() => outcome,
                        _ = token.cancelled() => runner.shutdown(grace).await,
                    };
                    RunResult::from_outcome(OperationType::Single, captured.unwrap_or_default(), outcome)
                }
                Stage::Chain { left, right, copy } => {
                    let left_result = left.finish(None, token, grace).await;
                    match copy.await {
                        Ok(Ok(bytes)) => debug!(bytes, "pipe copy finished"),
                        Ok(Err(e)) => debug!(error = %e, "pipe copy stopped early"),
                        Err(e) => warn!(error = %e, "pipe copy task failed"),
                    }
                    let right_result = right.finish(captured, token, grace).await;
                    combine_pipe(left_result, right_result)
                }
                Stage::Resolved { result, .. } => result,
            }
        })
    }
}

/// Fail-fast combination of both sides of a pipe; left wins when both
/// failed.
pub fn combine_pipe(left: RunResult, right: RunResult) -> RunResult {
    let mut result = RunResult::new(OperationType::Pipe);

    if let Some(err) = &left.error {
        result.error = Some(err.clone());
        result.exit_code = left.exit_code;
        result.stderr = left.stderr.clone();
    } else if let Some(err) = &right.error {
        result.error = Some(err.clone());
        result.exit_code = right.exit_code;
        result.stderr = right.stderr.clone();
    } else {
        result.stdout = right.stdout.clone();
        result.stderr = right.stderr.clone();
        result.exit_code = right.exit_code;
    }

    result.children = vec![left, right];
    result
}

/// Read a stage's output to the end.
pub async fn drain_output(output: Option<&mut StageOutput>, buf: &mut Vec<u8>) {
    if let Some(output) = output {
        if let Err(e) = output.read_to_end(buf).await {
            warn!(error = %e, "reading pipeline output failed");
        }
    }
}

async fn copy_stream(output: Option<StageOutput>, input: Option<StageInput>) -> io::Result<u64> {
    let Some(mut output) = output else {
        return Ok(0);
    };

    match input {
        Some(mut input) => {
            let copied = tokio::io::copy(&mut output, &mut input).await;
            // EOF for the downstream process.
            let _ = input.shutdown().await;
            copied
        }
        None => tokio::io::copy(&mut output, &mut tokio::io::sink()).await,
    }
}
