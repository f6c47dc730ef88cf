// src/engine/jobs.rs

//! Background jobs started by one visitor.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::errors::ExecError;
use crate::pipeline::Executable;
use crate::result::RunResult;

/// A detached execution pending drain.
///
/// - `done` receives the job's result exactly once.
/// - `cancel` is the job's own token, independent of the run token.
pub struct BackgroundJob {
    exec: Executable,
    done: oneshot::Receiver<RunResult>,
    cancel: CancellationToken,
}

impl BackgroundJob {
    /// Spawn `exec` on a fresh token and track it.
    pub fn spawn(exec: &Executable) -> Self {
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let job_exec = exec.clone();
        let job_token = cancel.clone();
        tokio::spawn(async move {
            let result = job_exec.run(&job_token).await;
            if tx.send(result).is_err() {
                debug!(job = %job_exec, "background job finished after being abandoned");
            }
        });

        Self {
            exec: exec.clone(),
            done: rx,
            cancel,
        }
    }

    pub fn exec(&self) -> &Executable {
        &self.exec
    }
}

/// Jobs owned by exactly one visitor, in launch order.
#[derive(Default)]
pub struct JobList {
    jobs: Vec<BackgroundJob>,
}

impl JobList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: BackgroundJob) {
        self.jobs.push(job);
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Wait for every job, recording failures in `result.background_errors`.
    ///
    /// If `token` is cancelled while a job is pending, the job's own token is
    /// cancelled and it gets `grace` to finish before it is abandoned.
    pub async fn drain(&mut self, result: &mut RunResult, token: &CancellationToken, grace: Duration) {
        if self.jobs.is_empty() {
            return;
        }
        info!(jobs = self.jobs.len(), "waiting for background jobs");

        for mut job in self.jobs.drain(..) {
            tokio::select! {
                done = &mut job.done => match done {
                    Ok(bg) => {
                        if let Some(err) = bg.error {
                            debug!(job = %job.exec, error = %err, "background job failed");
                            result.background_errors.push(err);
                        }
                    }
                    Err(_) => {
                        warn!(job = %job.exec, "background job ended without reporting a result");
                        result.background_errors.push(ExecError::Wait {
                            message: format!("background job '{}' ended without a result", job.exec),
                        });
                    }
                },
                _ = token.cancelled() => {
                    info!(job = %job.exec, "run cancelled; stopping background job");
                    job.cancel.cancel();
                    match tokio::time::timeout(grace, &mut job.done).await {
                        Ok(_) => debug!(job = %job.exec, "background job stopped"),
                        Err(_) => warn!(
                            job = %job.exec,
                            grace_ms = grace.as_millis() as u64,
                            "background job did not stop in time; abandoning it"
                        ),
                    }
                }
            }
        }
    }
}
