// src/exec/process.rs

//! A single OS process: what to run ([`CommandSpec`]) and a handle to the
//! running instance ([`ProcessRunner`]).

use std::fmt;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::process::ExitStatusExt;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::net::unix::pipe;
use tokio::process::{Child, ChildStdin, Command};
use tracing::{debug, warn};

use crate::errors::ExecError;

/// Readable half of a process's combined stdout+stderr pipe.
pub type CombinedOutput = pipe::Receiver;

/// Description of a command to launch.
///
/// Construction never fails; a missing program only surfaces when the
/// command is started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn get_current_dir(&self) -> Option<&PathBuf> {
        self.current_dir.as_ref()
    }

    pub fn get_env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Spawn the process with a piped stdin and one shared pipe for stdout
    /// and stderr.
    ///
    /// The process is not tied to any cancellation token; it runs until it
    /// exits or is stopped through the returned runner.
    pub fn spawn(&self) -> Result<ProcessRunner, ExecError> {
        let fail = |e: io::Error| ExecError::start_failure(&self.program, &e);

        let (reader, writer) = io::pipe().map_err(fail)?;
        let stderr_writer = writer.try_clone().map_err(fail)?;

        // The command owns the parent's copies of the write ends; it must be
        // dropped right after spawning or the output never reaches EOF.
        let mut child = {
            let mut cmd = Command::new(&self.program);
            cmd.args(&self.args)
                .stdin(Stdio::piped())
                .stdout(Stdio::from(writer))
                .stderr(Stdio::from(stderr_writer))
                .kill_on_drop(true);

            if let Some(dir) = &self.current_dir {
                cmd.current_dir(dir);
            }
            for (key, value) in &self.env {
                cmd.env(key, value);
            }

            cmd.spawn().map_err(fail)?
        };

        let output = pipe::Receiver::from_owned_fd(OwnedFd::from(reader)).map_err(fail)?;
        let input = child.stdin.take();

        debug!(command = %self, pid = ?child.id(), "process started");

        Ok(ProcessRunner {
            label: self.to_string(),
            child,
            output: Some(output),
            input,
        })
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Handle to a running process.
///
/// Streams are handed out once through [`take_output`](Self::take_output)
/// and [`take_input`](Self::take_input). Dropping the input (or the runner)
/// signals end-of-input to the process.
pub struct ProcessRunner {
    label: String,
    child: Child,
    output: Option<CombinedOutput>,
    input: Option<ChildStdin>,
}

impl fmt::Debug for ProcessRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessRunner")
            .field("label", &self.label)
            .field("pid", &self.child.id())
            .finish_non_exhaustive()
    }
}

impl ProcessRunner {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// OS process id, or `None` once the process has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn take_output(&mut self) -> Option<CombinedOutput> {
        self.output.take()
    }

    pub fn take_input(&mut self) -> Option<ChildStdin> {
        self.input.take()
    }

    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Best-effort immediate force-kill.
    pub fn terminate(&mut self) -> Result<(), ExecError> {
        match self.child.start_kill() {
            Ok(()) => Ok(()),
            // Already exited and reaped.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => Err(ExecError::from(e)),
        }
    }

    /// Ask the process to stop with SIGTERM.
    pub fn interrupt(&self) -> Result<(), ExecError> {
        let Some(pid) = self.child.id() else {
            return Ok(());
        };
        let pid = i32::try_from(pid).map_err(|e| ExecError::Io {
            message: format!("pid {pid} out of range: {e}"),
        })?;

        match signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
            Ok(()) | Err(nix::errno::Errno::ESRCH) => Ok(()),
            Err(errno) => Err(ExecError::Io {
                message: format!("sending SIGTERM to {pid}: {errno}"),
            }),
        }
    }

    /// Wait for the process to exit.
    ///
    /// May be called repeatedly; after the first exit the cached status is
    /// returned.
    pub async fn wait(&mut self) -> Result<(), ExecError> {
        let status = self.child.wait().await.map_err(|e| ExecError::Wait {
            message: e.to_string(),
        })?;
        let outcome = outcome_from_status(status);
        debug!(
            command = %self.label,
            exit_code = outcome.as_ref().err().map_or(0, ExecError::exit_code),
            "process exited"
        );
        outcome
    }

    /// Staged stop: SIGTERM, wait up to `grace`, then force-kill and reap.
    pub async fn shutdown(&mut self, grace: Duration) -> Result<(), ExecError> {
        if let Err(e) = self.interrupt() {
            warn!(command = %self.label, error = %e, "failed to interrupt process");
        }

        match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => outcome_from_status(status),
            Ok(Err(e)) => Err(ExecError::Wait {
                message: e.to_string(),
            }),
            Err(_) => {
                warn!(
                    command = %self.label,
                    grace_ms = grace.as_millis() as u64,
                    "process ignored SIGTERM; killing"
                );
                if let Err(e) = self.terminate() {
                    warn!(command = %self.label, error = %e, "failed to kill process");
                }
                self.wait().await
            }
        }
    }
}

fn outcome_from_status(status: ExitStatus) -> Result<(), ExecError> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(code) => Err(ExecError::NonZeroExit { code }),
        None => Err(ExecError::Signal {
            signal: status.signal(),
        }),
    }
}
