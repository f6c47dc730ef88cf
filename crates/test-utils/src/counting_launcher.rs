use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use shellpipe::errors::ExecError;
use shellpipe::exec::{CommandSpec, Launcher, ProcessRunner, SystemLauncher};

/// A launcher that:
/// - records every command it was asked to start
/// - delegates the actual spawn to [`SystemLauncher`].
#[derive(Debug, Default)]
pub struct CountingLauncher {
    started: AtomicUsize,
    commands: Mutex<Vec<String>>,
}

impl CountingLauncher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Number of start attempts, successful or not.
    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Rendered commands in start order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

impl Launcher for CountingLauncher {
    fn start(&self, spec: &CommandSpec) -> Result<ProcessRunner, ExecError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        {
            let mut guard = self.commands.lock().unwrap();
            guard.push(spec.to_string());
        }
        SystemLauncher.start(spec)
    }
}
