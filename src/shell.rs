// src/shell.rs

//! Factory for leaves that share one launcher and one configuration.

use std::sync::Arc;

use crate::config::ShellConfig;
use crate::exec::{CommandSpec, Launcher, SystemLauncher};
use crate::pipeline::Executable;

/// Builds commands with the configured working directory, environment and
/// shutdown timeout, all started through the same [`Launcher`].
#[derive(Debug, Clone)]
pub struct Shell {
    config: ShellConfig,
    launcher: Arc<dyn Launcher>,
}

impl Shell {
    pub fn new(config: ShellConfig) -> Self {
        Self::with_launcher(config, Arc::new(SystemLauncher))
    }

    pub fn with_launcher(config: ShellConfig, launcher: Arc<dyn Launcher>) -> Self {
        Self { config, launcher }
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// A leaf for `program args...`.
    pub fn command<I, S>(&self, program: impl Into<String>, args: I) -> Executable
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spec(CommandSpec::new(program).args(args))
    }

    /// A leaf for an existing spec, with the shell's defaults applied on top.
    pub fn spec(&self, mut spec: CommandSpec) -> Executable {
        if spec.get_current_dir().is_none() {
            if let Some(dir) = &self.config.current_dir {
                spec = spec.current_dir(dir);
            }
        }
        for (key, value) in &self.config.env {
            spec = spec.env(key, value);
        }

        Executable::with_launcher(spec, Arc::clone(&self.launcher))
            .with_shutdown_timeout(self.config.shutdown_timeout)
    }
}

impl Default for Shell {
    fn default() -> Self {
        Self::new(ShellConfig::default())
    }
}
