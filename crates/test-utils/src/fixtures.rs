//! Common commands used across the integration tests.

use shellpipe::{Executable, Shell, cmd};

const NO_ARGS: [&str; 0] = [];

pub fn echo(text: &str) -> Executable {
    cmd("echo", [text])
}

pub fn true_cmd() -> Executable {
    cmd("true", NO_ARGS)
}

pub fn false_cmd() -> Executable {
    cmd("false", NO_ARGS)
}

pub fn sleep(seconds: &str) -> Executable {
    cmd("sleep", [seconds])
}

/// `sh -c <script>`
pub fn sh(script: &str) -> Executable {
    cmd("sh", ["-c", script])
}

/// `sh -c <script>` built through `shell`, so it uses the shell's launcher
/// and config.
pub fn sh_in(shell: &Shell, script: &str) -> Executable {
    shell.command("sh", ["-c", script])
}
