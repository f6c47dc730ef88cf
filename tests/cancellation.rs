// tests/cancellation.rs
mod common;
use crate::common::{TestResult, init_tracing, sh_in, with_timeout};

use std::sync::Arc;
use std::time::{Duration, Instant};

use shellpipe::{CancellationToken, ExecError, OperationType, Shell, ShellConfig};
use shellpipe_test_utils::builders::ShellConfigBuilder;
use shellpipe_test_utils::counting_launcher::CountingLauncher;

fn counting_shell(config: ShellConfig) -> (Shell, Arc<CountingLauncher>) {
    let launcher = CountingLauncher::new();
    let shell = Shell::with_launcher(config, launcher.clone());
    (shell, launcher)
}

fn quick_shutdown() -> ShellConfig {
    ShellConfigBuilder::new()
        .shutdown_timeout(Duration::from_secs(1))
        .build()
}

#[tokio::test]
async fn building_a_tree_starts_nothing() -> TestResult {
    init_tracing();

    let (shell, launcher) = counting_shell(ShellConfig::default());
    let tree = shell
        .command("echo", ["a"])
        .pipe(shell.command("cat", ["-"]))
        .and(shell.command("echo", ["b"]))
        .or(shell.command("echo", ["c"]))
        .background();

    assert_eq!(tree.operation(), OperationType::Background);
    assert_eq!(launcher.started(), 0);
    Ok(())
}

#[tokio::test]
async fn cancelled_before_start_spawns_nothing() -> TestResult {
    init_tracing();

    let (shell, launcher) = counting_shell(ShellConfig::default());
    let token = CancellationToken::new();
    token.cancel();

    let single = with_timeout(shell.command("echo", ["never"]).run(&token)).await;
    assert_eq!(single.error, Some(ExecError::Cancelled));
    assert_eq!(single.exit_code, -1);
    assert!(single.stdout.is_empty());

    let pipe = shell.command("echo", ["a"]).pipe(shell.command("cat", ["-"]));
    let piped = with_timeout(pipe.run(&token)).await;
    assert_eq!(piped.op, OperationType::Pipe);
    assert_eq!(piped.error, Some(ExecError::Cancelled));

    assert_eq!(launcher.started(), 0);
    Ok(())
}

#[tokio::test]
async fn cancelling_a_running_process_stops_it_promptly() -> TestResult {
    init_tracing();

    let (shell, launcher) = counting_shell(quick_shutdown());
    let token = CancellationToken::new();
    let tree = shell.command("sleep", ["10"]);

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let result = with_timeout(tree.run(&token)).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(result.error.is_some());
    assert_eq!(result.exit_code, -1);
    assert_eq!(launcher.started(), 1);
    Ok(())
}

#[tokio::test]
async fn cancelling_a_running_pipe_stops_every_stage() -> TestResult {
    init_tracing();

    let (shell, launcher) = counting_shell(quick_shutdown());
    let token = CancellationToken::new();
    let tree = shell.command("sleep", ["10"]).pipe(shell.command("cat", ["-"]));

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let result = with_timeout(tree.run(&token)).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert!(result.error.is_some());
    assert_eq!(launcher.started(), 2);
    assert_eq!(
        launcher.commands(),
        vec!["sleep 10".to_string(), "cat -".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn term_ignoring_process_is_killed_after_grace() -> TestResult {
    init_tracing();

    let config = ShellConfigBuilder::new()
        .shutdown_timeout(Duration::from_millis(200))
        .build();
    let (shell, _launcher) = counting_shell(config);
    let token = CancellationToken::new();
    let tree = sh_in(&shell, "trap '' TERM; while :; do sleep 0.05; done");

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let result = with_timeout(tree.run(&token)).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(result.error, Some(ExecError::Signal { signal: Some(9) }));
    Ok(())
}

#[tokio::test]
async fn cancelled_left_side_skips_the_right_side() -> TestResult {
    init_tracing();

    let (shell, launcher) = counting_shell(ShellConfig::default());
    let token = CancellationToken::new();
    token.cancel();

    let tree = shell.command("echo", ["a"]).and(shell.command("echo", ["b"]));
    let result = with_timeout(tree.run(&token)).await;

    assert_eq!(result.error, Some(ExecError::Cancelled));
    assert!(result.children[1].skipped);
    assert_eq!(launcher.started(), 0);
    Ok(())
}
