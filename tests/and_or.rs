// tests/and_or.rs
mod common;
use crate::common::{TestResult, echo, false_cmd, init_tracing, sh, true_cmd, with_timeout};

use shellpipe::{CancellationToken, ExecError, OperationType, RunResult, cmd};

fn assert_skipped(result: &RunResult) {
    assert!(result.skipped, "expected a skipped result, got {result:?}");
    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.is_empty());
    assert!(result.error.is_none());
}

#[tokio::test]
async fn and_runs_right_after_success() -> TestResult {
    init_tracing();

    // true && echo x
    let result = with_timeout(true_cmd().and(echo("x")).run(&CancellationToken::new())).await;

    assert!(result.error.is_none());
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout_lossy().trim(), "x");
    assert_eq!(result.children.len(), 2);
    assert!(!result.children[1].skipped);
    Ok(())
}

#[tokio::test]
async fn and_skips_right_after_failure() -> TestResult {
    init_tracing();

    // false && echo x
    let result = with_timeout(false_cmd().and(echo("x")).run(&CancellationToken::new())).await;

    assert!(result.error.is_some(), "expected error from false command");
    assert_ne!(result.exit_code, 0);
    assert!(!result.stdout_lossy().contains('x'));
    assert_eq!(result.children.len(), 2);
    assert_skipped(&result.children[1]);
    Ok(())
}

#[tokio::test]
async fn and_mirrors_left_output_and_code_on_failure() -> TestResult {
    init_tracing();

    let result = with_timeout(
        sh("echo partial; exit 9")
            .and(echo("never"))
            .run(&CancellationToken::new()),
    )
    .await;

    assert_eq!(result.exit_code, 9);
    assert_eq!(result.error, Some(ExecError::NonZeroExit { code: 9 }));
    assert_eq!(result.stdout_lossy().trim(), "partial");
    Ok(())
}

#[tokio::test]
async fn or_recovers_from_left_failure() -> TestResult {
    init_tracing();

    // false || echo y
    let result = with_timeout(false_cmd().or(echo("y")).run(&CancellationToken::new())).await;

    assert!(result.error.is_none(), "or should recover: {:?}", result.error);
    assert_eq!(result.exit_code, 0);
    assert_eq!(result.stdout_lossy().trim(), "y");

    // The failure stays visible on the left child.
    assert_eq!(result.children[0].error, Some(ExecError::NonZeroExit { code: 1 }));
    assert!(!result.children[1].skipped);
    Ok(())
}

#[tokio::test]
async fn or_skips_right_after_success() -> TestResult {
    init_tracing();

    // echo left || echo z
    let result = with_timeout(echo("left").or(echo("z")).run(&CancellationToken::new())).await;

    assert!(result.is_success());
    assert_eq!(result.stdout_lossy().trim(), "left");
    assert_eq!(result.children.len(), 2);
    assert_skipped(&result.children[1]);
    Ok(())
}

#[tokio::test]
async fn or_surfaces_right_error_when_both_fail() -> TestResult {
    init_tracing();

    let result = with_timeout(sh("exit 2").or(sh("exit 6")).run(&CancellationToken::new())).await;

    assert_eq!(result.exit_code, 6);
    assert_eq!(result.error, Some(ExecError::NonZeroExit { code: 6 }));
    Ok(())
}

#[tokio::test]
async fn pipe_and_or_combine_like_a_shell() -> TestResult {
    init_tracing();

    // (echo test | grep test) && echo found || echo "not found"
    let tree = echo("test")
        .pipe(cmd("grep", ["test"]))
        .and(echo("found"))
        .or(echo("not found"));
    let result = with_timeout(tree.run(&CancellationToken::new())).await;

    assert!(result.is_success());
    assert_eq!(result.stdout_lossy().trim(), "found");
    assert_eq!(result.op, OperationType::Or);
    assert_skipped(&result.children[1]);
    Ok(())
}

#[tokio::test]
async fn failed_grep_falls_through_to_or_branch() -> TestResult {
    init_tracing();

    let tree = echo("test")
        .pipe(cmd("grep", ["missing"]))
        .and(echo("found"))
        .or(echo("not found"));
    let result = with_timeout(tree.run(&CancellationToken::new())).await;

    assert!(result.is_success());
    assert_eq!(result.stdout_lossy().trim(), "not found");

    let and_result = &result.children[0];
    assert_eq!(and_result.op, OperationType::And);
    assert_eq!(and_result.exit_code, 1);
    assert_skipped(&and_result.children[1]);
    Ok(())
}

#[tokio::test]
async fn result_tree_mirrors_the_executed_shape() -> TestResult {
    init_tracing();

    let result = with_timeout(echo("first").and(echo("second")).run(&CancellationToken::new())).await;

    assert!(result.is_success());
    assert_eq!(result.op, OperationType::And);
    assert_eq!(result.children.len(), 2);
    assert_eq!(result.children[0].op, OperationType::Single);
    assert_eq!(result.children[1].op, OperationType::Single);
    assert_eq!(result.children[0].stdout_lossy().trim(), "first");
    assert_eq!(result.stdout_lossy().trim(), "second");
    Ok(())
}
