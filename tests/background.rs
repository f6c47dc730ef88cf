// tests/background.rs
mod common;
use crate::common::{TestResult, echo, init_tracing, sh, sleep, with_timeout};

use std::time::{Duration, Instant};

use shellpipe::{CancellationToken, ExecError, OperationType};

fn cancel_after(token: &CancellationToken, delay: Duration) {
    let token = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        token.cancel();
    });
}

#[tokio::test]
async fn background_job_is_drained_before_returning() -> TestResult {
    init_tracing();

    // sleep 0.1 &
    let started = Instant::now();
    let result = with_timeout(sleep("0.1").background().run(&CancellationToken::new())).await;

    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(result.op, OperationType::Background);
    assert_eq!(result.exit_code, 0);
    assert!(result.error.is_none());
    assert!(result.background_errors.is_empty());
    Ok(())
}

#[tokio::test]
async fn background_then_foreground_command() -> TestResult {
    init_tracing();

    // (sleep 0.1 &) && echo done
    let started = Instant::now();
    let tree = sleep("0.1").background().and(echo("done"));
    let result = with_timeout(tree.run(&CancellationToken::new())).await;

    assert!(started.elapsed() >= Duration::from_millis(100));
    assert!(result.is_success());
    assert_eq!(result.stdout_lossy().trim(), "done");
    assert_eq!(result.children[0].op, OperationType::Background);
    Ok(())
}

#[tokio::test]
async fn failed_job_is_reported_without_failing_the_run() -> TestResult {
    init_tracing();

    let result = with_timeout(sh("exit 3").background().run(&CancellationToken::new())).await;

    assert_eq!(result.exit_code, 0);
    assert!(result.error.is_none());
    assert_eq!(result.background_errors, vec![ExecError::NonZeroExit { code: 3 }]);
    Ok(())
}

#[tokio::test]
async fn each_background_operand_reports_its_own_errors() -> TestResult {
    init_tracing();

    let tree = sh("sleep 0.2; exit 4")
        .background()
        .and(sh("exit 5").background());
    let result = with_timeout(tree.run(&CancellationToken::new())).await;

    assert!(result.error.is_none());
    assert_eq!(
        result.children[0].background_errors,
        vec![ExecError::NonZeroExit { code: 4 }]
    );
    assert_eq!(
        result.children[1].background_errors,
        vec![ExecError::NonZeroExit { code: 5 }]
    );
    Ok(())
}

#[tokio::test]
async fn cancelling_during_drain_stops_the_job() -> TestResult {
    init_tracing();

    let token = CancellationToken::new();
    let tree = sleep("10")
        .with_shutdown_timeout(Duration::from_millis(300))
        .background()
        .with_shutdown_timeout(Duration::from_secs(2));

    cancel_after(&token, Duration::from_millis(100));
    let started = Instant::now();
    let result = with_timeout(tree.run(&token)).await;

    assert!(started.elapsed() < Duration::from_secs(3));
    // The background placeholder itself stays successful.
    assert!(result.error.is_none());
    Ok(())
}

#[tokio::test]
async fn job_ignoring_terminate_is_abandoned_after_grace() -> TestResult {
    init_tracing();

    let token = CancellationToken::new();
    // The job itself keeps the default grace; the drain gives it 200ms.
    let tree = sh("trap '' TERM; sleep 3")
        .background()
        .with_shutdown_timeout(Duration::from_millis(200));

    cancel_after(&token, Duration::from_millis(200));
    let started = Instant::now();
    let result = with_timeout(tree.run(&token)).await;

    assert!(started.elapsed() < Duration::from_secs(2));
    assert!(result.error.is_none());
    Ok(())
}
