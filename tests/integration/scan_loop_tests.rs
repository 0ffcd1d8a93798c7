//! Scan-loop lifecycle: iteration bounds and cancellation.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use dropclerk::models::Stage;

use super::test_helpers::TestEnv;

#[tokio::test]
async fn iteration_bound_stops_the_loop() {
    let env = TestEnv::new();
    env.seed_task("note.txt", "The sky is blue today");

    let orchestrator = env.orchestrator(3);
    let ct = CancellationToken::new();
    let iterations = orchestrator.run(ct).await;

    // Exactly three scans even though everything was done after the first.
    assert_eq!(iterations, 3);
    assert_eq!(env.store.count(Stage::NeedsAction), 0);
    assert_eq!(env.store.count(Stage::Done), 1);
}

#[tokio::test]
async fn pre_cancelled_token_runs_no_scan() {
    let env = TestEnv::new();
    env.seed_task("note.txt", "The sky is blue today");

    let ct = CancellationToken::new();
    ct.cancel();
    let iterations = env.orchestrator(0).run(ct).await;

    assert_eq!(iterations, 0);
    assert_eq!(env.store.count(Stage::NeedsAction), 1, "nothing processed");
}

#[tokio::test]
async fn cancellation_between_scans_finishes_cleanly() {
    let env = TestEnv::new();
    env.seed_task("note.txt", "The sky is blue today");

    let orchestrator = env.orchestrator(0);
    let ct = CancellationToken::new();
    let canceller = ct.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        canceller.cancel();
    });

    let iterations = orchestrator.run(ct).await;
    handle.await.expect("canceller");

    // The first scan runs immediately; the one-second interval means the
    // cancel lands during the wait.
    assert_eq!(iterations, 1);
    assert_eq!(env.store.count(Stage::Done), 1);
}

#[tokio::test]
async fn unbounded_loop_keeps_scanning_until_cancelled() {
    let env = TestEnv::new();

    let orchestrator = env.orchestrator(0);
    let ct = CancellationToken::new();
    let canceller = ct.clone();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(2500)).await;
        canceller.cancel();
    });

    let iterations = orchestrator.run(ct).await;
    handle.await.expect("canceller");

    assert!(iterations >= 2, "max_iterations of zero means unbounded");
}
