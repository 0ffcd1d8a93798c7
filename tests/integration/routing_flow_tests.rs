//! End-to-end routing scenarios: seed a pending task, run one scan, and
//! inspect the produced artifacts and archive state.

use std::sync::Arc;

use dropclerk::classify::RuleSet;
use dropclerk::models::Stage;
use dropclerk::orchestrator::Orchestrator;
use dropclerk::store::TaskStore;

use super::test_helpers::{files_matching, TestEnv};

#[test]
fn payment_request_produces_plan_and_acknowledgment() {
    let env = TestEnv::new();
    env.seed_task("invoice.txt", "Invoice #INV-2024 from Acme Corp for $750.00");

    let completed = env.orchestrator(1).scan_once();
    assert_eq!(completed, 1);

    // Primary artifact: a high-priority, approval-gated plan.
    let plan = env.read_single(Stage::Plans);
    assert!(plan.contains("type: plan"));
    assert!(plan.contains("intent: payment_request"));
    assert!(plan.contains("priority: high"));
    assert!(plan.contains("requires_approval: true"));
    assert!(plan.contains("INV-2024"));
    assert!(plan.contains("750"));
    assert!(plan.contains("Acme Corp"));

    // Secondary artifact: an acknowledgment draft awaiting approval.
    let draft = env.read_single(Stage::PendingApproval);
    assert!(draft.contains("type: email_draft"));
    assert!(draft.contains("status: pending_approval"));
    assert!(draft.contains("invoice INV-2024 for $750.00"));
    assert!(draft.contains("requires managerial approval"));

    // Task document and source file are both archived.
    assert_eq!(env.store.count(Stage::NeedsAction), 0);
    assert_eq!(env.store.count(Stage::Done), 1);
    assert!(env.temp.path().join("done/invoice.txt").exists());
}

#[test]
fn email_reply_produces_exactly_one_draft() {
    let env = TestEnv::new();
    env.seed_task(
        "request.txt",
        "Please reply to this email.\nFrom: a@b.com\nSubject: Hello",
    );

    assert_eq!(env.orchestrator(1).scan_once(), 1);

    let drafts = env.store.list(Stage::PendingApproval).expect("list");
    assert_eq!(drafts.len(), 1, "exactly one draft");
    let draft = env.store.read(&drafts[0]).expect("read");
    assert!(draft.contains("to: a@b.com"));
    assert!(draft.contains("subject: Re: Hello"));
    assert!(draft.contains("requires_approval: true"));

    assert_eq!(env.store.count(Stage::Plans), 0, "no plan for a pure reply");
    assert_eq!(env.store.count(Stage::Done), 1);
}

#[test]
fn unknown_content_gets_a_generic_plan() {
    let env = TestEnv::new();
    env.seed_task("musing.txt", "The sky is blue today");

    assert_eq!(env.orchestrator(1).scan_once(), 1);

    let plan = env.read_single(Stage::Plans);
    assert!(plan.contains("intent: unknown"));
    assert!(plan.contains("requires_approval: false"));
    assert!(plan.contains("priority: medium"));
    assert_eq!(env.store.count(Stage::PendingApproval), 0);
    assert_eq!(env.store.count(Stage::Done), 1);
}

#[test]
fn data_extraction_persists_record_and_plan() {
    let env = TestEnv::new();
    env.seed_task(
        "report.txt",
        "Please extract and summarize: contact x@y.com, total $99.00, due 2026-01-02",
    );

    assert_eq!(env.orchestrator(1).scan_once(), 1);

    let records = files_matching(&env.store.logs_dir(), "extraction_", ".json");
    assert_eq!(records.len(), 1);
    let raw = std::fs::read_to_string(&records[0]).expect("read record");
    let record: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(record["status"], "success");
    assert_eq!(record["data"]["email"], "x@y.com");

    let plan = env.read_single(Stage::Plans);
    assert!(plan.contains("intent: data_extraction"));
}

#[test]
fn failed_task_stays_pending_and_scan_continues() {
    let env = TestEnv::new();
    env.seed_task("one.txt", "The sky is blue today");
    env.seed_task("two.txt", "Nothing matches here either");

    // Sabotage plan writing so both tasks fail.
    std::fs::remove_dir_all(env.temp.path().join("plans")).expect("sabotage");
    let completed = env.orchestrator(1).scan_once();
    assert_eq!(completed, 0);

    // Both tasks remain for retry and both failures are on record.
    assert_eq!(env.store.count(Stage::NeedsAction), 2);
    let errors =
        std::fs::read_to_string(env.store.logs_dir().join("errors.log")).expect("error log");
    assert_eq!(errors.lines().count(), 2);

    // Next scan succeeds once the folder is back.
    env.store.ensure_folders().expect("restore");
    let retried = env.orchestrator(1).scan_once();
    assert_eq!(retried, 2);
    assert_eq!(env.store.count(Stage::Done), 2);
}

#[test]
fn dashboard_reflects_counts_after_scan() {
    let env = TestEnv::new();
    env.seed_task("invoice.txt", "Invoice #A-1 for $900.00, please pay");

    assert_eq!(env.orchestrator(1).scan_once(), 1);

    let dashboard =
        std::fs::read_to_string(env.temp.path().join("Dashboard.md")).expect("dashboard");
    assert!(dashboard.contains("type: dashboard"));
    assert!(dashboard.contains("- Needs Action: 0"));
    assert!(dashboard.contains("- Pending Approval: 1"));
    assert!(dashboard.contains("- Active Plans: 1"));
    assert!(dashboard.contains("- Completed Tasks: 1"));
    assert!(dashboard.contains("## Recent Activities"));
}

#[test]
fn dry_run_scan_logs_but_mutates_nothing() {
    let env = TestEnv::new();
    let task = env.seed_task("musing.txt", "The sky is blue today");

    // Same vault, dry-run store.
    let dry_store = TaskStore::new(env.temp.path().to_owned(), true);
    let orchestrator = Orchestrator::new(
        dry_store,
        Arc::clone(&env.activity),
        RuleSet::new().expect("rules"),
        dropclerk::config::OrchestratorConfig {
            check_interval_seconds: 1,
            max_iterations: 1,
        },
    );
    let completed = orchestrator.scan_once();
    assert_eq!(completed, 1, "dry run still processes the task");

    // Nothing moved, nothing written.
    assert!(task.path.exists(), "task must stay in needs-action");
    assert_eq!(env.store.count(Stage::Plans), 0);
    assert_eq!(env.store.count(Stage::Done), 0);
    assert!(!env.temp.path().join("Dashboard.md").exists());

    // The activity trail was still recorded.
    let recent = env.activity.recent(10);
    assert!(recent.iter().any(|e| e.action == "task_processed"));
}

#[test]
fn vanished_task_document_is_skipped_without_error() {
    let env = TestEnv::new();
    let task = env.seed_task("gone.txt", "The sky is blue today");
    std::fs::remove_file(&task.path).expect("remove task doc");
    std::fs::remove_file(env.temp.path().join("needs-action/gone.txt")).expect("remove source");

    // A handle enumerated before the document vanished is not an error.
    env.orchestrator(1)
        .process_task(&task)
        .expect("vanished document is skipped");

    assert_eq!(env.store.count(Stage::Done), 0);
    assert!(
        !env.store.logs_dir().join("errors.log").exists(),
        "a vanished document is expected, not an error"
    );
}
