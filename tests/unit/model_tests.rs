//! Unit tests for task models and the front-matter document format.

use std::path::PathBuf;

use chrono::Utc;
use dropclerk::models::task::parse_front_matter;
use dropclerk::models::{Priority, Stage, TaskMeta};

#[test]
fn stage_folder_names() {
    assert_eq!(Stage::Drop.dir_name(), "drop");
    assert_eq!(Stage::NeedsAction.dir_name(), "needs-action");
    assert_eq!(Stage::PendingApproval.dir_name(), "pending-approval");
    assert_eq!(Stage::Plans.dir_name(), "plans");
    assert_eq!(Stage::Done.dir_name(), "done");
    assert_eq!(Stage::Approved.dir_name(), "approved");
    assert_eq!(Stage::Rejected.dir_name(), "rejected");
}

#[test]
fn priority_defaults_to_medium() {
    assert_eq!(Priority::default(), Priority::Medium);
    assert_eq!(Priority::High.as_str(), "high");
    assert!(Priority::Low < Priority::High);
}

#[test]
fn task_meta_renders_contract_fields() {
    let meta = TaskMeta {
        original_name: "invoice.txt".to_owned(),
        source_path: PathBuf::from("/vault/drop/invoice.txt"),
        size: 42,
        detected: Utc::now(),
        priority: Priority::Medium,
    };
    let doc = meta.render();

    assert!(doc.starts_with("---\n"));
    assert!(doc.contains("type: file_drop"));
    assert!(doc.contains("original_name: invoice.txt"));
    assert!(doc.contains("source_path: /vault/drop/invoice.txt"));
    assert!(doc.contains("size: 42"));
    assert!(doc.contains("detected: "));
    assert!(doc.contains("priority: medium"));
    assert!(doc.contains("status: pending"));
}

#[test]
fn front_matter_round_trip() {
    let meta = TaskMeta {
        original_name: "report.md".to_owned(),
        source_path: PathBuf::from("/vault/drop/report.md"),
        size: 7,
        detected: Utc::now(),
        priority: Priority::High,
    };
    let (fields, body) = parse_front_matter(&meta.render());

    assert_eq!(fields.get("original_name").map(String::as_str), Some("report.md"));
    assert_eq!(fields.get("size").map(String::as_str), Some("7"));
    assert_eq!(fields.get("priority").map(String::as_str), Some("high"));
    assert!(body.contains("# File Dropped: report.md"));
}

#[test]
fn document_without_front_matter_is_all_body() {
    let content = "just some text\nwith two lines";
    let (fields, body) = parse_front_matter(content);
    assert!(fields.is_empty());
    assert_eq!(body, content);
}

#[test]
fn malformed_front_matter_lines_are_skipped() {
    let content = "---\nkey: value\nnot a pair\nother: x\n---\nbody";
    let (fields, body) = parse_front_matter(content);
    assert_eq!(fields.len(), 2);
    assert_eq!(fields.get("key").map(String::as_str), Some("value"));
    assert_eq!(body, "body");
}

#[test]
fn front_matter_values_may_contain_colons() {
    let content = "---\ndetected: 2026-08-30T10:00:00+00:00\n---\n";
    let (fields, _) = parse_front_matter(content);
    assert_eq!(
        fields.get("detected").map(String::as_str),
        Some("2026-08-30T10:00:00+00:00")
    );
}
