//! Unit tests for the JSONL activity writer and the error log.

use chrono::Utc;
use dropclerk::activity::{ActivityEntry, ActivityLogger, JsonlActivityWriter};

#[test]
fn new_creates_directory_if_missing() {
    let temp = tempfile::tempdir().expect("tempdir");
    let log_dir = temp.path().join("nested").join("logs");

    let writer = JsonlActivityWriter::new(log_dir.clone()).expect("writer");
    writer
        .log_entry(ActivityEntry::new("file_dropped", "/drop/a.txt", "created"))
        .expect("write");

    assert!(log_dir.exists());
}

#[test]
fn entries_append_to_daily_file_as_jsonl() {
    let temp = tempfile::tempdir().expect("tempdir");
    let writer = JsonlActivityWriter::new(temp.path().to_owned()).expect("writer");

    writer
        .log_entry(
            ActivityEntry::new("file_dropped", "/drop/a.txt", "created")
                .with_detail("size", serde_json::json!(12)),
        )
        .expect("first");
    writer
        .log_entry(ActivityEntry::new("task_processed", "task_1.md", "completed"))
        .expect("second");

    let path = writer.file_for_date(Utc::now().date_naive());
    let raw = std::fs::read_to_string(&path).expect("read log");
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);

    let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
    assert_eq!(first["action"], "file_dropped");
    assert_eq!(first["status"], "created");
    assert_eq!(first["size"], 12, "details must be flattened");
    let second: serde_json::Value = serde_json::from_str(lines[1]).expect("valid json");
    assert_eq!(second["action"], "task_processed");
}

#[test]
fn daily_file_name_uses_calendar_date() {
    let temp = tempfile::tempdir().expect("tempdir");
    let writer = JsonlActivityWriter::new(temp.path().to_owned()).expect("writer");
    writer
        .log_entry(ActivityEntry::new("dashboard_update", "Dashboard.md", "updated"))
        .expect("write");

    let expected = format!("{}.jsonl", Utc::now().date_naive());
    assert!(temp.path().join(expected).exists());
}

#[test]
fn recent_returns_tail_in_order() {
    let temp = tempfile::tempdir().expect("tempdir");
    let writer = JsonlActivityWriter::new(temp.path().to_owned()).expect("writer");
    for i in 0..8 {
        writer
            .log_entry(ActivityEntry::new("file_dropped", &format!("f{i}"), "created"))
            .expect("write");
    }

    let recent = writer.recent(5);
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0].file, "f3");
    assert_eq!(recent[4].file, "f7");
}

#[test]
fn recent_is_empty_without_log_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    let writer = JsonlActivityWriter::new(temp.path().to_owned()).expect("writer");
    assert!(writer.recent(5).is_empty());
}

#[test]
fn error_log_line_format() {
    let temp = tempfile::tempdir().expect("tempdir");
    let writer = JsonlActivityWriter::new(temp.path().to_owned()).expect("writer");
    writer.log_error("processing task_1.md: boom");
    writer.log_error("second failure");

    let raw = std::fs::read_to_string(temp.path().join("errors.log")).expect("read");
    let lines: Vec<&str> = raw.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains(" - ERROR - processing task_1.md: boom"));
    assert!(lines[1].ends_with(" - ERROR - second failure"));
}
