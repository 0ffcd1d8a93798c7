//! Shared helpers for orchestrator-level integration tests.
//!
//! Builds a live vault in a tempdir, seeds task documents the way the
//! arrival detector would, and constructs orchestrators with fast scan
//! settings for test isolation.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use dropclerk::activity::JsonlActivityWriter;
use dropclerk::classify::RuleSet;
use dropclerk::config::OrchestratorConfig;
use dropclerk::models::{Priority, Stage, TaskMeta};
use dropclerk::orchestrator::Orchestrator;
use dropclerk::store::{TaskHandle, TaskStore};

/// A live vault rooted in a tempdir.
pub struct TestEnv {
    pub temp: tempfile::TempDir,
    pub store: TaskStore,
    pub activity: Arc<JsonlActivityWriter>,
}

impl TestEnv {
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let store = TaskStore::new(temp.path().to_owned(), false);
        store.ensure_folders().expect("folders");
        let activity = Arc::new(JsonlActivityWriter::new(store.logs_dir()).expect("writer"));
        Self {
            temp,
            store,
            activity,
        }
    }

    /// Build an orchestrator over this vault.
    pub fn orchestrator(&self, max_iterations: u32) -> Orchestrator {
        Orchestrator::new(
            self.store.clone(),
            Arc::clone(&self.activity),
            RuleSet::new().expect("rules"),
            OrchestratorConfig {
                check_interval_seconds: 1,
                max_iterations,
            },
        )
    }

    /// Seed a pending task plus its source file, the way the detector does.
    pub fn seed_task(&self, file_name: &str, source_content: &str) -> TaskHandle {
        let source_path = self.store.stage_dir(Stage::NeedsAction).join(file_name);
        std::fs::write(&source_path, source_content).expect("write source");

        let meta = TaskMeta {
            original_name: file_name.to_owned(),
            source_path: self.temp.path().join("drop").join(file_name),
            size: source_content.len() as u64,
            detected: Utc::now(),
            priority: Priority::Medium,
        };
        self.store
            .create(Stage::NeedsAction, &meta.render())
            .expect("seed task")
    }

    /// Read the single `.md` document in a stage folder.
    pub fn read_single(&self, stage: Stage) -> String {
        let handles = self.store.list(stage).expect("list");
        assert_eq!(
            handles.len(),
            1,
            "expected exactly one document in {stage}",
        );
        self.store.read(&handles[0]).expect("read")
    }
}

/// Files in a directory whose name matches a prefix and suffix.
pub fn files_matching(dir: &Path, prefix: &str, suffix: &str) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| {
                    p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(prefix) && n.ends_with(suffix))
                })
                .collect()
        })
        .unwrap_or_default()
}
