//! Scan–classify–route–archive loop.
//!
//! Each scan is a bounded, synchronous sweep: enumerate pending tasks once,
//! process each to completion (success or logged failure) before the next,
//! then recompute the dashboard summary. A failed task stays in
//! `needs-action` and is retried on the next scan.

pub mod dashboard;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, info_span, warn};

use crate::activity::{ActivityEntry, ActivityLogger, JsonlActivityWriter};
use crate::classify::RuleSet;
use crate::config::OrchestratorConfig;
use crate::models::task::parse_front_matter;
use crate::models::Stage;
use crate::skills::SkillRouter;
use crate::store::{TaskHandle, TaskStore};
use crate::{AppError, Result};

/// Drives task processing over the shared folder hierarchy.
pub struct Orchestrator {
    store: TaskStore,
    activity: Arc<JsonlActivityWriter>,
    rules: RuleSet,
    cfg: OrchestratorConfig,
}

impl Orchestrator {
    /// Build an orchestrator over the given store and activity log.
    #[must_use]
    pub fn new(
        store: TaskStore,
        activity: Arc<JsonlActivityWriter>,
        rules: RuleSet,
        cfg: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            activity,
            rules,
            cfg,
        }
    }

    /// Run one full scan: process every pending task, then refresh the
    /// dashboard. Returns the number of tasks that completed successfully.
    #[must_use]
    pub fn scan_once(&self) -> usize {
        let _span = info_span!("scan").entered();

        let tasks = match self.store.list(Stage::NeedsAction) {
            Ok(tasks) => tasks,
            Err(err) => {
                error!(%err, "cannot enumerate pending tasks");
                self.activity.log_error(&format!("scan failed: {err}"));
                return 0;
            }
        };

        if tasks.is_empty() {
            info!("no pending tasks");
        } else {
            info!(count = tasks.len(), "processing pending tasks");
        }

        let mut completed = 0;
        for task in &tasks {
            match self.process_task(task) {
                Ok(()) => completed += 1,
                Err(err) => {
                    // Leave the task in place; the next scan retries it.
                    error!(task = %task.file_name(), %err, "task processing failed");
                    self.activity
                        .log_error(&format!("processing task {}: {err}", task.file_name()));
                }
            }
        }

        if let Err(err) = dashboard::refresh(&self.store, &self.activity) {
            error!(%err, "dashboard refresh failed");
            self.activity.log_error(&format!("dashboard refresh: {err}"));
        }

        completed
    }

    /// Read, classify, route, and archive a single task.
    ///
    /// # Errors
    ///
    /// Returns any read, handler, or transition failure. A task document
    /// that vanished between enumeration and read is not an error: another
    /// actor already archived it.
    pub fn process_task(&self, task: &TaskHandle) -> Result<()> {
        let _span = info_span!("process_task", task = %task.file_name()).entered();

        let task_content = match self.store.read(task) {
            Ok(content) => content,
            Err(AppError::NotFound(path)) => {
                warn!(%path, "task document vanished before read, skipping");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let (fields, _body) = parse_front_matter(&task_content);
        let task_name = fields
            .get("original_name")
            .cloned()
            .unwrap_or_else(|| task.file_name());

        // The originally dropped file sits next to the task document.
        let source_content = self
            .store
            .find_named(Stage::NeedsAction, &task_name)
            .into_iter()
            .filter(|path| *path != task.path)
            .find_map(|path| std::fs::read_to_string(path).ok())
            .unwrap_or_default();
        let combined = format!("{task_content}\n{source_content}");

        let result = self.rules.classify(&combined);
        info!(
            intent = %result.intent,
            confidence = result.confidence,
            requires_approval = result.requires_approval,
            "intent analyzed"
        );
        self.activity.log_entry(
            ActivityEntry::new("intent_analyzed", &task.file_name(), result.intent.as_str())
                .with_detail("analysis", serde_json::to_value(&result)?),
        )?;

        let router = SkillRouter::new(&self.store, &self.rules);
        let outcome = router.dispatch(&task_name, &combined, &result)?;

        self.activity.log_entry(
            ActivityEntry::new("task_processed", &task.file_name(), "completed")
                .with_detail("intent", serde_json::json!(outcome.intent.as_str()))
                .with_detail(
                    "requires_approval",
                    serde_json::json!(outcome.requires_approval),
                ),
        )?;

        let archived = self.store.transition(task, Stage::Done)?;

        // Relocate the originally dropped file too; non-fatal when gone.
        for source in self.store.find_named(Stage::NeedsAction, &task_name) {
            if source == task.path {
                continue;
            }
            if let Err(err) = self.store.relocate(&source, Stage::Done) {
                warn!(file = %source.display(), %err, "could not archive source file");
            }
        }

        self.activity.log_entry(
            ActivityEntry::new("task_archived", &task.file_name(), "moved_to_done")
                .with_detail(
                    "destination",
                    serde_json::json!(archived.path.display().to_string()),
                ),
        )?;

        info!("task archived");
        Ok(())
    }

    /// Run scans until cancellation or the configured iteration bound.
    ///
    /// `max_iterations == 0` runs unbounded. The in-flight scan completes
    /// before a cancellation takes effect. Returns the number of scans
    /// performed.
    pub async fn run(&self, ct: CancellationToken) -> u32 {
        let mut iterations: u32 = 0;

        loop {
            if ct.is_cancelled() {
                break;
            }

            let _ = self.scan_once();
            iterations += 1;

            if self.cfg.max_iterations != 0 && iterations >= self.cfg.max_iterations {
                info!(iterations, "iteration bound reached");
                break;
            }

            tokio::select! {
                () = ct.cancelled() => break,
                () = tokio::time::sleep(self.cfg.check_interval()) => {}
            }
        }

        iterations
    }
}
