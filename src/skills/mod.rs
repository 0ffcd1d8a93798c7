//! Skill dispatch: route a classified task to the handler that produces
//! its artifact(s).
//!
//! Every intent maps to exactly one primary artifact plus, for some
//! intents, a secondary one. Handler failures are reported to the caller,
//! which isolates them at the per-task boundary — one bad task never halts
//! a scan.

pub mod email;
pub mod extractor;
pub mod planner;

use std::path::PathBuf;

use tracing::info;

use crate::classify::{extract_fields, RuleSet};
use crate::models::{Intent, IntentResult};
use crate::store::TaskStore;
use crate::Result;

/// Artifacts produced for one routed task.
#[derive(Debug, Clone)]
pub struct SkillOutcome {
    /// Intent the task was routed under.
    pub intent: Intent,
    /// Paths of all artifacts written, primary first.
    pub artifacts: Vec<PathBuf>,
    /// Whether any artifact is gated on human approval.
    pub requires_approval: bool,
}

/// Dispatches classified tasks to artifact-producing handlers.
pub struct SkillRouter<'a> {
    store: &'a TaskStore,
    rules: &'a RuleSet,
}

impl<'a> SkillRouter<'a> {
    /// Build a router over the given store and rule set.
    #[must_use]
    pub fn new(store: &'a TaskStore, rules: &'a RuleSet) -> Self {
        Self { store, rules }
    }

    /// Produce the artifact(s) for one classified task.
    ///
    /// `task_name` is the originally dropped file's name; `content` is the
    /// combined task document and source file text the classifier saw.
    ///
    /// # Errors
    ///
    /// Returns any handler write failure; the caller logs it and leaves the
    /// task in place for retry.
    pub fn dispatch(
        &self,
        task_name: &str,
        content: &str,
        result: &IntentResult,
    ) -> Result<SkillOutcome> {
        let artifacts = match result.intent {
            Intent::EmailDraft => {
                let draft = email::write_reply_draft(self.store, content, result)?;
                info!(file = %draft.display(), "email draft created");
                vec![draft]
            }
            Intent::PaymentRequest => {
                let invoice = result.entity_str("invoice_number").unwrap_or("unknown");
                let amount = result.entity_f64("amount").unwrap_or(0.0);
                let vendor = result.entity_str("vendor").unwrap_or("unknown vendor");

                let plan = planner::write_plan(
                    self.store,
                    &format!("Payment Processing - {invoice}"),
                    &format!("Process payment of ${amount:.2} from {vendor}"),
                    result,
                )?;
                info!(file = %plan.display(), "payment plan created");

                let ack = email::write_acknowledgment_draft(self.store, content, result)?;
                info!(file = %ack.display(), "acknowledgment draft created");
                vec![plan, ack]
            }
            Intent::DataExtraction => {
                let record = extract_fields(self.rules.extractors(), content);
                let record_path = extractor::persist_record(self.store, &record)?;
                info!(
                    file = %record_path.display(),
                    fields = record.data.len(),
                    "extraction record created"
                );

                let plan = planner::write_plan(
                    self.store,
                    &format!("Data Extraction - {task_name}"),
                    &format!(
                        "Extracted {} field(s) from {task_name}: {}",
                        record.data.len(),
                        record
                            .data
                            .keys()
                            .cloned()
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                    result,
                )?;
                vec![record_path, plan]
            }
            Intent::Unknown => {
                let plan = planner::write_plan(
                    self.store,
                    task_name,
                    &format!("Process task: {task_name}"),
                    result,
                )?;
                info!(file = %plan.display(), "generic plan created");
                vec![plan]
            }
        };

        Ok(SkillOutcome {
            intent: result.intent,
            artifacts,
            requires_approval: result.requires_approval,
        })
    }
}

/// Timestamp fragment used in artifact file names. Microsecond resolution
/// keeps names unique under the single-producer assumption.
pub(crate) fn artifact_timestamp() -> String {
    chrono::Utc::now().format("%Y%m%d_%H%M%S_%6f").to_string()
}
