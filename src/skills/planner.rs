//! Plan artifact generation.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::Utc;

use crate::models::{IntentResult, Stage};
use crate::store::TaskStore;
use crate::Result;

/// Write a plan artifact into the `plans` folder.
///
/// Front-matter mirrors the classification result; the body summarizes the
/// task and the analysis for later human review.
///
/// # Errors
///
/// Returns a store error if the artifact cannot be written.
pub fn write_plan(
    store: &TaskStore,
    name: &str,
    description: &str,
    result: &IntentResult,
) -> Result<PathBuf> {
    let created = Utc::now();
    let mut doc = String::new();

    let _ = writeln!(doc, "---");
    let _ = writeln!(doc, "type: plan");
    let _ = writeln!(doc, "created: {}", created.to_rfc3339());
    let _ = writeln!(doc, "priority: {}", result.priority.as_str());
    let _ = writeln!(doc, "status: pending");
    let _ = writeln!(doc, "intent: {}", result.intent);
    let _ = writeln!(doc, "category: {}", result.category);
    let _ = writeln!(doc, "requires_approval: {}", result.requires_approval);
    if let Some(reason) = &result.approval_reason {
        let _ = writeln!(doc, "approval_reason: {reason}");
    }
    let _ = writeln!(doc, "---");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "# Task Plan: {name}");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "## Overview");
    let _ = writeln!(doc, "{description}");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "## Intent Analysis");
    let _ = writeln!(doc, "- Detected intent: {}", result.intent);
    let _ = writeln!(doc, "- Category: {}", result.category);
    let _ = writeln!(doc, "- Confidence: {:.2}", result.confidence);
    let _ = writeln!(
        doc,
        "- Requires approval: {}",
        if result.requires_approval { "yes" } else { "no" }
    );
    if let Some(reason) = &result.approval_reason {
        let _ = writeln!(doc, "- Approval reason: {reason}");
    }
    for (key, value) in &result.entities {
        let _ = writeln!(doc, "- {key}: {value}");
    }
    let _ = writeln!(doc);
    let _ = writeln!(doc, "## Checklist");
    if result.requires_approval {
        let _ = writeln!(doc, "- [ ] Manager approval obtained");
    }
    let _ = writeln!(doc, "- [ ] Result verified");

    let file_name = format!("plan_{}.md", super::artifact_timestamp());
    store.create_named(Stage::Plans, &file_name, &doc)
}
