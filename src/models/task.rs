//! Task lifecycle model: stages, priority, and the task document format.
//!
//! A task is a markdown document with a front-matter block. The folder the
//! document sits in encodes its lifecycle stage; moving the document between
//! folders *is* the stage transition.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle stage of a task, encoded as folder membership.
///
/// Normal progression is `NeedsAction → (PendingApproval | Plans) → Done`,
/// with no back-transitions. `Approved` and `Rejected` hold artifacts after
/// a human decision outside this system's scope.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Raw inbox watched by the arrival detector.
    Drop,
    /// Detected tasks awaiting orchestrator pickup.
    NeedsAction,
    /// Artifacts gated on a human approval decision.
    PendingApproval,
    /// Generated plan artifacts.
    Plans,
    /// Terminal archive for processed tasks.
    Done,
    /// Artifacts a human has approved.
    Approved,
    /// Artifacts a human has rejected.
    Rejected,
}

impl Stage {
    /// All stages, in the order their folders are created.
    pub const ALL: [Self; 7] = [
        Self::Drop,
        Self::NeedsAction,
        Self::PendingApproval,
        Self::Plans,
        Self::Done,
        Self::Approved,
        Self::Rejected,
    ];

    /// Folder name for this stage, relative to the vault root.
    #[must_use]
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::NeedsAction => "needs-action",
            Self::PendingApproval => "pending-approval",
            Self::Plans => "plans",
            Self::Done => "done",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Task priority carried through classification into artifacts.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Routine work.
    Low,
    /// Default for newly detected tasks.
    #[default]
    Medium,
    /// Raised by the classifier, e.g. for over-threshold payments.
    High,
}

impl Priority {
    /// Lowercase label used in front-matter.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Metadata for a newly detected task, rendered as document front-matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskMeta {
    /// File name of the originally dropped file.
    pub original_name: String,
    /// Absolute path the file was detected at.
    pub source_path: PathBuf,
    /// Observed size in bytes at detection time.
    pub size: u64,
    /// Detection timestamp.
    pub detected: DateTime<Utc>,
    /// Initial priority.
    pub priority: Priority,
}

impl TaskMeta {
    /// Render the full task document: front-matter plus a short body
    /// describing the dropped file.
    #[must_use]
    pub fn render(&self) -> String {
        let mut doc = String::new();
        let _ = writeln!(doc, "---");
        let _ = writeln!(doc, "type: file_drop");
        let _ = writeln!(doc, "original_name: {}", self.original_name);
        let _ = writeln!(doc, "source_path: {}", self.source_path.display());
        let _ = writeln!(doc, "size: {}", self.size);
        let _ = writeln!(doc, "detected: {}", self.detected.to_rfc3339());
        let _ = writeln!(doc, "priority: {}", self.priority.as_str());
        let _ = writeln!(doc, "status: pending");
        let _ = writeln!(doc, "---");
        let _ = writeln!(doc);
        let _ = writeln!(doc, "# File Dropped: {}", self.original_name);
        let _ = writeln!(doc);
        let _ = writeln!(
            doc,
            "A new file arrived in the drop folder and requires processing."
        );
        let _ = writeln!(doc);
        let _ = writeln!(doc, "- Name: {}", self.original_name);
        let _ = writeln!(doc, "- Size: {} bytes", self.size);
        let _ = writeln!(doc, "- Detected: {}", self.detected.to_rfc3339());
        let _ = writeln!(doc, "- Source: {}", self.source_path.display());
        doc
    }
}

/// Split a document into its front-matter fields and free-text body.
///
/// The front-matter is the `key: value` block between the two leading `---`
/// lines. Documents without a front-matter block yield an empty map and the
/// whole content as body. Malformed lines inside the block are skipped.
#[must_use]
pub fn parse_front_matter(content: &str) -> (BTreeMap<String, String>, String) {
    let mut fields = BTreeMap::new();
    let mut lines = content.lines();

    if lines.next().map(str::trim) != Some("---") {
        return (fields, content.to_owned());
    }

    for line in lines.by_ref() {
        if line.trim() == "---" {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            fields.insert(key.trim().to_owned(), value.trim().to_owned());
        }
    }

    let body = lines.collect::<Vec<_>>().join("\n");
    (fields, body)
}
