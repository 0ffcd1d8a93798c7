//! Structured activity logging for detector and orchestrator events.
//!
//! Provides the [`ActivityLogger`] trait and associated types. The primary
//! implementation, [`JsonlActivityWriter`], appends JSONL records to
//! daily-rotating files in the vault's `logs/` folder and plain error lines
//! to `logs/errors.log`.
//!
//! Logging proceeds identically in dry-run mode: the activity trail is
//! observability, not task state, and is what makes a dry run verifiable.

pub mod writer;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A structured record of one detector or orchestrator action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// ISO 8601 timestamp with timezone.
    pub timestamp: DateTime<Utc>,
    /// Action label, e.g. `file_dropped`, `intent_analyzed`, `task_archived`.
    pub action: String,
    /// File the action concerned.
    pub file: String,
    /// Brief outcome, e.g. `created`, `completed`, `moved_to_done`.
    pub status: String,
    /// Action-specific extra fields, flattened into the record.
    #[serde(flatten, skip_serializing_if = "BTreeMap::is_empty", default)]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl ActivityEntry {
    /// Construct a minimal entry for the given action.
    #[must_use]
    pub fn new(action: &str, file: &str, status: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.to_owned(),
            file: file.to_owned(),
            status: status.to_owned(),
            details: BTreeMap::new(),
        }
    }

    /// Attach an extra field to this entry.
    #[must_use]
    pub fn with_detail(mut self, key: &str, value: serde_json::Value) -> Self {
        self.details.insert(key.to_owned(), value);
        self
    }
}

/// Writes structured activity entries to a persistent store.
///
/// Implementations must be [`Send`] and [`Sync`] to allow sharing across
/// async task boundaries via [`std::sync::Arc`].
pub trait ActivityLogger: Send + Sync {
    /// Record a single activity entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying write operation fails.
    fn log_entry(&self, entry: ActivityEntry) -> crate::Result<()>;

    /// Append a line to the error log.
    fn log_error(&self, message: &str);
}

pub use writer::JsonlActivityWriter;
