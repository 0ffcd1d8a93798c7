//! Persistence for bulk extraction records.

use std::path::PathBuf;

use crate::classify::ExtractionRecord;
use crate::store::TaskStore;
use crate::Result;

/// Persist an extraction record as pretty-printed JSON in `logs/`.
///
/// # Errors
///
/// Returns an error if serialization or the store write fails.
pub fn persist_record(store: &TaskStore, record: &ExtractionRecord) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(record)?;
    let file_name = format!("extraction_{}.json", super::artifact_timestamp());
    store.create_log_record(&file_name, &json)
}
