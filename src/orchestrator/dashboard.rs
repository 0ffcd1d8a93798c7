//! Dashboard summary regeneration.

use std::fmt::Write as _;

use chrono::Utc;

use crate::activity::{ActivityEntry, ActivityLogger, JsonlActivityWriter};
use crate::models::Stage;
use crate::store::TaskStore;
use crate::Result;

/// Dashboard file name at the vault root.
pub const DASHBOARD_FILE: &str = "Dashboard.md";

/// Number of recent activity entries shown.
const RECENT_LIMIT: usize = 5;

/// Recompute per-stage counts and rewrite the dashboard document.
///
/// # Errors
///
/// Returns an error if the dashboard or its activity entry cannot be
/// written.
pub fn refresh(store: &TaskStore, activity: &JsonlActivityWriter) -> Result<()> {
    let needs_action = store.count(Stage::NeedsAction);
    let pending = store.count(Stage::PendingApproval);
    let plans = store.count(Stage::Plans);
    let done = store.count(Stage::Done);

    let mut doc = String::new();
    let _ = writeln!(doc, "---");
    let _ = writeln!(doc, "type: dashboard");
    let _ = writeln!(doc, "last_updated: {}", Utc::now().format("%Y-%m-%d"));
    let _ = writeln!(doc, "status: active");
    let _ = writeln!(doc, "---");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "# Clerical Worker Dashboard");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "## Task Summary");
    let _ = writeln!(doc, "- Needs Action: {needs_action}");
    let _ = writeln!(doc, "- Pending Approval: {pending}");
    let _ = writeln!(doc, "- Active Plans: {plans}");
    let _ = writeln!(doc, "- Completed Tasks: {done}");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "## Recent Activities");

    let recent = activity.recent(RECENT_LIMIT);
    if recent.is_empty() {
        let _ = writeln!(doc, "- No activities yet");
    } else {
        for entry in recent {
            let _ = writeln!(
                doc,
                "- [{}] {} - {}",
                entry.timestamp.format("%Y-%m-%dT%H:%M:%S"),
                entry.action,
                entry.status
            );
        }
    }

    let path = store.write_root_file(DASHBOARD_FILE, &doc)?;

    activity.log_entry(
        ActivityEntry::new("dashboard_update", &path.display().to_string(), "updated")
            .with_detail("needs_action", serde_json::json!(needs_action))
            .with_detail("pending", serde_json::json!(pending))
            .with_detail("plans", serde_json::json!(plans))
            .with_detail("done", serde_json::json!(done)),
    )?;

    Ok(())
}
