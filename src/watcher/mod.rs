//! File-arrival detection: raw filesystem events into durable task records.

pub mod detector;

use std::path::{Path, PathBuf};

pub use detector::ArrivalDetector;

/// Kind of observation that surfaced a candidate file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileEventKind {
    /// File created in the drop folder.
    Created,
    /// File content modified (also fired mid-copy on some platforms).
    Modified,
    /// File moved or renamed into the drop folder.
    Moved,
    /// Found by the periodic poll or the startup scan.
    Rescan,
}

impl FileEventKind {
    /// Lowercase label used in activity log entries.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Moved => "moved",
            Self::Rescan => "rescan",
        }
    }
}

/// Deduplication fingerprint for an observed file.
///
/// A given fingerprint is accepted at most once per process lifetime;
/// re-observation is a no-op. The set grows for the life of the watcher,
/// which is bounded by the number of distinct files ever seen. A restart
/// clears the set, so a file still present in the drop folder is
/// re-processed — accepted behavior, not a defect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcessedKey {
    path: PathBuf,
    size: u64,
    mtime_ms: u128,
}

impl ProcessedKey {
    /// Build the fingerprint from a path and its current metadata.
    #[must_use]
    pub fn new(path: &Path, metadata: &std::fs::Metadata) -> Self {
        let mtime_ms = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map_or(0, |d| d.as_millis());
        Self {
            path: path.to_path_buf(),
            size: metadata.len(),
            mtime_ms,
        }
    }
}
