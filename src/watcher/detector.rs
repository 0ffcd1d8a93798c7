//! Debounced, deduplicating arrival detector over the drop folder.
//!
//! Two independent input channels feed the detector: a `notify` file-system
//! watch and a periodic full-directory poll. The poll exists because
//! event-driven watches are unreliable on some virtualized and networked
//! file systems. Both channels funnel into [`ArrivalDetector::observe`],
//! which serializes access to the shared dedup set and per-path debounce
//! map behind a single mutex.
//!
//! The settle delay is a synchronous wait local to one candidate: in this
//! single-task design a slow settle throttles overall throughput, an
//! accepted tradeoff for never reading a file mid-write.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Utc;
use notify::event::ModifyKind;
use notify::{EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::{FileEventKind, ProcessedKey};
use crate::activity::{ActivityEntry, ActivityLogger};
use crate::config::WatcherConfig;
use crate::models::{Stage, TaskMeta};
use crate::store::{TaskHandle, TaskStore};
use crate::{AppError, Result};

/// Heartbeat log cadence, in poll ticks.
const HEARTBEAT_EVERY_TICKS: u64 = 12;

/// Shared mutable detector state: the dedup set and the per-path
/// last-trigger map, guarded together by one lock. Both live for the
/// process and reset on restart.
#[derive(Debug, Default)]
struct DetectorState {
    processed: HashSet<ProcessedKey>,
    last_trigger: HashMap<PathBuf, Instant>,
}

impl DetectorState {
    /// Record a trigger for `path` unless one was accepted within `window`.
    /// Returns `true` when the event must be suppressed.
    fn should_debounce(&mut self, path: &Path, window: std::time::Duration) -> bool {
        let now = Instant::now();
        if let Some(last) = self.last_trigger.get(path) {
            if now.duration_since(*last) < window {
                return true;
            }
        }
        self.last_trigger.insert(path.to_path_buf(), now);
        false
    }
}

/// Converts stable, de-duplicated file arrivals into pending task records.
pub struct ArrivalDetector {
    store: TaskStore,
    activity: Arc<dyn ActivityLogger>,
    cfg: WatcherConfig,
    state: Mutex<DetectorState>,
}

impl ArrivalDetector {
    /// Build a detector over the given store and activity log.
    #[must_use]
    pub fn new(store: TaskStore, activity: Arc<dyn ActivityLogger>, cfg: WatcherConfig) -> Self {
        Self {
            store,
            activity,
            cfg,
            state: Mutex::new(DetectorState::default()),
        }
    }

    /// Handle one candidate with per-file error isolation: any failure is
    /// logged with full context and does not affect later candidates.
    pub async fn observe(&self, path: &Path, kind: FileEventKind) {
        if let Err(err) = self.process_candidate(path, kind).await {
            error!(file = %path.display(), %err, "failed to process candidate");
            self.activity
                .log_error(&format!("processing {}: {err}", path.display()));
        }
    }

    /// Full candidate pipeline: filter, debounce, settle, dedup, create.
    ///
    /// Returns the created task handle, or `None` when the candidate was
    /// filtered, suppressed, or vanished.
    ///
    /// # Errors
    ///
    /// Returns an error if the task document or file copy cannot be
    /// written, or the activity entry cannot be logged.
    pub async fn process_candidate(
        &self,
        path: &Path,
        kind: FileEventKind,
    ) -> Result<Option<TaskHandle>> {
        if !self.cfg.is_supported(path) {
            debug!(file = %path.display(), "ignored: unsupported extension");
            return Ok(None);
        }

        if kind == FileEventKind::Modified && self.debounced(path)? {
            debug!(file = %path.display(), "suppressed: within debounce window");
            return Ok(None);
        }

        // Fast-path skip: a pre-settle fingerprint already in the set means
        // the file has not changed since it was processed.
        let Ok(metadata) = fs::metadata(path) else {
            warn!(file = %path.display(), "file vanished before metadata read");
            return Ok(None);
        };
        if self.already_processed(&ProcessedKey::new(path, &metadata))? {
            debug!(file = %path.display(), "skipped: fingerprint already processed");
            return Ok(None);
        }

        // Let in-progress writes finish before trusting the metadata.
        tokio::time::sleep(self.cfg.settle_delay()).await;

        // The settled metadata is authoritative: the recorded fingerprint
        // must describe the file as read, not a mid-write snapshot.
        let Ok(metadata) = fs::metadata(path) else {
            warn!(file = %path.display(), "file disappeared during settle delay");
            return Ok(None);
        };
        let size = metadata.len();
        if size == 0 {
            warn!(file = %path.display(), "skipped: empty file");
            return Ok(None);
        }
        let key = ProcessedKey::new(path, &metadata);
        if self.already_processed(&key)? {
            debug!(file = %path.display(), "skipped: fingerprint already processed");
            return Ok(None);
        }

        let original_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| AppError::Watch(format!("no file name in {}", path.display())))?;

        info!(
            file = %original_name,
            size,
            event = kind.as_str(),
            "processing dropped file"
        );

        let meta = TaskMeta {
            original_name: original_name.clone(),
            source_path: path.to_path_buf(),
            size,
            detected: Utc::now(),
            priority: crate::models::Priority::Medium,
        };
        let handle = self.store.create(Stage::NeedsAction, &meta.render())?;
        self.store.copy_into(Stage::NeedsAction, path)?;

        self.activity.log_entry(
            ActivityEntry::new("file_dropped", &path.display().to_string(), "created")
                .with_detail("event_type", serde_json::json!(kind.as_str()))
                .with_detail(
                    "task_file",
                    serde_json::json!(handle.path.display().to_string()),
                )
                .with_detail("size", serde_json::json!(size))
                .with_detail("dry_run", serde_json::json!(self.store.dry_run())),
        )?;

        self.mark_processed(key)?;
        info!(task = %handle.file_name(), "task created");
        Ok(Some(handle))
    }

    /// Scan the drop folder for qualifying files and process each.
    ///
    /// Used at startup (files dropped before the watcher came up) and by
    /// the periodic poll. Deduplication makes repeat scans cheap no-ops.
    pub async fn scan_drop_folder(&self) {
        let dir = self.store.stage_dir(Stage::Drop);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), %err, "cannot scan drop folder");
                return;
            }
        };

        for entry in entries.filter_map(std::result::Result::ok) {
            let path = entry.path();
            if path.is_file() && self.cfg.is_supported(&path) {
                self.observe(&path, FileEventKind::Rescan).await;
            }
        }
    }

    /// Run the detector until cancellation.
    ///
    /// Starts the `notify` watch on the drop folder, performs a startup
    /// scan, then services file-system events and the fallback poll.
    /// An in-flight candidate completes before shutdown.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Watch` if the file-system watch cannot be
    /// established; this is fatal at startup.
    pub async fn run(self: Arc<Self>, ct: CancellationToken) -> Result<()> {
        let drop_dir = self.store.stage_dir(Stage::Drop);

        let (tx, mut rx) = mpsc::unbounded_channel::<(PathBuf, FileEventKind)>();
        let mut watcher = notify::recommended_watcher(
            move |result: std::result::Result<notify::Event, notify::Error>| match result {
                Ok(event) => {
                    if let Some(kind) = map_event_kind(&event.kind) {
                        for path in event.paths {
                            let _ = tx.send((path, kind));
                        }
                    }
                }
                Err(err) => {
                    warn!(%err, "file watcher error");
                }
            },
        )?;
        watcher.watch(&drop_dir, RecursiveMode::Recursive)?;
        info!(dir = %drop_dir.display(), "watching drop folder");

        self.scan_drop_folder().await;

        let mut poll = tokio::time::interval(self.cfg.poll_interval());
        // First tick fires immediately; the startup scan already covered it.
        poll.tick().await;
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                () = ct.cancelled() => {
                    info!("arrival detector shutting down");
                    break;
                }
                event = rx.recv() => {
                    match event {
                        Some((path, kind)) => self.observe(&path, kind).await,
                        None => {
                            warn!("watch event channel closed");
                            break;
                        }
                    }
                }
                _ = poll.tick() => {
                    self.scan_drop_folder().await;
                    ticks += 1;
                    if ticks % HEARTBEAT_EVERY_TICKS == 0 {
                        info!(polls = ticks, "watching for dropped files");
                    }
                }
            }
        }

        Ok(())
    }

    fn debounced(&self, path: &Path) -> Result<bool> {
        let mut state = self.lock_state()?;
        Ok(state.should_debounce(path, self.cfg.debounce_window()))
    }

    fn already_processed(&self, key: &ProcessedKey) -> Result<bool> {
        let state = self.lock_state()?;
        Ok(state.processed.contains(key))
    }

    fn mark_processed(&self, key: ProcessedKey) -> Result<()> {
        let mut state = self.lock_state()?;
        state.processed.insert(key);
        Ok(())
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, DetectorState>> {
        self.state
            .lock()
            .map_err(|_| AppError::Watch("detector state mutex poisoned".to_owned()))
    }
}

/// Map a notify event kind onto the detector's event model. Returns `None`
/// for events that can never surface a new file (removals, access).
fn map_event_kind(kind: &EventKind) -> Option<FileEventKind> {
    match kind {
        EventKind::Create(_) => Some(FileEventKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(FileEventKind::Moved),
        EventKind::Modify(_) => Some(FileEventKind::Modified),
        _ => None,
    }
}
