//! Folder-state task store.
//!
//! Directory membership is the sole source of truth for task lifecycle:
//! a task lives in exactly one stage folder, and [`TaskStore::transition`]
//! relocates the document to advance it. All mutating operations honor the
//! dry-run flag by logging the intended action instead of performing it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, info};

use crate::models::Stage;
use crate::{AppError, Result};

/// Folder name for logs, which is not a task lifecycle stage.
const LOGS_DIR: &str = "logs";

/// Reference to a task document in a specific stage folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskHandle {
    /// Stage folder currently owning the document.
    pub stage: Stage,
    /// Full path of the document.
    pub path: PathBuf,
}

impl TaskHandle {
    /// Document file name.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Folder-backed task store rooted at the vault directory.
#[derive(Debug, Clone)]
pub struct TaskStore {
    root: PathBuf,
    dry_run: bool,
}

impl TaskStore {
    /// Create a store rooted at `root`. Does not touch the file system;
    /// call [`ensure_folders`](Self::ensure_folders) before first use.
    #[must_use]
    pub fn new(root: PathBuf, dry_run: bool) -> Self {
        Self { root, dry_run }
    }

    /// Vault root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether mutations are suppressed.
    #[must_use]
    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    /// Directory for a lifecycle stage.
    #[must_use]
    pub fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.root.join(stage.dir_name())
    }

    /// Directory for activity and error logs.
    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join(LOGS_DIR)
    }

    /// Create every lifecycle folder plus `logs/` if missing.
    ///
    /// Folder creation runs even in dry-run mode: the hierarchy is a
    /// precondition for operation, not task state.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if any directory cannot be created. This is
    /// the one store failure that is fatal at startup.
    pub fn ensure_folders(&self) -> Result<()> {
        for stage in Stage::ALL {
            let dir = self.stage_dir(stage);
            fs::create_dir_all(&dir).map_err(|err| {
                AppError::Store(format!("cannot create {}: {err}", dir.display()))
            })?;
        }
        let logs = self.logs_dir();
        fs::create_dir_all(&logs)
            .map_err(|err| AppError::Store(format!("cannot create {}: {err}", logs.display())))?;
        Ok(())
    }

    /// Write a new task document into `stage` and return its handle.
    ///
    /// The file name is derived from the creation timestamp with characters
    /// unsafe for the target file system normalized, so names sort
    /// lexicographically in chronological order. A numeric suffix is
    /// appended on the (concurrent-producer) collision case.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the document cannot be written.
    pub fn create(&self, stage: Stage, content: &str) -> Result<TaskHandle> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S-%6f").to_string();
        let dir = self.stage_dir(stage);

        let mut path = dir.join(format!("task_{timestamp}.md"));
        let mut suffix = 1u32;
        while path.exists() {
            path = dir.join(format!("task_{timestamp}-{suffix}.md"));
            suffix += 1;
        }

        self.write_raw(&path, content)?;
        Ok(TaskHandle { stage, path })
    }

    /// Write an artifact document with a caller-chosen file name into `stage`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the document cannot be written.
    pub fn create_named(&self, stage: Stage, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.stage_dir(stage).join(file_name);
        self.write_raw(&path, content)?;
        Ok(path)
    }

    /// Enumerate `.md` documents in `stage`, sorted by file name.
    ///
    /// File names are timestamp-derived, so lexicographic order is
    /// chronological by construction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the folder cannot be read.
    pub fn list(&self, stage: Stage) -> Result<Vec<TaskHandle>> {
        let dir = self.stage_dir(stage);
        let entries = fs::read_dir(&dir)
            .map_err(|err| AppError::Store(format!("cannot list {}: {err}", dir.display())))?;

        let mut handles: Vec<TaskHandle> = entries
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().is_some_and(|ext| ext == "md")
            })
            .map(|path| TaskHandle { stage, path })
            .collect();

        handles.sort_by_key(TaskHandle::file_name);
        Ok(handles)
    }

    /// Read a task document's content.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the document no longer exists, or
    /// `AppError::Io` on any other read failure.
    pub fn read(&self, handle: &TaskHandle) -> Result<String> {
        if !handle.path.exists() {
            return Err(AppError::NotFound(handle.path.display().to_string()));
        }
        fs::read_to_string(&handle.path).map_err(AppError::from)
    }

    /// Relocate a document to another stage folder.
    ///
    /// Idempotent: an absent source means the document was already moved,
    /// which is treated as success to tolerate at-least-once retries
    /// upstream.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the rename fails for any reason other
    /// than the source being gone.
    pub fn transition(&self, handle: &TaskHandle, to: Stage) -> Result<TaskHandle> {
        let dest = self.stage_dir(to).join(handle.file_name());
        let moved = TaskHandle {
            stage: to,
            path: dest.clone(),
        };

        if !handle.path.exists() {
            debug!(
                file = %handle.path.display(),
                "transition source already gone, treating as moved"
            );
            return Ok(moved);
        }

        if self.dry_run {
            info!(
                from = %handle.path.display(),
                to = %dest.display(),
                "[dry run] would move document"
            );
            return Ok(moved);
        }

        fs::rename(&handle.path, &dest).map_err(|err| {
            AppError::Store(format!(
                "cannot move {} to {}: {err}",
                handle.path.display(),
                dest.display()
            ))
        })?;
        Ok(moved)
    }

    /// Copy an external file into a stage folder, keeping its name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the copy fails.
    pub fn copy_into(&self, stage: Stage, src: &Path) -> Result<PathBuf> {
        let name = src
            .file_name()
            .ok_or_else(|| AppError::Store(format!("no file name in {}", src.display())))?;
        let dest = self.stage_dir(stage).join(name);

        if self.dry_run {
            info!(
                from = %src.display(),
                to = %dest.display(),
                "[dry run] would copy file"
            );
            return Ok(dest);
        }

        fs::copy(src, &dest).map_err(|err| {
            AppError::Store(format!(
                "cannot copy {} to {}: {err}",
                src.display(),
                dest.display()
            ))
        })?;
        Ok(dest)
    }

    /// Move an arbitrary file (not necessarily a task document) into a
    /// stage folder, keeping its name. Absent source is treated as already
    /// moved.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the rename fails.
    pub fn relocate(&self, src: &Path, to: Stage) -> Result<PathBuf> {
        let name = src
            .file_name()
            .ok_or_else(|| AppError::Store(format!("no file name in {}", src.display())))?;
        let dest = self.stage_dir(to).join(name);

        if !src.exists() {
            debug!(file = %src.display(), "relocate source already gone");
            return Ok(dest);
        }
        if self.dry_run {
            info!(
                from = %src.display(),
                to = %dest.display(),
                "[dry run] would move file"
            );
            return Ok(dest);
        }
        fs::rename(src, &dest).map_err(|err| {
            AppError::Store(format!(
                "cannot move {} to {}: {err}",
                src.display(),
                dest.display()
            ))
        })?;
        Ok(dest)
    }

    /// Write a file at the vault root (e.g. the dashboard); dry-run aware.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the write fails.
    pub fn write_root_file(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(file_name);
        self.write_raw(&path, content)?;
        Ok(path)
    }

    /// Find files in a stage folder whose name matches `name` exactly.
    ///
    /// Used to locate the originally dropped file that accompanies a task
    /// document. Glob metacharacters in the name are escaped.
    #[must_use]
    pub fn find_named(&self, stage: Stage, name: &str) -> Vec<PathBuf> {
        let pattern = self
            .stage_dir(stage)
            .join(glob::Pattern::escape(name))
            .to_string_lossy()
            .into_owned();
        glob::glob(&pattern).map_or_else(
            |_| Vec::new(),
            |paths| paths.filter_map(std::result::Result::ok).collect(),
        )
    }

    /// Write a structured record (e.g. an extraction result) into `logs/`.
    ///
    /// Unlike the activity trail, these records are task output and are
    /// suppressed in dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the record cannot be written.
    pub fn create_log_record(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        let path = self.logs_dir().join(file_name);
        self.write_raw(&path, content)?;
        Ok(path)
    }

    /// Count `.md` documents in a stage folder (dashboard summary input).
    #[must_use]
    pub fn count(&self, stage: Stage) -> usize {
        self.list(stage).map_or(0, |handles| handles.len())
    }

    fn write_raw(&self, path: &Path, content: &str) -> Result<()> {
        if self.dry_run {
            info!(file = %path.display(), "[dry run] would write document");
            return Ok(());
        }
        fs::write(path, content)
            .map_err(|err| AppError::Store(format!("cannot write {}: {err}", path.display())))
    }
}
