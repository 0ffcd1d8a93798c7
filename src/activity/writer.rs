//! JSONL activity log writer with daily file rotation.

use std::{
    fs::{self, OpenOptions},
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};

use chrono::{NaiveDate, Utc};
use tracing::warn;

use super::{ActivityEntry, ActivityLogger};
use crate::{AppError, Result};

/// Internal state protected by a mutex.
struct WriterState {
    current_date: NaiveDate,
    writer: BufWriter<fs::File>,
}

/// A daily-rotating JSONL activity log writer.
///
/// Appends one JSON object per line to `<log_dir>/YYYY-MM-DD.jsonl` and
/// plain `{timestamp} - ERROR - {message}` lines to `<log_dir>/errors.log`.
/// Automatically opens a new activity file when the calendar date changes
/// between writes.
pub struct JsonlActivityWriter {
    log_dir: PathBuf,
    state: Mutex<Option<WriterState>>,
}

impl JsonlActivityWriter {
    /// Construct a writer that stores logs in `log_dir`.
    ///
    /// Creates `log_dir` and all parent directories if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if the directory cannot be created.
    pub fn new(log_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&log_dir).map_err(|err| {
            AppError::Io(format!(
                "failed to create log directory {}: {err}",
                log_dir.display()
            ))
        })?;
        Ok(Self {
            log_dir,
            state: Mutex::new(None),
        })
    }

    /// Path of the activity file for `date`.
    #[must_use]
    pub fn file_for_date(&self, date: NaiveDate) -> PathBuf {
        self.log_dir.join(format!("{date}.jsonl"))
    }

    /// Read the most recent `limit` entries from today's activity file.
    ///
    /// Missing or unreadable files yield an empty list; individual
    /// malformed lines are skipped.
    #[must_use]
    pub fn recent(&self, limit: usize) -> Vec<ActivityEntry> {
        let path = self.file_for_date(Utc::now().date_naive());
        let Ok(file) = fs::File::open(&path) else {
            return Vec::new();
        };

        let entries: Vec<ActivityEntry> = BufReader::new(file)
            .lines()
            .filter_map(std::result::Result::ok)
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();

        let skip = entries.len().saturating_sub(limit);
        entries.into_iter().skip(skip).collect()
    }

    fn open_for_date(log_dir: &Path, date: NaiveDate) -> Result<BufWriter<fs::File>> {
        let path = log_dir.join(format!("{date}.jsonl"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|err| {
                AppError::Io(format!("failed to open activity log {}: {err}", path.display()))
            })?;
        Ok(BufWriter::new(file))
    }
}

impl ActivityLogger for JsonlActivityWriter {
    fn log_entry(&self, entry: ActivityEntry) -> Result<()> {
        let today = Utc::now().date_naive();

        let mut guard = self
            .state
            .lock()
            .map_err(|_| AppError::Io("activity writer mutex poisoned".to_owned()))?;

        let needs_rotation = guard.as_ref().is_none_or(|s| s.current_date != today);

        if needs_rotation {
            let new_writer = Self::open_for_date(&self.log_dir, today)?;
            *guard = Some(WriterState {
                current_date: today,
                writer: new_writer,
            });
        }

        if let Some(state) = guard.as_mut() {
            let line = serde_json::to_string(&entry)?;
            if let Err(err) = writeln!(state.writer, "{line}") {
                warn!("failed to write activity log entry: {err}");
                return Err(AppError::Io(format!("activity write failed: {err}")));
            }
            if let Err(err) = state.writer.flush() {
                warn!("failed to flush activity log: {err}");
                return Err(AppError::Io(format!("activity flush failed: {err}")));
            }
        }

        Ok(())
    }

    fn log_error(&self, message: &str) {
        let path = self.log_dir.join("errors.log");
        let line = format!("{} - ERROR - {message}\n", Utc::now().to_rfc3339());
        let append = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(err) = append {
            warn!(%err, "failed to append to error log");
        }
    }
}
