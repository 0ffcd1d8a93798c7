//! Global configuration parsing, validation, and defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Arrival detector tuning knobs.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct WatcherConfig {
    /// Interval for the fallback full-directory poll. Event-driven watches
    /// are unreliable on some virtualized and networked file systems, so the
    /// poll runs regardless of whether notify delivers events.
    #[serde(default = "default_poll_interval_seconds")]
    pub poll_interval_seconds: u64,
    /// Wait after a qualifying event before trusting file metadata, to avoid
    /// reading a file mid-write.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
    /// Minimum spacing between accepted repeat "modified" triggers per path.
    #[serde(default = "default_debounce_seconds")]
    pub debounce_seconds: u64,
    /// File extensions (lowercase, no dot) accepted from the drop folder.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
}

fn default_poll_interval_seconds() -> u64 {
    5
}

fn default_settle_delay_ms() -> u64 {
    500
}

fn default_debounce_seconds() -> u64 {
    2
}

fn default_allowed_extensions() -> Vec<String> {
    ["txt", "md", "pdf", "doc", "docx"]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_seconds: default_poll_interval_seconds(),
            settle_delay_ms: default_settle_delay_ms(),
            debounce_seconds: default_debounce_seconds(),
            allowed_extensions: default_allowed_extensions(),
        }
    }
}

impl WatcherConfig {
    /// Settle delay as a [`Duration`].
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Debounce window as a [`Duration`].
    #[must_use]
    pub fn debounce_window(&self) -> Duration {
        Duration::from_secs(self.debounce_seconds)
    }

    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_seconds)
    }

    /// Whether a path's extension is on the allow-list (case-insensitive).
    #[must_use]
    pub fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.allowed_extensions.iter().any(|a| *a == ext))
    }
}

/// Orchestrator scan loop settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct OrchestratorConfig {
    /// Idle interval between scans.
    #[serde(default = "default_check_interval_seconds")]
    pub check_interval_seconds: u64,
    /// Number of scan iterations before exiting; 0 runs unbounded.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_check_interval_seconds() -> u64 {
    60
}

fn default_max_iterations() -> u32 {
    5
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval_seconds(),
            max_iterations: default_max_iterations(),
        }
    }
}

impl OrchestratorConfig {
    /// Scan interval as a [`Duration`].
    #[must_use]
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_seconds)
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Vault root containing the lifecycle folders.
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Suppress all task-state mutations, logging intended actions instead.
    #[serde(default = "default_true")]
    pub dry_run: bool,
    /// Arrival detector settings.
    #[serde(default)]
    pub watcher: WatcherConfig,
    /// Orchestrator scan loop settings.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            dry_run: true,
            watcher: WatcherConfig::default(),
            orchestrator: OrchestratorConfig::default(),
        }
    }
}

impl GlobalConfig {
    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to built-in
    /// defaults on any failure.
    ///
    /// A missing or malformed config file is never fatal: the failure is
    /// logged as a warning and the defaults are used, so a typo in the
    /// config cannot prevent startup.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(raw) => match Self::from_toml_str(&raw) {
                Ok(config) => config,
                Err(err) => {
                    warn!(%err, path = %path.display(), "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(err) => {
                warn!(%err, path = %path.display(), "config not readable, using defaults");
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.watcher.poll_interval_seconds == 0 {
            return Err(AppError::Config(
                "watcher.poll_interval_seconds must be greater than zero".into(),
            ));
        }
        if self.orchestrator.check_interval_seconds == 0 {
            return Err(AppError::Config(
                "orchestrator.check_interval_seconds must be greater than zero".into(),
            ));
        }
        if self.watcher.allowed_extensions.is_empty() {
            return Err(AppError::Config(
                "watcher.allowed_extensions must not be empty".into(),
            ));
        }
        Ok(())
    }
}
