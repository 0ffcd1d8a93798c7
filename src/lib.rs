#![forbid(unsafe_code)]

//! `dropclerk` — folder-driven clerical task automation.
//!
//! Watches a drop folder for arriving files, records each as a task,
//! classifies task intent with an ordered rule table, and routes tasks to
//! artifact-producing skills, advancing every unit of work through a
//! folder-encoded lifecycle until archival. All state lives in the vault
//! directory hierarchy; there is no database and no network protocol.

pub mod activity;
pub mod classify;
pub mod config;
pub mod errors;
pub mod models;
pub mod orchestrator;
pub mod skills;
pub mod store;
pub mod watcher;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
