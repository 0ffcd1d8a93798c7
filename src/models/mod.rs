//! Domain models: task lifecycle types and intent classification results.

pub mod intent;
pub mod task;

pub use intent::{Intent, IntentResult};
pub use task::{Priority, Stage, TaskMeta};
