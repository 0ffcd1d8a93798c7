//! Intent classification result model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::Priority;

/// Classified purpose of a task's content.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// A request to draft an outbound email reply.
    EmailDraft,
    /// An invoice or other request to move money.
    PaymentRequest,
    /// A request to extract or summarize structured data.
    DataExtraction,
    /// Nothing matched; handled by the generic planner.
    #[default]
    Unknown,
}

impl Intent {
    /// Lowercase label used in artifact front-matter and activity logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EmailDraft => "email_draft",
            Self::PaymentRequest => "payment_request",
            Self::DataExtraction => "data_extraction",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of rule-based classification over task content.
///
/// Confidence is a fixed, intent-specific constant, not a calibrated
/// probability: the classifier's real output is the rule label, and the
/// confidence exists only for downstream display and thresholding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntentResult {
    /// Winning rule's intent label.
    pub intent: Intent,
    /// Fixed per-rule confidence in `[0, 1]`.
    pub confidence: f64,
    /// Priority after classification (may be raised from the default).
    pub priority: Priority,
    /// Business category of the winning rule.
    pub category: String,
    /// Entities extracted by the winning rule, keyed by entity name.
    pub entities: BTreeMap<String, serde_json::Value>,
    /// Whether the resulting artifact must pass a human approval gate.
    pub requires_approval: bool,
    /// Reason the approval gate was raised, when it was.
    pub approval_reason: Option<String>,
}

impl Default for IntentResult {
    fn default() -> Self {
        Self {
            intent: Intent::Unknown,
            confidence: 0.0,
            priority: Priority::Medium,
            category: "other".to_owned(),
            entities: BTreeMap::new(),
            requires_approval: false,
            approval_reason: None,
        }
    }
}

impl IntentResult {
    /// Extracted entity as a string, if present and string-valued.
    #[must_use]
    pub fn entity_str(&self, name: &str) -> Option<&str> {
        self.entities.get(name).and_then(|v| v.as_str())
    }

    /// Extracted entity as a number, if present and numeric.
    #[must_use]
    pub fn entity_f64(&self, name: &str) -> Option<f64> {
        self.entities.get(name).and_then(serde_json::Value::as_f64)
    }
}
