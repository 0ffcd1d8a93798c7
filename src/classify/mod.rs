//! Rule-based intent classification.
//!
//! [`RuleSet::classify`] evaluates a fixed, ordered rule table over task
//! text and the first matching rule wins. The order encodes a business
//! priority: communication obligations and money movement are checked
//! before generic extraction, so a payment request can never be
//! misclassified as a mere extraction and slip past the approval gate.

pub mod extract;

use regex::Regex;
use serde_json::json;

use crate::models::{Intent, IntentResult, Priority};
use crate::{AppError, Result};

pub use extract::{extract_fields, ExtractionRecord, Extractors};

/// Payment amount above which approval is required and priority is raised.
pub const APPROVAL_THRESHOLD: f64 = 500.0;

/// One entry of the ordered classification table.
struct Rule {
    matcher: Regex,
    build: fn(&Extractors, &str) -> IntentResult,
}

/// The ordered classification rule table with its compiled extractors.
pub struct RuleSet {
    rules: Vec<Rule>,
    extractors: Extractors,
}

impl RuleSet {
    /// Compile the rule table.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any pattern fails to compile. The
    /// patterns are fixed, so this only fires on a programming error.
    pub fn new() -> Result<Self> {
        let rules = vec![
            Rule {
                matcher: compile(r"(?i)\b(reply|respond|draft.*?email|email.*?response)\b")?,
                build: build_email_draft,
            },
            Rule {
                matcher: compile(r"(?i)\b(invoice|payment|pay|transfer|amount due)\b")?,
                build: build_payment_request,
            },
            Rule {
                matcher: compile(r"(?i)\b(extract|parse|analyze|summarize)\b")?,
                build: build_data_extraction,
            },
        ];
        Ok(Self {
            rules,
            extractors: Extractors::new()?,
        })
    }

    /// Classify task content deterministically.
    ///
    /// Tries each rule in table order and returns the first match's result.
    /// Content matching no rule yields the `unknown` default, which always
    /// succeeds — ambiguity is not an error.
    #[must_use]
    pub fn classify(&self, content: &str) -> IntentResult {
        for rule in &self.rules {
            if rule.matcher.is_match(content) {
                return (rule.build)(&self.extractors, content);
            }
        }
        IntentResult::default()
    }

    /// Shared entity extractors, also used for bulk field extraction.
    #[must_use]
    pub fn extractors(&self) -> &Extractors {
        &self.extractors
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| AppError::Config(format!("bad rule pattern: {err}")))
}

fn build_email_draft(ex: &Extractors, content: &str) -> IntentResult {
    let mut result = IntentResult {
        intent: Intent::EmailDraft,
        confidence: 0.8,
        category: "communication".to_owned(),
        requires_approval: true,
        approval_reason: Some("outbound email replies require review before sending".to_owned()),
        ..IntentResult::default()
    };

    if let Some(sender) = ex.first_email(content) {
        result.entities.insert("sender".to_owned(), json!(sender));
    }
    if let Some(subject) = ex.subject(content) {
        result.entities.insert("subject".to_owned(), json!(subject));
    }
    result
}

fn build_payment_request(ex: &Extractors, content: &str) -> IntentResult {
    let mut result = IntentResult {
        intent: Intent::PaymentRequest,
        confidence: 0.9,
        category: "finance".to_owned(),
        ..IntentResult::default()
    };

    // Unconstrained range here, unlike bulk extraction: a single
    // highly-confident amount claim is trusted for the threshold check.
    if let Some(amount) = ex.first_amount(content) {
        result.entities.insert("amount".to_owned(), json!(amount));
        if amount > APPROVAL_THRESHOLD {
            result.requires_approval = true;
            result.approval_reason = Some(format!(
                "payment of ${amount:.2} exceeds ${APPROVAL_THRESHOLD:.0} threshold"
            ));
            result.priority = Priority::High;
        }
    }
    if let Some(invoice) = ex.invoice_number(content) {
        result
            .entities
            .insert("invoice_number".to_owned(), json!(invoice));
    }
    if let Some(vendor) = ex.vendor(content) {
        result.entities.insert("vendor".to_owned(), json!(vendor));
    }
    result
}

fn build_data_extraction(_ex: &Extractors, _content: &str) -> IntentResult {
    IntentResult {
        intent: Intent::DataExtraction,
        confidence: 0.7,
        category: "admin".to_owned(),
        ..IntentResult::default()
    }
}
