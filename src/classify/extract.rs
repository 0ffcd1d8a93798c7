//! Entity extraction over free text: single-entity helpers used by the
//! classifier rules, and bulk field extraction for the data-extraction skill.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{AppError, Result};

/// Plausible-amount bounds applied only in bulk extraction mode. A single
/// payment-rule amount claim is unconstrained; bulk extraction must filter
/// noise such as years and identifiers.
const BULK_AMOUNT_MIN: f64 = 0.0;
const BULK_AMOUNT_MAX: f64 = 100_000.0;

/// Compiled entity patterns shared by the classifier and the extractor skill.
pub struct Extractors {
    email: Regex,
    subject: Regex,
    amount_currency: Regex,
    amount_bare: Regex,
    amount_grouped: Regex,
    invoice: Regex,
    vendor_name: Regex,
    vendor_line: Regex,
    date: Regex,
    phone: Regex,
}

impl Extractors {
    /// Compile all entity patterns.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if any pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            email: compile(r"[\w.\-]+@[\w.\-]+")?,
            subject: compile(r"(?i)subject:[ \t]*([^\r\n]+)")?,
            amount_currency: compile(r"\$(\d+(?:\.\d{2})?)")?,
            amount_bare: compile(r"\b(\d+(?:\.\d{2})?)\b")?,
            amount_grouped: compile(r"\$?(\d{1,3}(?:,\d{3})*(?:\.\d{2})?)")?,
            invoice: compile(r"(?i)invoice\s*#?\s*([A-Za-z0-9][A-Za-z0-9\-]*)")?,
            vendor_name: compile(
                r"(?:[Ff]rom|[Vv]endor)\s*:?\s+([A-Z][\w&.'\-]*(?:\s+[A-Z][\w&.'\-]*)*)",
            )?,
            vendor_line: compile(r"(?i)(?:from|vendor)\s*:?\s*([^\r\n]+)")?,
            date: compile(r"\d{4}-\d{2}-\d{2}|\d{2}/\d{2}/\d{4}")?,
            phone: compile(r"\(?\d{3}\)?[\s\-]?\d{3}[\s\-]?\d{4}")?,
        })
    }

    /// First email address in the content.
    #[must_use]
    pub fn first_email(&self, content: &str) -> Option<String> {
        self.email.find(content).map(|m| m.as_str().to_owned())
    }

    /// Subject line following a `Subject:` marker.
    #[must_use]
    pub fn subject(&self, content: &str) -> Option<String> {
        self.subject
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_owned())
    }

    /// First numeric amount, preferring currency-prefixed values so that
    /// identifiers like `INV-2024` do not shadow the real amount.
    #[must_use]
    pub fn first_amount(&self, content: &str) -> Option<f64> {
        let captures = self
            .amount_currency
            .captures(content)
            .or_else(|| self.amount_bare.captures(content))?;
        captures.get(1).and_then(|m| m.as_str().parse().ok())
    }

    /// Invoice identifier following an `invoice` marker.
    #[must_use]
    pub fn invoice_number(&self, content: &str) -> Option<String> {
        self.invoice
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_owned())
    }

    /// Vendor or sender name following `from:` or `vendor:`.
    ///
    /// Prefers a run of capitalized words (stops before prose like
    /// "for $750.00"); falls back to the remainder of the line.
    #[must_use]
    pub fn vendor(&self, content: &str) -> Option<String> {
        let named = self
            .vendor_name
            .captures(content)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_owned());
        named.or_else(|| {
            self.vendor_line
                .captures(content)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_owned())
        })
    }

    /// All amounts with comma grouping allowed, filtered to the plausible
    /// range `(0, 100000)`.
    #[must_use]
    pub fn bulk_amounts(&self, content: &str) -> Vec<f64> {
        self.amount_grouped
            .captures_iter(content)
            .filter_map(|c| c.get(1))
            .filter_map(|m| m.as_str().replace(',', "").parse::<f64>().ok())
            .filter(|a| *a > BULK_AMOUNT_MIN && *a < BULK_AMOUNT_MAX)
            .collect()
    }

    /// All ISO (`YYYY-MM-DD`) and US (`MM/DD/YYYY`) dates.
    #[must_use]
    pub fn dates(&self, content: &str) -> Vec<String> {
        self.date
            .find_iter(content)
            .map(|m| m.as_str().to_owned())
            .collect()
    }

    /// First US-style phone number.
    #[must_use]
    pub fn phone(&self, content: &str) -> Option<String> {
        self.phone.find(content).map(|m| m.as_str().to_owned())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|err| AppError::Config(format!("bad entity pattern: {err}")))
}

/// Structured result of bulk field extraction, persisted as a JSON record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    /// Always `success`; extraction over arbitrary text cannot fail.
    pub status: String,
    /// Extraction schema label; only `auto` is implemented.
    pub schema: String,
    /// Extracted fields keyed by field name.
    pub data: BTreeMap<String, serde_json::Value>,
    /// Fixed per-field confidence, for downstream display only.
    pub confidence: BTreeMap<String, f64>,
    /// Extraction timestamp.
    pub timestamp: DateTime<Utc>,
}

/// Run bulk field extraction over content: emails, plausible amounts,
/// dates, invoice id, and phone number.
#[must_use]
pub fn extract_fields(ex: &Extractors, content: &str) -> ExtractionRecord {
    let mut data = BTreeMap::new();
    let mut confidence = BTreeMap::new();

    if let Some(email) = ex.first_email(content) {
        data.insert("email".to_owned(), json!(email));
        confidence.insert("email".to_owned(), 0.95);
    }

    let amounts = ex.bulk_amounts(content);
    if !amounts.is_empty() {
        data.insert("amounts".to_owned(), json!(amounts));
        confidence.insert("amounts".to_owned(), 0.85);
    }

    let dates = ex.dates(content);
    if !dates.is_empty() {
        data.insert("dates".to_owned(), json!(dates));
        confidence.insert("dates".to_owned(), 0.90);
    }

    if let Some(invoice) = ex.invoice_number(content) {
        data.insert("invoice_number".to_owned(), json!(invoice));
        confidence.insert("invoice_number".to_owned(), 0.90);
    }

    if let Some(phone) = ex.phone(content) {
        data.insert("phone".to_owned(), json!(phone));
        confidence.insert("phone".to_owned(), 0.90);
    }

    ExtractionRecord {
        status: "success".to_owned(),
        schema: "auto".to_owned(),
        data,
        confidence,
        timestamp: Utc::now(),
    }
}
