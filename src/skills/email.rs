//! Email draft artifact generation.
//!
//! Drafts land in `pending-approval` and are always approval-gated: the
//! system never sends mail, it prepares a reviewed draft for a human.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::Utc;

use crate::classify::APPROVAL_THRESHOLD;
use crate::models::{IntentResult, Stage};
use crate::store::TaskStore;
use crate::Result;

/// How much of the original content is quoted into the draft body.
const EXCERPT_LEN: usize = 500;

/// Write a reply draft for an `email_draft` task.
///
/// # Errors
///
/// Returns a store error if the artifact cannot be written.
pub fn write_reply_draft(
    store: &TaskStore,
    content: &str,
    result: &IntentResult,
) -> Result<PathBuf> {
    let to = result.entity_str("sender").unwrap_or("unknown@example.com");
    let original_subject = result.entity_str("subject").unwrap_or("No Subject");
    let subject = format!("Re: {original_subject}");

    let mut body = String::new();
    let _ = writeln!(body, "Dear {},", salutation(to));
    let _ = writeln!(body);
    let _ = writeln!(body, "Thank you for your email regarding {original_subject}.");
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "We have received your message and are reviewing the details. \
         A full response will follow shortly."
    );
    let _ = writeln!(body);
    let _ = writeln!(body, "Sincerely,");
    let _ = writeln!(body);
    let _ = writeln!(body, "Customer Service Team");

    write_draft(store, to, &subject, content, result, &body)
}

/// Write an invoice acknowledgment draft for a `payment_request` task.
///
/// # Errors
///
/// Returns a store error if the artifact cannot be written.
pub fn write_acknowledgment_draft(
    store: &TaskStore,
    content: &str,
    result: &IntentResult,
) -> Result<PathBuf> {
    let to = result
        .entity_str("sender")
        .unwrap_or("vendor@example.com");
    let invoice = result.entity_str("invoice_number").unwrap_or("UNKNOWN");
    let amount = result.entity_f64("amount").unwrap_or(0.0);
    let subject = format!("Re: Invoice {invoice} - Acknowledgment");

    let mut body = String::new();
    let _ = writeln!(body, "Dear {},", salutation(to));
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "We acknowledge receipt of invoice {invoice} for ${amount:.2}."
    );
    let _ = writeln!(body);
    if amount > APPROVAL_THRESHOLD {
        let _ = writeln!(
            body,
            "As this invoice exceeds ${APPROVAL_THRESHOLD:.0}, it requires managerial \
             approval before payment can be processed."
        );
    } else {
        let _ = writeln!(body, "This invoice is within our standard processing limits.");
    }
    let _ = writeln!(body);
    let _ = writeln!(
        body,
        "You can expect payment processing within 3-5 business days."
    );
    let _ = writeln!(body);
    let _ = writeln!(body, "Sincerely,");
    let _ = writeln!(body);
    let _ = writeln!(body, "Finance Department");

    write_draft(store, to, &subject, content, result, &body)
}

fn write_draft(
    store: &TaskStore,
    to: &str,
    subject: &str,
    original: &str,
    result: &IntentResult,
    response: &str,
) -> Result<PathBuf> {
    let created = Utc::now();
    let mut doc = String::new();

    let _ = writeln!(doc, "---");
    let _ = writeln!(doc, "type: email_draft");
    let _ = writeln!(doc, "created: {}", created.to_rfc3339());
    let _ = writeln!(doc, "priority: {}", result.priority.as_str());
    let _ = writeln!(doc, "status: pending_approval");
    let _ = writeln!(doc, "to: {to}");
    let _ = writeln!(doc, "subject: {subject}");
    let _ = writeln!(doc, "requires_approval: true");
    let _ = writeln!(doc, "---");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "# Email Draft: {subject}");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "**To:** {to}");
    let _ = writeln!(doc, "**Subject:** {subject}");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "## Original");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "{}", excerpt(original));
    let _ = writeln!(doc);
    let _ = writeln!(doc, "## Draft Response");
    let _ = writeln!(doc);
    let _ = writeln!(doc, "{response}");

    let file_name = format!("email_draft_{}.md", super::artifact_timestamp());
    store.create_named(Stage::PendingApproval, &file_name, &doc)
}

/// Greeting derived from the local part of the recipient address.
fn salutation(address: &str) -> String {
    let local = address.split('@').next().unwrap_or(address);
    let mut chars = local.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => local.to_owned(),
    }
}

/// First `EXCERPT_LEN` characters of the original content, on a char
/// boundary.
fn excerpt(content: &str) -> &str {
    if content.len() <= EXCERPT_LEN {
        return content;
    }
    let mut end = EXCERPT_LEN;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    &content[..end]
}
