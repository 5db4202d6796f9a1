//! Feature views: each owns its slice of remote data, its form drafts, and
//! the pure aggregation over whatever is currently loaded.
//!
//! Shared behavior across views: reads replace list state and degrade to
//! empty on failure (logged, never propagated); form submission parses the
//! draft's text fields, inserts, and only clears the draft and re-reads on
//! success. A failed submit leaves the draft exactly as entered.

pub mod dashboard;
pub mod finance;
pub mod portfolio;
pub mod trading;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;

/// Insert failure: either the draft failed validation or the gateway
/// rejected the write. Callers keep the draft populated for correction.
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl SubmitError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        SubmitError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

fn required(field: &'static str, text: &str) -> Result<String, SubmitError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(SubmitError::invalid(field, "must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn parse_amount(field: &'static str, text: &str) -> Result<Decimal, SubmitError> {
    text.trim()
        .parse::<Decimal>()
        .map_err(|e| SubmitError::invalid(field, e.to_string()))
}

fn parse_date(field: &'static str, text: &str) -> Result<NaiveDate, SubmitError> {
    text.trim()
        .parse::<NaiveDate>()
        .map_err(|e| SubmitError::invalid(field, e.to_string()))
}

fn parse_uuid(field: &'static str, text: &str) -> Result<Uuid, SubmitError> {
    text.trim()
        .parse::<Uuid>()
        .map_err(|e| SubmitError::invalid(field, e.to_string()))
}

fn optional(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn today_iso() -> String {
    chrono::Utc::now().date_naive().to_string()
}
