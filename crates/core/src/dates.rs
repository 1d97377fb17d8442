//! Date presentation for rendered documents.
//!
//! Record dates are opaque text. The shaper passes every date through an
//! injected formatter; [`DateFormat`] provides the two built-in choices.

use chrono::{DateTime, NaiveDate};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Built-in date formatters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateFormat {
    /// Pass dates through unchanged.
    #[default]
    Iso,
    /// `YYYY-MM-DD` becomes `DD/MM/YYYY`; anything else passes through.
    Au,
}

impl DateFormat {
    /// Parse a configuration value (`iso` or `au`, case-insensitive).
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name.trim().to_lowercase().as_str() {
            "iso" => Ok(Self::Iso),
            "au" => Ok(Self::Au),
            other => Err(CoreError::Validation(format!(
                "Unknown date format '{other}'. Must be one of: iso, au"
            ))),
        }
    }

    pub fn format(self, date: &str) -> String {
        match self {
            Self::Iso => date.to_string(),
            Self::Au => au_date(date),
        }
    }
}

/// Reformat an ISO calendar date as `DD/MM/YYYY`.
///
/// A trailing time part (`2024-01-31T10:00:00Z`) is ignored. Text that does
/// not start with a valid ISO date is returned unchanged.
pub fn au_date(date: &str) -> String {
    let trimmed = date.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    match NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%d/%m/%Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Render a creation timestamp as an ISO calendar date (UTC).
pub fn timestamp_date(ts: &Timestamp) -> Option<String> {
    let nanos = u32::try_from(ts.nanoseconds).ok()?;
    DateTime::from_timestamp(ts.seconds, nanos).map(|dt| dt.format("%Y-%m-%d").to_string())
}
