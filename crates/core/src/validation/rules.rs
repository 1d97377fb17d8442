//! Required-field tables and validation result types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Required top-level record fields. `description` is handled separately
/// because of its legacy fallback.
pub const REQUIRED_ROOT_FIELDS: &[&str] =
    &["uid", "name", "startDate", "endDate", "companyId", "anzsrc"];

/// Required owner fields, checked only when an owner is present.
pub const REQUIRED_OWNER_FIELDS: &[&str] = &[
    "firstName",
    "lastName",
    "role",
    "phone",
    "phoneCountryCode",
    "phoneType",
    "email",
];

/// Required fields of the (first) core activity.
pub const REQUIRED_CORE_ACTIVITY_FIELDS: &[&str] = &[
    "name",
    "description",
    "startDate",
    "endDate",
    "uncertainties",
    "approach",
    "intentions",
];

/// Required fields of every supporting activity.
pub const REQUIRED_SUPPORTING_ACTIVITY_FIELDS: &[&str] =
    &["name", "description", "startDate", "endDate", "definiition"];

pub const OWNER_KEY: &str = "projectOwner";
pub const CORE_ACTIVITIES_KEY: &str = "coreActivities";
pub const SUPPORTING_ACTIVITIES_KEY: &str = "supportingActivities";
pub const DESCRIPTION_KEY: &str = "description";
pub const LEGACY_DESCRIPTION_KEY: &str = "legacyDescription";

/// Whether an issue blocks rendering or is informational.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ValidationSeverity {
    Error,
    Warning,
}

/// A single field-level problem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dot/bracket-qualified path, e.g. `coreActivities[0].name`.
    pub field: String,
    pub message: String,
    pub severity: ValidationSeverity,
}

impl ValidationIssue {
    pub fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Error,
        }
    }

    pub fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            severity: ValidationSeverity::Warning,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == ValidationSeverity::Error
    }
}

/// Outcome of validating one record.
#[derive(Debug, Clone, Serialize)]
pub struct RecordValidation {
    /// Best-effort normalized record, produced even when invalid.
    pub record: Value,
    pub issues: Vec<ValidationIssue>,
}

impl RecordValidation {
    /// `true` when no issue has `error` severity.
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(ValidationIssue::is_blocking)
    }

    /// Blocking issues only.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.is_blocking())
    }

    /// Single-line summary of the blocking issues, e.g.
    /// `"name is required; coreActivities[0].approach is required"`.
    pub fn error_summary(&self) -> String {
        self.errors()
            .map(|i| i.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// `true` when a value counts as missing: absent, null or the empty string.
pub fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        _ => false,
    }
}
