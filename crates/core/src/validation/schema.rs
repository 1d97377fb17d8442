//! Declarative (derive-based) project schema.
//!
//! Covers the same required fields as [`super::record`] and adds format
//! rules: the owner email must look like an email address and the creation
//! timestamp parts must be numbers. Text fields accept numbers and booleans
//! the same way [`crate::types::ProjectRecord`] does, so `"uid": 42` passes
//! both validators. Failures come back as flat strings of the form
//! `<dot-path>: <message>`.

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use super::record::ROOT_PATH;
use super::rules::DESCRIPTION_KEY;
use crate::input::{normalize_input, PROJECTS_KEY};
use crate::types::text;

const REQUIRED: &str = "is required";

/// Canonical project record accepted by the strict path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSchema {
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub uid: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default, deserialize_with = "text")]
    pub legacy_description: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub start_date: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub created_at: Option<TimestampSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default, deserialize_with = "text")]
    pub status: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub company_id: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub anzsrc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub project_owner: Option<OwnerSchema>,
    /// Only the first element is kept; the rest are dropped while parsing.
    #[serde(default, deserialize_with = "first_only")]
    #[validate(
        length(min = 1, message = "at least one core activity is required"),
        nested
    )]
    pub core_activities: Vec<CoreActivitySchema>,
    #[serde(default, deserialize_with = "nullable_list")]
    #[validate(nested)]
    pub supporting_activities: Vec<SupportingActivitySchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default, deserialize_with = "text")]
    pub alt_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default, deserialize_with = "text")]
    pub alt_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default, deserialize_with = "text")]
    pub estimated_spend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_yes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_no: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "SupportingYes")]
    pub supporting_yes: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "SupportingNo")]
    pub supporting_no: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TimestampSchema {
    #[serde(alias = "_seconds", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "numeric"))]
    pub seconds: Option<Value>,
    #[serde(alias = "_nanoseconds", skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "numeric"))]
    pub nanoseconds: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSchema {
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub first_name: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub last_name: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub role: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub phone: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub phone_country_code: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub phone_type: Option<String>,
    #[validate(
        required(message = "is required"),
        length(min = 1, message = "is required"),
        email(message = "must be a valid email address")
    )]
    #[serde(default, deserialize_with = "text")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CoreActivitySchema {
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub start_date: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub end_date: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub uncertainties: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub approach: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub intentions: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupportingActivitySchema {
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub start_date: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub end_date: Option<String>,
    #[validate(required(message = "is required"), length(min = 1, message = "is required"))]
    #[serde(default, deserialize_with = "text")]
    pub definiition: Option<String>,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Validate one record against the schema.
///
/// On success the description fallback has been applied to the returned
/// record.
pub fn validate_project_schema(raw: &Value) -> Result<ProjectSchema, Vec<String>> {
    let mut project: ProjectSchema = serde_json::from_value(raw.clone())
        .map_err(|e| vec![format!("{ROOT_PATH}: {e}")])?;

    let mut errors = Vec::new();
    if let Err(validation) = project.validate() {
        flatten_errors(&validation, "", &mut errors);
    }

    // Cross-field rule: only an absent/null description falls back to the
    // legacy field.
    let description = project
        .description
        .clone()
        .or_else(|| project.legacy_description.clone());
    if description.as_deref().map_or(true, str::is_empty) {
        errors.push(format!("{DESCRIPTION_KEY}: {REQUIRED}"));
    }

    if errors.is_empty() {
        project.description = description;
        Ok(project)
    } else {
        Err(errors)
    }
}

/// Validate a batch (bare list or `{ "projects": [...] }` wrapper).
///
/// Each record's errors are prefixed with `projects[<index>].`.
pub fn validate_projects_schema(input: &Value) -> Result<Vec<ProjectSchema>, Vec<String>> {
    let records = normalize_input(input).map_err(|e| vec![e.to_string()])?;

    let mut projects = Vec::with_capacity(records.len());
    let mut errors = Vec::new();

    for (index, record) in records.iter().enumerate() {
        match validate_project_schema(record) {
            Ok(project) => projects.push(project),
            Err(record_errors) => errors.extend(
                record_errors
                    .into_iter()
                    .map(|e| prefix_record_error(index, &e)),
            ),
        }
    }

    if errors.is_empty() {
        Ok(projects)
    } else {
        Err(errors)
    }
}

fn prefix_record_error(index: usize, error: &str) -> String {
    match error.strip_prefix(ROOT_PATH) {
        Some(rest) if rest.starts_with(':') => format!("{PROJECTS_KEY}[{index}]{rest}"),
        _ => format!("{PROJECTS_KEY}[{index}].{error}"),
    }
}

// ---------------------------------------------------------------------------
// Error flattening
// ---------------------------------------------------------------------------

/// Flatten nested validator errors into `<path>: <message>` strings.
///
/// Only the first error per field is reported, so an emptied email yields
/// "is required" rather than also "must be a valid email address". Fields are
/// visited in sorted order to keep the output stable.
fn flatten_errors(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    let mut entries: Vec<_> = errors.errors().iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in entries {
        let name = camel_case(field);
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}.{name}")
        };
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                if let Some(first) = field_errors.first() {
                    out.push(format!("{path}: {}", error_message(first)));
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten_errors(inner, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten_errors(inner, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

fn error_message(error: &ValidationError) -> Cow<'static, str> {
    error
        .message
        .clone()
        .unwrap_or_else(|| error.code.clone())
}

/// `phone_country_code` -> `phoneCountryCode`. Already camel-cased names
/// pass through unchanged.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Custom rules and deserializers
// ---------------------------------------------------------------------------

fn numeric(value: &Value) -> Result<(), ValidationError> {
    if value.is_number() {
        Ok(())
    } else {
        Err(ValidationError::new("numeric").with_message(Cow::Borrowed("must be a number")))
    }
}

fn first_only<'de, D>(deserializer: D) -> Result<Vec<CoreActivitySchema>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut activities = nullable_list(deserializer)?;
    activities.truncate(1);
    Ok(activities)
}

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
