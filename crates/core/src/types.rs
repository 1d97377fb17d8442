//! Typed view of a project record.
//!
//! Records arrive as loosely-typed JSON. The validator works on the raw
//! [`serde_json::Value`]; once a record passes, it is converted into a
//! [`ProjectRecord`] for shaping. Text fields accept numbers and booleans
//! (stringified) so a record that passed presence checks never fails on a
//! scalar type mismatch.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::CoreError;

/// One project application record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    #[serde(default, deserialize_with = "text")]
    pub uid: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub legacy_description: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "timestamp")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub company_id: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub anzsrc: Option<String>,
    #[serde(default)]
    pub project_owner: Option<Owner>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub core_activities: Vec<CoreActivity>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub supporting_activities: Vec<SupportingActivity>,

    // Presentation hints.
    #[serde(default, deserialize_with = "text")]
    pub alt_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub alt_description: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub estimated_spend: Option<String>,
    #[serde(default)]
    pub funding_yes: Option<Value>,
    #[serde(default)]
    pub funding_no: Option<Value>,
    #[serde(default, alias = "SupportingYes")]
    pub supporting_yes: Option<Value>,
    #[serde(default, alias = "SupportingNo")]
    pub supporting_no: Option<Value>,
}

impl ProjectRecord {
    /// Convert a (normalized) JSON record into its typed form.
    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        serde_json::from_value(value)
            .map_err(|e| CoreError::Validation(format!("Record has an unexpected shape: {e}")))
    }

    /// The single core activity that gets rendered. Extra entries are ignored.
    pub fn core_activity(&self) -> Option<&CoreActivity> {
        self.core_activities.first()
    }
}

/// Creation time as stored by the upstream document store.
///
/// Parsed leniently from `{seconds, nanoseconds}` (or the `_seconds` /
/// `_nanoseconds` aliases). Parts may be numbers or numeric strings; a
/// record whose seconds cannot be read has no timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub seconds: i64,
    pub nanoseconds: i64,
}

/// Project owner contact details.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default, deserialize_with = "text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub phone_country_code: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub phone_type: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub email: Option<String>,
}

/// The mandatory core R&D activity.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreActivity {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub uncertainties: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub approach: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub intentions: Option<String>,
}

/// An optional, repeatable supporting activity.
///
/// `definiition` is a contractual field name shared with the template and
/// upstream producers. Keep the spelling.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingActivity {
    #[serde(default, deserialize_with = "text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "text")]
    pub definiition: Option<String>,
}

// ---------------------------------------------------------------------------
// Lenient deserializers
// ---------------------------------------------------------------------------

pub(crate) fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected text, found {}",
            value_kind(&other)
        ))),
    }
}

fn timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(Value::Object(parts)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let part = |key: &str, alias: &str| {
        parts
            .get(key)
            .or_else(|| parts.get(alias))
            .and_then(integer)
    };

    Ok(part("seconds", "_seconds").map(|seconds| Timestamp {
        seconds,
        nanoseconds: part("nanoseconds", "_nanoseconds").unwrap_or(0),
    }))
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Short JSON type name used in error messages.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
