//! Batch input normalization.
//!
//! Callers may send either a bare JSON array of records or a wrapper object
//! `{ "projects": [...] }`. Both normalize to the same slice of records.

use serde_json::Value;

use crate::error::CoreError;
use crate::types::value_kind;

/// Key of the wrapper object's record list.
pub const PROJECTS_KEY: &str = "projects";

/// Return the list of records held by `input`.
///
/// Borrows from the input; nothing is cloned or mutated.
pub fn normalize_input(input: &Value) -> Result<&[Value], CoreError> {
    match input {
        Value::Array(records) => Ok(records.as_slice()),
        Value::Object(map) => match map.get(PROJECTS_KEY) {
            Some(Value::Array(records)) => Ok(records.as_slice()),
            Some(other) => Err(CoreError::InvalidInputShape(format!(
                "'{PROJECTS_KEY}' must be an array, found {}",
                value_kind(other)
            ))),
            None => Err(CoreError::InvalidInputShape(format!(
                "Expected an array of projects or an object with a '{PROJECTS_KEY}' array"
            ))),
        },
        other => Err(CoreError::InvalidInputShape(format!(
            "Expected an array of projects or an object with a '{PROJECTS_KEY}' array, found {}",
            value_kind(other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn bare_array_is_returned_as_is() {
        let input = json!([{ "uid": "a" }, { "uid": "b" }]);
        let records = normalize_input(&input).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["uid"], "b");
    }

    #[test]
    fn wrapper_object_is_unwrapped() {
        let input = json!({ "projects": [{ "uid": "a" }] });
        let records = normalize_input(&input).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn empty_array_is_valid() {
        let input = json!([]);
        assert!(normalize_input(&input).unwrap().is_empty());
    }

    #[test]
    fn null_is_rejected() {
        assert_matches!(
            normalize_input(&Value::Null),
            Err(CoreError::InvalidInputShape(_))
        );
    }

    #[test]
    fn string_is_rejected() {
        assert_matches!(
            normalize_input(&json!("projects")),
            Err(CoreError::InvalidInputShape(_))
        );
    }

    #[test]
    fn object_without_projects_is_rejected() {
        assert_matches!(
            normalize_input(&json!({ "items": [] })),
            Err(CoreError::InvalidInputShape(_))
        );
    }

    #[test]
    fn non_array_projects_is_rejected() {
        let err = normalize_input(&json!({ "projects": { "uid": "a" } })).unwrap_err();
        assert!(err.to_string().contains("found object"));
    }
}
