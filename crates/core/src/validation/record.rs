//! Rule-based record validator: pure logic, no I/O.
//!
//! Validation problems are reported as [`ValidationIssue`]s, never returned
//! as `Err`. The normalized record is always produced so callers can inspect
//! partially valid data.

use serde_json::{Map, Value};

use super::rules::{
    is_blank, RecordValidation, ValidationIssue, CORE_ACTIVITIES_KEY, DESCRIPTION_KEY,
    LEGACY_DESCRIPTION_KEY, OWNER_KEY, REQUIRED_CORE_ACTIVITY_FIELDS, REQUIRED_OWNER_FIELDS,
    REQUIRED_ROOT_FIELDS, REQUIRED_SUPPORTING_ACTIVITY_FIELDS, SUPPORTING_ACTIVITIES_KEY,
};

/// Path used for issues about the record itself.
pub const ROOT_PATH: &str = "$";

/// Validate one raw project record.
pub fn validate_record(raw: &Value) -> RecordValidation {
    let Some(obj) = raw.as_object() else {
        return RecordValidation {
            record: Value::Object(Map::new()),
            issues: vec![ValidationIssue::error(
                ROOT_PATH,
                "Project record must be a JSON object",
            )],
        };
    };

    let mut issues = Vec::new();

    check_required(obj, REQUIRED_ROOT_FIELDS, "", &mut issues);

    match obj.get(OWNER_KEY) {
        None | Some(Value::Null) => {}
        Some(owner) => check_nested(owner, REQUIRED_OWNER_FIELDS, OWNER_KEY, &mut issues),
    }

    match obj.get(CORE_ACTIVITIES_KEY) {
        Some(Value::Array(activities)) if !activities.is_empty() => {
            let path = format!("{CORE_ACTIVITIES_KEY}[0]");
            check_nested(&activities[0], REQUIRED_CORE_ACTIVITY_FIELDS, &path, &mut issues);
            if activities.len() > 1 {
                issues.push(ValidationIssue::warning(
                    CORE_ACTIVITIES_KEY,
                    format!(
                        "{} core activities supplied; only the first is rendered",
                        activities.len()
                    ),
                ));
            }
        }
        _ => issues.push(ValidationIssue::error(
            CORE_ACTIVITIES_KEY,
            "At least one core activity is required",
        )),
    }

    match obj.get(SUPPORTING_ACTIVITIES_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Array(activities)) => {
            for (index, activity) in activities.iter().enumerate() {
                let path = format!("{SUPPORTING_ACTIVITIES_KEY}[{index}]");
                check_nested(activity, REQUIRED_SUPPORTING_ACTIVITY_FIELDS, &path, &mut issues);
            }
        }
        Some(_) => issues.push(ValidationIssue::error(
            SUPPORTING_ACTIVITIES_KEY,
            "supportingActivities must be an array",
        )),
    }

    // The legacy field is only consulted when `description` is absent or
    // null. An explicit empty string stays empty and fails below.
    let legacy = obj.get(LEGACY_DESCRIPTION_KEY).cloned().unwrap_or(Value::Null);
    let description = match obj.get(DESCRIPTION_KEY) {
        None | Some(Value::Null) => legacy.clone(),
        Some(value) => value.clone(),
    };
    if is_blank(Some(&description)) {
        issues.push(ValidationIssue::error(
            DESCRIPTION_KEY,
            "description is required",
        ));
    }

    let mut record = obj.clone();
    record.insert(DESCRIPTION_KEY.to_string(), description);
    record.insert(LEGACY_DESCRIPTION_KEY.to_string(), legacy);

    RecordValidation {
        record: Value::Object(record),
        issues,
    }
}

fn check_required(
    obj: &Map<String, Value>,
    fields: &[&str],
    prefix: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    for field in fields {
        if is_blank(obj.get(*field)) {
            let path = format!("{prefix}{field}");
            issues.push(ValidationIssue::error(
                path.clone(),
                format!("{path} is required"),
            ));
        }
    }
}

fn check_nested(value: &Value, fields: &[&str], path: &str, issues: &mut Vec<ValidationIssue>) {
    match value.as_object() {
        Some(obj) => check_required(obj, fields, &format!("{path}."), issues),
        None => issues.push(ValidationIssue::error(
            path,
            format!("{path} must be an object"),
        )),
    }
}
