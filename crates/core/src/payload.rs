//! Payload shaping: maps a validated record onto the template's fixed keys.
//!
//! The template renders exactly one core activity, so its fields are
//! flattened onto top-level keys. Supporting activities become a numbered
//! list.

use serde::Serialize;

use crate::boolish::{resolve_yes_no, YesNo};
use crate::dates::timestamp_date;
use crate::sanitize::{sanitize_opt, sanitize_text};
use crate::types::{Owner, ProjectRecord, SupportingActivity};

/// Placeholder rendered when a record has no estimated spend.
pub const ESTIMATED_SPEND_PLACEHOLDER: &str = "Not provided";

/// Flat key-value payload consumed by the document renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPayload {
    pub uid: String,
    pub project_name: String,
    pub project_description: String,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
    pub status: String,
    pub company_id: String,
    pub anzsrc: String,

    pub owner_first_name: String,
    pub owner_last_name: String,
    pub owner_full_name: String,
    pub owner_role: String,
    pub owner_phone: String,
    pub owner_phone_type: String,
    pub owner_email: String,

    pub funding_yes: String,
    pub funding_no: String,
    pub supporting_yes: String,
    pub supporting_no: String,
    pub estimated_spend: String,

    pub core_activity_name: String,
    pub core_activity_description: String,
    pub core_activity_start_date: String,
    pub core_activity_end_date: String,
    pub core_activity_uncertainties: String,
    pub core_activity_approach: String,
    pub core_activity_intentions: String,

    pub has_supporting_activities: bool,
    pub supporting_activities: Vec<SupportingActivityPayload>,
}

/// One numbered supporting activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportingActivityPayload {
    /// 1-based position in the input list.
    pub sequence: usize,
    pub name: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub definiition: String,
}

/// Shape a validated record for rendering.
///
/// `format_date` is applied to every date; pass `&|d: &str| d.to_string()`
/// (or [`crate::dates::DateFormat::Iso`]) to keep dates as entered.
pub fn shape_payload(record: &ProjectRecord, format_date: &dyn Fn(&str) -> String) -> DocumentPayload {
    let date = |value: &Option<String>| value.as_deref().map(format_date).unwrap_or_default();

    let project_name = non_empty(&record.alt_name)
        .or(non_empty(&record.name))
        .unwrap_or_default()
        .to_string();
    let project_description = sanitize_opt(non_empty(&record.alt_description).or(record.description.as_deref()));

    let funding = resolve_yes_no(record.funding_yes.as_ref(), record.funding_no.as_ref(), None);
    let has_supporting_activities = !record.supporting_activities.is_empty();
    let supporting = resolve_yes_no(
        record.supporting_yes.as_ref(),
        record.supporting_no.as_ref(),
        Some(has_supporting_activities),
    );

    let core = record.core_activity().cloned().unwrap_or_default();
    let owner = record.project_owner.clone().unwrap_or_default();

    let YesNo {
        yes: funding_yes,
        no: funding_no,
    } = funding;
    let YesNo {
        yes: supporting_yes,
        no: supporting_no,
    } = supporting;

    DocumentPayload {
        uid: record.uid.clone().unwrap_or_default(),
        project_name,
        project_description,
        start_date: date(&record.start_date),
        end_date: date(&record.end_date),
        created_at: record
            .created_at
            .as_ref()
            .and_then(timestamp_date)
            .map(|d| format_date(&d))
            .unwrap_or_default(),
        status: record.status.clone().unwrap_or_default(),
        company_id: record.company_id.clone().unwrap_or_default(),
        anzsrc: record.anzsrc.clone().unwrap_or_default(),

        owner_full_name: full_name(&owner),
        owner_phone: phone(&owner),
        owner_first_name: owner.first_name.unwrap_or_default(),
        owner_last_name: owner.last_name.unwrap_or_default(),
        owner_role: owner.role.unwrap_or_default(),
        owner_phone_type: owner.phone_type.unwrap_or_default(),
        owner_email: owner.email.unwrap_or_default(),

        funding_yes: funding_yes.to_string(),
        funding_no: funding_no.to_string(),
        supporting_yes: supporting_yes.to_string(),
        supporting_no: supporting_no.to_string(),
        estimated_spend: non_empty(&record.estimated_spend)
            .unwrap_or(ESTIMATED_SPEND_PLACEHOLDER)
            .to_string(),

        core_activity_name: core.name.clone().unwrap_or_default(),
        core_activity_description: sanitize_opt(core.description.as_deref()),
        core_activity_start_date: date(&core.start_date),
        core_activity_end_date: date(&core.end_date),
        core_activity_uncertainties: sanitize_opt(core.uncertainties.as_deref()),
        core_activity_approach: sanitize_opt(core.approach.as_deref()),
        core_activity_intentions: sanitize_opt(core.intentions.as_deref()),

        has_supporting_activities,
        supporting_activities: record
            .supporting_activities
            .iter()
            .enumerate()
            .map(|(index, activity)| shape_supporting(index + 1, activity, &date))
            .collect(),
    }
}

fn shape_supporting(
    sequence: usize,
    activity: &SupportingActivity,
    date: &dyn Fn(&Option<String>) -> String,
) -> SupportingActivityPayload {
    SupportingActivityPayload {
        sequence,
        name: activity.name.clone().unwrap_or_default(),
        description: sanitize_opt(activity.description.as_deref()),
        start_date: date(&activity.start_date),
        end_date: date(&activity.end_date),
        definiition: activity
            .definiition
            .as_deref()
            .map(sanitize_text)
            .unwrap_or_default(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

fn full_name(owner: &Owner) -> String {
    join_present(&[&owner.first_name, &owner.last_name])
}

fn phone(owner: &Owner) -> String {
    join_present(&[&owner.phone_country_code, &owner.phone])
}

fn join_present(parts: &[&Option<String>]) -> String {
    parts
        .iter()
        .filter_map(|p| non_empty(p))
        .collect::<Vec<_>>()
        .join(" ")
}
