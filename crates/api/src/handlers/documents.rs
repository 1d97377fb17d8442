//! Handlers for the `/documents` resource.
//!
//! Batch document generation and strict dry-run validation.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use rdti_core::input::normalize_input;
use rdti_core::validation::schema::validate_projects_schema;
use rdti_pipeline::batch::{BatchResponse, BatchStatus};
use serde::Serialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::middleware::api_key::ApiKey;
use crate::response::DataResponse;
use crate::state::AppState;

// ── Generation ───────────────────────────────────────────────────────

/// POST /api/v1/documents/generate
///
/// Generate one DOCX per valid record. The body is a list of project
/// records or `{ "projects": [...] }`. Responds 200 when the batch
/// succeeded and 422 otherwise; the body always carries the per-record
/// errors.
pub async fn generate(
    _key: ApiKey,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<(StatusCode, Json<BatchResponse>)> {
    let Json(input) = body?;
    let count = check_batch_size(&input, state.config.max_batch_size)?;
    tracing::debug!(count, "Generate request accepted");

    let options = state.config.batch_options();
    let result = state.generator.generate(&input, &options).await?;

    let status = match result.status {
        BatchStatus::Success => StatusCode::OK,
        BatchStatus::Error => StatusCode::UNPROCESSABLE_ENTITY,
    };
    Ok((status, Json(BatchResponse::from(&result))))
}

// ── Validation / Dry-Run ─────────────────────────────────────────────

/// Result of a dry-run validation.
#[derive(Debug, Serialize)]
pub struct ValidationSummary {
    pub valid: bool,
    /// Number of records in the request.
    pub count: usize,
    /// `projects[<index>].<path>: <message>` entries.
    pub errors: Vec<String>,
}

/// POST /api/v1/documents/validate
///
/// Run the strict schema validator over a batch without rendering
/// anything. Validation failures are reported in the body with 200.
pub async fn validate(
    _key: ApiKey,
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<DataResponse<ValidationSummary>>> {
    let Json(input) = body?;
    let count = check_batch_size(&input, state.config.max_batch_size)?;

    let errors = match validate_projects_schema(&input) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    };

    Ok(Json(DataResponse {
        data: ValidationSummary {
            valid: errors.is_empty(),
            count,
            errors,
        },
    }))
}

/// Reject malformed input and batches above the configured size.
fn check_batch_size(input: &Value, max: usize) -> AppResult<usize> {
    let count = normalize_input(input)?.len();
    if count > max {
        return Err(AppError::BadRequest(format!(
            "Batch of {count} records exceeds the limit of {max}"
        )));
    }
    Ok(count)
}
