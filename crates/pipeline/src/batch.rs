//! Batch orchestration: validate, shape, render and store every record.
//!
//! Setup problems (input shape, template, output directory) abort the
//! batch. Anything that goes wrong with a single record is recorded on its
//! [`RenderOutcome`] and the batch moves on to the next record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rdti_core::dates::DateFormat;
use rdti_core::input::normalize_input;
use rdti_core::naming::document_filename;
use rdti_core::payload::shape_payload;
use rdti_core::types::ProjectRecord;
use rdti_core::validation::record::validate_record;
use rdti_core::validation::rules::ValidationIssue;
use serde::Serialize;
use serde_json::Value;

use crate::error::{PipelineError, RenderError, StorageError};
use crate::render::ArtifactRenderer;
use crate::storage::DocumentStore;
use crate::template::Template;

/// Identifier used in error strings when a record has no usable uid.
pub const UNKNOWN_UID: &str = "unknown";

/// Date formatter applied by the payload shaper.
pub type DateFormatter = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Per-batch settings. Nothing here is process-global.
#[derive(Clone)]
pub struct BatchOptions {
    pub output_dir: PathBuf,
    pub template_path: PathBuf,
    pub date_format: DateFormatter,
}

impl BatchOptions {
    /// Options with dates passed through unchanged.
    pub fn new(output_dir: impl Into<PathBuf>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            template_path: template_path.into(),
            date_format: Arc::new(|date: &str| date.to_string()),
        }
    }

    pub fn with_date_format(mut self, format: DateFormat) -> Self {
        self.date_format = Arc::new(move |date: &str| format.format(date));
        self
    }

    pub fn with_date_formatter(mut self, formatter: DateFormatter) -> Self {
        self.date_format = formatter;
        self
    }
}

impl std::fmt::Debug for BatchOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOptions")
            .field("output_dir", &self.output_dir)
            .field("template_path", &self.template_path)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Error,
}

/// Why a single record produced no document.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Shape(#[from] rdti_core::error::CoreError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Write(#[from] StorageError),

    /// Two uids mapped to the same output file.
    #[error("Output file {} was already written for record '{owner}'", path.display())]
    DuplicateOutput { path: PathBuf, owner: String },
}

/// What happened to one record.
#[derive(Debug, Clone, Serialize)]
pub struct RenderOutcome {
    pub uid: String,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Every validation issue, warnings included.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<ValidationIssue>,
}

/// Aggregate result of one batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub status: BatchStatus,
    /// Written documents, in input order.
    pub paths: Vec<PathBuf>,
    /// One `"<uid>: <message>"` entry per failed record.
    pub errors: Vec<String>,
    pub outcomes: Vec<RenderOutcome>,
}

/// Wire shape returned to API and CLI callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchResponse {
    pub status: BatchStatus,
    pub docx_path: Option<String>,
    pub docx_paths: Vec<String>,
    pub errors: Vec<String>,
}

impl From<&BatchResult> for BatchResponse {
    fn from(result: &BatchResult) -> Self {
        let docx_paths: Vec<String> = result
            .paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        Self {
            status: result.status,
            docx_path: docx_paths.first().cloned(),
            docx_paths,
            errors: result.errors.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Runs batches against a storage backend and a renderer.
#[derive(Clone)]
pub struct BatchGenerator {
    store: Arc<dyn DocumentStore>,
    renderer: Arc<dyn ArtifactRenderer>,
}

impl BatchGenerator {
    pub fn new(store: Arc<dyn DocumentStore>, renderer: Arc<dyn ArtifactRenderer>) -> Self {
        Self { store, renderer }
    }

    /// Generate one document per valid record in `input`.
    ///
    /// `input` is a list of records or `{ "projects": [...] }`. Records are
    /// processed sequentially in input order.
    pub async fn generate(
        &self,
        input: &Value,
        options: &BatchOptions,
    ) -> Result<BatchResult, PipelineError> {
        let records = normalize_input(input)?;
        tracing::info!(records = records.len(), "Starting document batch");

        let template = Template::load(self.store.as_ref(), &options.template_path).await?;
        self.store.ensure_dir(&options.output_dir).await?;

        let mut outcomes = Vec::with_capacity(records.len());
        let mut written: HashMap<PathBuf, String> = HashMap::new();
        let mut validation_failed = false;

        for raw in records {
            let validation = validate_record(raw);
            let uid = record_uid(&validation.record);

            let result = if validation.is_valid() {
                self.produce(&template, validation.record.clone(), &uid, options, &written)
                    .await
            } else {
                validation_failed = true;
                Err(RecordError::Invalid(validation.error_summary()))
            };

            let outcome = match result {
                Ok(path) => {
                    tracing::info!(uid = %uid, path = %path.display(), "Document written");
                    written.insert(path.clone(), uid.clone());
                    RenderOutcome {
                        uid,
                        status: BatchStatus::Success,
                        path: Some(path),
                        error: None,
                        issues: validation.issues,
                    }
                }
                Err(e) => {
                    tracing::warn!(uid = %uid, error = %e, "Record skipped");
                    RenderOutcome {
                        uid,
                        status: BatchStatus::Error,
                        path: None,
                        error: Some(e.to_string()),
                        issues: validation.issues,
                    }
                }
            };
            outcomes.push(outcome);
        }

        let result = aggregate(outcomes, validation_failed);
        tracing::info!(
            status = ?result.status,
            written = result.paths.len(),
            failed = result.errors.len(),
            "Document batch finished"
        );
        Ok(result)
    }

    async fn produce(
        &self,
        template: &Template,
        record: Value,
        uid: &str,
        options: &BatchOptions,
        written: &HashMap<PathBuf, String>,
    ) -> Result<PathBuf, RecordError> {
        let path = output_path(&options.output_dir, uid);
        if let Some(owner) = written.get(&path) {
            return Err(RecordError::DuplicateOutput {
                path,
                owner: owner.clone(),
            });
        }

        let record = ProjectRecord::from_value(record)?;
        let payload = shape_payload(&record, options.date_format.as_ref());
        let bytes = self.renderer.render(template.bytes(), &payload)?;

        self.store.write(&path, &bytes).await?;
        Ok(path)
    }
}

/// Where the document for `uid` is written.
pub fn output_path(output_dir: &Path, uid: &str) -> PathBuf {
    output_dir.join(document_filename(uid))
}

fn record_uid(record: &Value) -> String {
    match record.get("uid") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => UNKNOWN_UID.to_string(),
    }
}

fn aggregate(outcomes: Vec<RenderOutcome>, validation_failed: bool) -> BatchResult {
    let paths: Vec<PathBuf> = outcomes.iter().filter_map(|o| o.path.clone()).collect();
    let errors = outcomes
        .iter()
        .filter_map(|o| o.error.as_ref().map(|e| format!("{}: {e}", o.uid)))
        .collect();
    let status = if !paths.is_empty() && !validation_failed {
        BatchStatus::Success
    } else {
        BatchStatus::Error
    };
    BatchResult {
        status,
        paths,
        errors,
        outcomes,
    }
}
