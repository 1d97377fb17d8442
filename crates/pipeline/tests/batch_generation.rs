//! Integration tests for batch document generation.

mod common;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use assert_matches::assert_matches;
use async_trait::async_trait;
use rdti_core::dates::DateFormat;
use rdti_core::error::CoreError;
use rdti_core::payload::DocumentPayload;
use rdti_pipeline::batch::{BatchGenerator, BatchResponse, BatchStatus};
use rdti_pipeline::error::{PipelineError, RenderError, StorageError};
use rdti_pipeline::render::{ArtifactRenderer, DocxRenderer};
use rdti_pipeline::storage::{DocumentStore, MemoryStore};
use serde_json::json;

use common::{complete_record, memory_generator, memory_options, read_part, supporting_activity};

// ---------------------------------------------------------------------------
// Test: one complete record produces one document and a success response
// ---------------------------------------------------------------------------

#[tokio::test]
async fn single_complete_record_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let (generator, options) = common::local_generator(dir.path()).await;

    let result = generator
        .generate(&json!([complete_record("p1")]), &options)
        .await
        .unwrap();
    let response = BatchResponse::from(&result);

    let expected = dir.path().join("out").join("RDTI_GA_p1.docx");
    assert_eq!(response.status, BatchStatus::Success);
    assert_eq!(response.docx_path, Some(expected.display().to_string()));
    assert_eq!(response.docx_paths, vec![expected.display().to_string()]);
    assert!(response.errors.is_empty());

    let bytes = std::fs::read(&expected).unwrap();
    let body = read_part(&bytes, "word/document.xml");
    assert!(body.contains(">Proj<"));
    assert!(body.contains("Core: Core"));
    assert!(body.contains("No supporting activities"));
    assert!(!body.contains('{'));
}

// ---------------------------------------------------------------------------
// Test: an invalid record in the middle does not stop the batch
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_record_is_isolated() {
    let (generator, store) = memory_generator().await;

    let mut second = complete_record("p2");
    second["name"] = json!("");
    let input = json!([complete_record("p1"), second, complete_record("p3")]);

    let result = generator.generate(&input, &memory_options()).await.unwrap();

    assert_eq!(result.status, BatchStatus::Error);
    assert_eq!(
        result.paths,
        vec![
            Path::new(common::OUTPUT_DIR).join("RDTI_GA_p1.docx"),
            Path::new(common::OUTPUT_DIR).join("RDTI_GA_p3.docx"),
        ]
    );
    assert_eq!(result.errors, vec!["p2: name is required".to_string()]);
    assert_eq!(result.outcomes.len(), 3);
    assert_eq!(result.outcomes[1].status, BatchStatus::Error);
    assert!(store
        .get(&Path::new(common::OUTPUT_DIR).join("RDTI_GA_p2.docx"))
        .await
        .is_none());
}

#[tokio::test]
async fn missing_uid_is_reported_as_unknown() {
    let (generator, _) = memory_generator().await;

    let mut record = complete_record("x");
    record.as_object_mut().unwrap().remove("uid");

    let result = generator
        .generate(&json!([record]), &memory_options())
        .await
        .unwrap();

    assert_eq!(result.status, BatchStatus::Error);
    assert_eq!(result.errors, vec!["unknown: uid is required".to_string()]);
}

// ---------------------------------------------------------------------------
// Test: supporting activities are numbered in input order
// ---------------------------------------------------------------------------

#[tokio::test]
async fn supporting_activities_are_numbered_in_order() {
    let (generator, store) = memory_generator().await;

    let mut record = complete_record("p1");
    record["supportingActivities"] = json!([
        supporting_activity("Alpha"),
        supporting_activity("Beta"),
        supporting_activity("Gamma"),
    ]);

    let result = generator
        .generate(&json!({ "projects": [record] }), &memory_options())
        .await
        .unwrap();
    assert_eq!(result.status, BatchStatus::Success);

    let bytes = store.get(&result.paths[0]).await.unwrap();
    let body = read_part(&bytes, "word/document.xml");
    let alpha = body.find("SA1: Alpha (Alpha definition)").unwrap();
    let beta = body.find("SA2: Beta (Beta definition)").unwrap();
    let gamma = body.find("SA3: Gamma (Gamma definition)").unwrap();
    assert!(alpha < beta && beta < gamma);
    assert!(!body.contains("No supporting activities"));
}

#[tokio::test]
async fn only_first_core_activity_is_rendered() {
    let (generator, store) = memory_generator().await;

    let mut record = complete_record("p1");
    let mut extra = record["coreActivities"][0].clone();
    extra["name"] = json!("Ignored");
    record["coreActivities"].as_array_mut().unwrap().push(extra);

    let result = generator
        .generate(&json!([record]), &memory_options())
        .await
        .unwrap();

    let body = read_part(&store.get(&result.paths[0]).await.unwrap(), "word/document.xml");
    assert!(body.contains("Core: Core"));
    assert!(!body.contains("Ignored"));
}

#[tokio::test]
async fn date_format_reaches_the_payload() {
    let store = Arc::new(MemoryStore::new());
    let template = common::docx(&[(
        "word/document.xml",
        "<w:body><w:t>{startDate}|{endDate}</w:t></w:body>",
    )]);
    store.insert(common::TEMPLATE_PATH, template).await;
    let generator = BatchGenerator::new(store.clone(), Arc::new(DocxRenderer));
    let options = memory_options().with_date_format(DateFormat::Au);

    let result = generator
        .generate(&json!([complete_record("p1")]), &options)
        .await
        .unwrap();

    let body = read_part(&store.get(&result.paths[0]).await.unwrap(), "word/document.xml");
    assert!(body.contains("01/01/2024|31/12/2024"));
}

// ---------------------------------------------------------------------------
// Test: batch-fatal errors
// ---------------------------------------------------------------------------

#[tokio::test]
async fn invalid_input_shape_is_fatal() {
    let (generator, _) = memory_generator().await;

    for input in [json!(null), json!("x"), json!(3), json!({ "items": [] })] {
        let result = generator.generate(&input, &memory_options()).await;
        assert_matches!(
            result,
            Err(PipelineError::Input(CoreError::InvalidInputShape(_)))
        );
    }
}

#[tokio::test]
async fn missing_template_is_fatal() {
    let generator = BatchGenerator::new(
        Arc::new(MemoryStore::new()),
        Arc::new(DocxRenderer),
    );

    let result = generator
        .generate(&json!([complete_record("p1")]), &memory_options())
        .await;
    assert_matches!(result, Err(PipelineError::TemplateLoad { .. }));
}

#[tokio::test]
async fn empty_batch_reports_error_status() {
    let (generator, store) = memory_generator().await;

    let result = generator.generate(&json!([]), &memory_options()).await.unwrap();

    assert_eq!(result.status, BatchStatus::Error);
    assert!(result.paths.is_empty());
    assert!(result.errors.is_empty());
    assert!(store.has_dir(Path::new(common::OUTPUT_DIR)).await);
}

// ---------------------------------------------------------------------------
// Test: a render failure is scoped to its record
// ---------------------------------------------------------------------------

/// Fails for one uid, delegates to the real renderer otherwise.
struct FailingFor(&'static str);

impl ArtifactRenderer for FailingFor {
    fn render(&self, template: &[u8], payload: &DocumentPayload) -> Result<Vec<u8>, RenderError> {
        if payload.uid == self.0 {
            return Err(RenderError::EmptyTag {
                part: "word/document.xml".to_string(),
            });
        }
        DocxRenderer.render(template, payload)
    }
}

#[tokio::test]
async fn render_error_is_isolated() {
    let store = Arc::new(MemoryStore::new());
    store.insert(common::TEMPLATE_PATH, common::template_bytes()).await;
    let generator = BatchGenerator::new(store.clone(), Arc::new(FailingFor("p1")));

    let result = generator
        .generate(
            &json!([complete_record("p1"), complete_record("p2")]),
            &memory_options(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, BatchStatus::Success);
    assert_eq!(
        result.paths,
        vec![PathBuf::from(common::OUTPUT_DIR).join("RDTI_GA_p2.docx")]
    );
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("p1: "));
    assert_eq!(result.outcomes[0].status, BatchStatus::Error);
}

#[tokio::test]
async fn warnings_do_not_block_rendering() {
    let (generator, _) = memory_generator().await;

    let mut record = complete_record("p1");
    let extra = record["coreActivities"][0].clone();
    record["coreActivities"].as_array_mut().unwrap().push(extra);

    let result = generator
        .generate(&json!([record]), &memory_options())
        .await
        .unwrap();

    assert_eq!(result.status, BatchStatus::Success);
    assert!(result.errors.is_empty());
    let issues = &result.outcomes[0].issues;
    assert!(issues.iter().all(|i| !i.is_blocking()));
    assert!(!issues.is_empty());
}

// ---------------------------------------------------------------------------
// Test: string timestamp parts do not reject a valid record
// ---------------------------------------------------------------------------

#[tokio::test]
async fn string_timestamp_parts_still_render() {
    let (generator, store) = memory_generator().await;

    let mut record = complete_record("p1");
    record["createdAt"] = json!({ "seconds": "1704067200", "nanoseconds": 0 });
    let mut unreadable = complete_record("p2");
    unreadable["createdAt"] = json!({ "seconds": "yesterday" });

    let result = generator
        .generate(&json!([record, unreadable]), &memory_options())
        .await
        .unwrap();

    assert_eq!(result.status, BatchStatus::Success);
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.paths.len(), 2);
    assert!(store.get(&result.paths[0]).await.is_some());
}

// ---------------------------------------------------------------------------
// Test: uids that sanitize to the same filename never overwrite each other
// ---------------------------------------------------------------------------

#[tokio::test]
async fn colliding_output_names_fail_the_later_record() {
    let (generator, store) = memory_generator().await;

    let mut first = complete_record("a/b");
    first["name"] = json!("First");
    let mut second = complete_record("a_b");
    second["name"] = json!("Second");

    let result = generator
        .generate(&json!([first, second]), &memory_options())
        .await
        .unwrap();

    let path = PathBuf::from(common::OUTPUT_DIR).join("RDTI_GA_a_b.docx");
    assert_eq!(result.paths, vec![path.clone()]);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("a_b: "), "{}", result.errors[0]);
    assert!(result.errors[0].contains("'a/b'"), "{}", result.errors[0]);
    assert_eq!(result.outcomes[1].status, BatchStatus::Error);

    let body = read_part(&store.get(&path).await.unwrap(), "word/document.xml");
    assert!(body.contains("First"));
    assert!(!body.contains("Second"));
}

// ---------------------------------------------------------------------------
// Test: the template is read once per batch and write failures are isolated
// ---------------------------------------------------------------------------

/// Counts reads and fails writes to one path; everything else goes to memory.
struct CountingStore {
    inner: MemoryStore,
    reads: AtomicUsize,
    fail_write: PathBuf,
}

impl CountingStore {
    async fn new(fail_write: PathBuf) -> Self {
        let inner = MemoryStore::new();
        inner
            .insert(common::TEMPLATE_PATH, common::template_bytes())
            .await;
        Self {
            inner,
            reads: AtomicUsize::new(0),
            fail_write,
        }
    }
}

#[async_trait]
impl DocumentStore for CountingStore {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.read(path).await
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        if path == self.fail_write {
            return Err(StorageError::Write {
                path: path.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }
        self.inner.write(path, bytes).await
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), StorageError> {
        self.inner.ensure_dir(path).await
    }
}

#[tokio::test]
async fn template_is_read_once_per_batch() {
    let store = Arc::new(CountingStore::new(PathBuf::from("nowhere")).await);
    let generator = BatchGenerator::new(store.clone(), Arc::new(DocxRenderer::new()));

    let result = generator
        .generate(
            &json!([complete_record("p1"), complete_record("p2"), complete_record("p3")]),
            &memory_options(),
        )
        .await
        .unwrap();

    assert_eq!(result.paths.len(), 3);
    assert_eq!(store.reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn write_error_is_isolated() {
    let failing = PathBuf::from(common::OUTPUT_DIR).join("RDTI_GA_p2.docx");
    let store = Arc::new(CountingStore::new(failing).await);
    let generator = BatchGenerator::new(store.clone(), Arc::new(DocxRenderer::new()));

    let result = generator
        .generate(
            &json!([complete_record("p1"), complete_record("p2"), complete_record("p3")]),
            &memory_options(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, BatchStatus::Success);
    assert_eq!(
        result.paths,
        vec![
            PathBuf::from(common::OUTPUT_DIR).join("RDTI_GA_p1.docx"),
            PathBuf::from(common::OUTPUT_DIR).join("RDTI_GA_p3.docx"),
        ]
    );
    assert_eq!(result.errors.len(), 1);
    assert!(
        result.errors[0].starts_with("p2: Failed to write "),
        "{}",
        result.errors[0]
    );
    assert_eq!(store.inner.paths().await.len(), 3);
}
