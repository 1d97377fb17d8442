#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use rdti_core::dates::DateFormat;
use serde_json::{json, Value};
use tower::ServiceExt;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use rdti_api::config::ServerConfig;
use rdti_api::router::build_app_router;
use rdti_api::state::AppState;
use rdti_pipeline::batch::BatchGenerator;
use rdti_pipeline::render::DocxRenderer;
use rdti_pipeline::storage::LocalStore;

pub const TEST_API_KEY: &str = "test-key";

/// Build a test `ServerConfig` rooted at `root`.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout and a batch limit of 3 records.
pub fn test_config(root: &Path, api_key: Option<&str>) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        api_key: api_key.map(str::to_string),
        output_dir: root.join("output"),
        template_path: root.join("template.docx"),
        date_format: DateFormat::Iso,
        max_batch_size: 3,
        max_body_bytes: 64 * 1024,
    }
}

/// A minimal DOCX template with a few tags.
pub fn template_bytes() -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer
        .write_all(b"<w:body><w:p><w:r><w:t>{projectName} ({uid})</w:t></w:r></w:p></w:body>")
        .unwrap();
    writer.finish().unwrap().into_inner()
}

/// Build the full application router over the local file system.
///
/// Writes the test template into `root` unless `with_template` is false.
/// The router is built by the same function `main.rs` uses, so tests
/// exercise the production middleware stack.
pub fn build_test_app(root: &Path, api_key: Option<&str>, with_template: bool) -> Router {
    let config = test_config(root, api_key);
    if with_template {
        std::fs::write(&config.template_path, template_bytes()).unwrap();
    }
    let generator = BatchGenerator::new(Arc::new(LocalStore), Arc::new(DocxRenderer::new()));
    let state = AppState::new(config.clone(), generator);
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: &Value) -> Response<Body> {
    post_json_with_key(app, uri, body, None).await
}

pub async fn post_json_with_key(
    app: Router,
    uri: &str,
    body: &Value,
    api_key: Option<&str>,
) -> Response<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(key) = api_key {
        builder = builder.header("x-api-key", key);
    }
    let request = builder.body(Body::from(body.to_string())).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// A record that passes validation.
pub fn complete_record(uid: &str) -> Value {
    json!({
        "uid": uid,
        "name": "Proj",
        "description": "D",
        "startDate": "2024-01-01",
        "endDate": "2024-12-31",
        "companyId": "C1",
        "anzsrc": "080101",
        "projectOwner": {
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "Director",
            "phone": "400000000",
            "phoneCountryCode": "+61",
            "phoneType": "mobile",
            "email": "ada@example.com"
        },
        "coreActivities": [{
            "name": "Core",
            "description": "Core work",
            "startDate": "2024-01-01",
            "endDate": "2024-06-30",
            "uncertainties": "Unknown outcome",
            "approach": "Experiments",
            "intentions": "New knowledge"
        }],
        "supportingActivities": []
    })
}
