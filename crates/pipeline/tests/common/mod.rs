#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use rdti_pipeline::batch::{BatchGenerator, BatchOptions};
use rdti_pipeline::render::DocxRenderer;
use rdti_pipeline::storage::{DocumentStore, LocalStore, MemoryStore};

pub const TEMPLATE_PATH: &str = "templates/RDTI_GA_template.docx";
pub const OUTPUT_DIR: &str = "output";

/// A small DOCX body using every tag kind the real template uses.
pub const DOCUMENT_XML: &str = concat!(
    "<w:document><w:body>",
    "<w:p><w:r><w:t>{projectName}</w:t></w:r></w:p>",
    "<w:p><w:r><w:t>{projectDescription}</w:t></w:r></w:p>",
    "<w:p><w:r><w:t>Funding: {fundingYes}/{fundingNo}</w:t></w:r></w:p>",
    "<w:p><w:r><w:t>Core: {coreActivityName}</w:t></w:r></w:p>",
    "<w:p><w:r><w:t>{#supportingActivities}</w:t></w:r></w:p>",
    "<w:p><w:r><w:t>SA{sequence}: {name} ({definiition})</w:t></w:r></w:p>",
    "<w:p><w:r><w:t>{/supportingActivities}</w:t></w:r></w:p>",
    "<w:p><w:r><w:t>{^hasSupportingActivities}No supporting activities{/hasSupportingActivities}</w:t></w:r></w:p>",
    "</w:body></w:document>"
);

/// Build a DOCX archive in memory.
pub fn docx(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn template_bytes() -> Vec<u8> {
    docx(&[
        ("[Content_Types].xml", "<Types/>"),
        ("word/document.xml", DOCUMENT_XML),
    ])
}

/// Read one part of a rendered document.
pub fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut xml = String::new();
    entry.read_to_string(&mut xml).unwrap();
    xml
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

pub fn supporting_activity(name: &str) -> Value {
    json!({
        "name": name,
        "description": "Support work",
        "startDate": "2024-02-01",
        "endDate": "2024-03-01",
        "definiition": format!("{name} definition")
    })
}

/// Generator over an in-memory store seeded with the test template.
pub async fn memory_generator() -> (BatchGenerator, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.insert(TEMPLATE_PATH, template_bytes()).await;
    let generator = BatchGenerator::new(store.clone(), Arc::new(DocxRenderer::new()));
    (generator, store)
}

pub fn memory_options() -> BatchOptions {
    BatchOptions::new(OUTPUT_DIR, TEMPLATE_PATH)
}

/// Generator writing to the local file system under `root`.
pub async fn local_generator(root: &Path) -> (BatchGenerator, BatchOptions) {
    let template = root.join("template.docx");
    LocalStore.write(&template, &template_bytes()).await.unwrap();
    let generator = BatchGenerator::new(Arc::new(LocalStore), Arc::new(DocxRenderer::new()));
    (generator, BatchOptions::new(root.join("out"), template))
}
