//! DOCX rendering on top of the `zip` container.

use std::io::{Cursor, Read, Write};

use rdti_core::payload::DocumentPayload;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::tags;
use super::ArtifactRenderer;
use crate::error::RenderError;

/// Renders the payload into the body, header and footer parts of a DOCX
/// template. Every other archive entry is copied unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    pub fn new() -> Self {
        Self
    }
}

/// Parts that may carry tags.
fn is_templated_part(name: &str) -> bool {
    name == "word/document.xml"
        || ((name.starts_with("word/header") || name.starts_with("word/footer"))
            && name.ends_with(".xml"))
}

impl ArtifactRenderer for DocxRenderer {
    fn render(&self, template: &[u8], payload: &DocumentPayload) -> Result<Vec<u8>, RenderError> {
        let data = serde_json::to_value(payload)?;
        let mut archive = ZipArchive::new(Cursor::new(template))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                writer.add_directory(name, options)?;
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut bytes)?;

            if is_templated_part(&name) {
                let xml = String::from_utf8(bytes)
                    .map_err(|_| RenderError::Encoding { part: name.clone() })?;
                bytes = if tags::has_tags(&xml) {
                    tags::render_part(&name, &xml, &data)?.into_bytes()
                } else {
                    xml.into_bytes()
                };
            }

            writer.start_file(name, options)?;
            writer.write_all(&bytes)?;
        }

        Ok(writer.finish()?.into_inner())
    }
}
