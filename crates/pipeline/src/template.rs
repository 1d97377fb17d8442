//! Document template loading.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use zip::ZipArchive;

use crate::error::PipelineError;
use crate::storage::DocumentStore;

/// The archive entry every DOCX template must contain.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// A DOCX template loaded once per batch and shared by every record.
#[derive(Debug, Clone)]
pub struct Template {
    path: PathBuf,
    bytes: Arc<[u8]>,
}

impl Template {
    /// Read and check the template at `path`.
    ///
    /// Any failure is batch-fatal and reported as
    /// [`PipelineError::TemplateLoad`].
    pub async fn load(store: &dyn DocumentStore, path: &Path) -> Result<Self, PipelineError> {
        let bytes = store
            .read(path)
            .await
            .map_err(|e| template_error(path, e.to_string()))?;
        Self::from_bytes(path, bytes)
    }

    /// Wrap already-loaded bytes, applying the same checks as [`Template::load`].
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self, PipelineError> {
        let path = path.into();
        check_docx(&bytes).map_err(|reason| template_error(&path, reason))?;
        Ok(Self {
            path,
            bytes: bytes.into(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn check_docx(bytes: &[u8]) -> Result<(), String> {
    let archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| format!("not a DOCX archive: {e}"))?;
    if !archive.file_names().any(|name| name == DOCUMENT_PART) {
        return Err(format!("archive has no {DOCUMENT_PART}"));
    }
    Ok(())
}

fn template_error(path: &Path, reason: String) -> PipelineError {
    PipelineError::TemplateLoad {
        path: path.display().to_string(),
        reason,
    }
}
