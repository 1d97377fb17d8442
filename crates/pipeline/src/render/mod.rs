//! Artifact rendering.

mod docx;
mod tags;

pub use docx::DocxRenderer;

use rdti_core::payload::DocumentPayload;

use crate::error::RenderError;

/// Turns a template plus one record's payload into document bytes.
///
/// Rendering is CPU-bound and synchronous. Implementations must be safe to
/// share across requests.
pub trait ArtifactRenderer: Send + Sync {
    fn render(&self, template: &[u8], payload: &DocumentPayload) -> Result<Vec<u8>, RenderError>;
}
