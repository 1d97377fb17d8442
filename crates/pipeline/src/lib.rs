//! Document generation pipeline.
//!
//! Drives the pure logic in `rdti_core` through the I/O seams: template
//! loading, DOCX rendering and document storage. [`batch::BatchGenerator`]
//! is the entry point used by the API server and the CLI.

pub mod batch;
pub mod error;
pub mod render;
pub mod storage;
pub mod template;
