use rdti_core::error::CoreError;

/// Failures of the document store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Failures of the artifact renderer. Always scoped to one record.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Template is not a valid DOCX archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("I/O error while rendering: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template part {part} is not valid UTF-8")]
    Encoding { part: String },

    #[error("Malformed XML in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("Unterminated tag in {part}")]
    UnterminatedTag { part: String },

    #[error("Empty tag in {part}")]
    EmptyTag { part: String },

    #[error("Section '{{#{name}}}' in {part} is never closed")]
    UnclosedSection { part: String, name: String },

    #[error("Closing tag '{{/{found}}}' in {part} does not match '{expected}'")]
    UnbalancedSection {
        part: String,
        expected: String,
        found: String,
    },

    #[error("Payload could not be serialized: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Batch-fatal errors. Per-record problems never surface here.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] CoreError),

    #[error("Failed to load template {path}: {reason}")]
    TemplateLoad { path: String, reason: String },

    #[error("File system error: {0}")]
    FileSystem(#[from] StorageError),
}
