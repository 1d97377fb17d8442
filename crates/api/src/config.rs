use std::path::PathBuf;

use rdti_core::dates::DateFormat;
use rdti_pipeline::batch::BatchOptions;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Shared API key. When unset, the document endpoints are open.
    pub api_key: Option<String>,
    /// Directory generated documents are written to.
    pub output_dir: PathBuf,
    /// DOCX template used for every record.
    pub template_path: PathBuf,
    pub date_format: DateFormat,
    /// Maximum number of records accepted per request.
    pub max_batch_size: usize,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                           |
    /// |------------------------|-----------------------------------|
    /// | `HOST`                 | `0.0.0.0`                         |
    /// | `PORT`                 | `3000`                            |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`           |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                              |
    /// | `API_KEY`              | unset                             |
    /// | `OUTPUT_DIR`           | `output`                          |
    /// | `TEMPLATE_PATH`        | `templates/RDTI_GA_template.docx` |
    /// | `DATE_FORMAT`          | `iso`                             |
    /// | `MAX_BATCH_SIZE`       | `50`                              |
    /// | `MAX_BODY_BYTES`       | `1048576`                         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let api_key = std::env::var("API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        let output_dir = PathBuf::from(std::env::var("OUTPUT_DIR").unwrap_or_else(|_| "output".into()));

        let template_path = PathBuf::from(
            std::env::var("TEMPLATE_PATH")
                .unwrap_or_else(|_| "templates/RDTI_GA_template.docx".into()),
        );

        let date_format = DateFormat::from_name(
            &std::env::var("DATE_FORMAT").unwrap_or_else(|_| "iso".into()),
        )
        .unwrap_or_else(|e| panic!("DATE_FORMAT is invalid: {e}"));

        let max_batch_size: usize = std::env::var("MAX_BATCH_SIZE")
            .unwrap_or_else(|_| "50".into())
            .parse()
            .expect("MAX_BATCH_SIZE must be a valid usize");

        let max_body_bytes: usize = std::env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| "1048576".into())
            .parse()
            .expect("MAX_BODY_BYTES must be a valid usize");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            api_key,
            output_dir,
            template_path,
            date_format,
            max_batch_size,
            max_body_bytes,
        }
    }

    /// Per-batch options derived from this configuration.
    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions::new(&self.output_dir, &self.template_path).with_date_format(self.date_format)
    }
}
