use std::sync::Arc;

use rdti_pipeline::batch::BatchGenerator;

use crate::config::ServerConfig;
use crate::middleware::api_key::ApiKeyDigest;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Batch document generator (template store + renderer).
    pub generator: BatchGenerator,
    /// Digest of the configured API key, if any.
    pub api_key: Option<ApiKeyDigest>,
}

impl AppState {
    pub fn new(config: ServerConfig, generator: BatchGenerator) -> Self {
        let api_key = config.api_key.as_deref().map(ApiKeyDigest::of);
        Self {
            config: Arc::new(config),
            generator,
            api_key,
        }
    }
}
