//! Route definitions for the `/documents` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::documents;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// POST   /generate     -> generate
/// POST   /validate     -> validate   (dry-run)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(documents::generate))
        .route("/validate", post(documents::validate))
}
