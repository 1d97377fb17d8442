//! Shared API key guard: an extractor for handlers and a middleware for
//! nested services such as `/files`.

use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Fixed HMAC key the configured and presented API keys are tagged under.
const TAG_CONTEXT: &[u8] = b"rdti-api-key";

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 tag of the configured API key. The raw key is not kept.
#[derive(Clone)]
pub struct ApiKeyDigest([u8; 32]);

impl ApiKeyDigest {
    pub fn of(key: &str) -> Self {
        Self(tag(key).finalize().into_bytes().into())
    }

    /// Constant-time check of a presented key against this tag.
    pub fn verify(&self, presented: &str) -> bool {
        tag(presented).verify_slice(&self.0).is_ok()
    }
}

impl std::fmt::Debug for ApiKeyDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKeyDigest(..)")
    }
}

fn tag(key: &str) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(TAG_CONTEXT).expect("HMAC accepts any key length");
    mac.update(key.as_bytes());
    mac
}

/// Check the `x-api-key` header against the configured key, if any.
pub fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), AppError> {
    let Some(expected) = &state.api_key else {
        return Ok(());
    };

    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing x-api-key header".into()))?;

    if !expected.verify(presented.trim()) {
        tracing::warn!("Rejected request with invalid API key");
        return Err(AppError::Unauthorized("Invalid API key".into()));
    }
    Ok(())
}

/// Guard for the document endpoints.
///
/// Passes every request when no key is configured. Otherwise the
/// `x-api-key` header must carry the configured key:
///
/// ```ignore
/// async fn my_handler(_key: ApiKey, State(state): State<AppState>) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ApiKey;

impl FromRequestParts<AppState> for ApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(state, &parts.headers)?;
        Ok(ApiKey)
    }
}

/// Middleware form of [`ApiKey`] for services that have no handler to
/// extract into.
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    authorize(&state, request.headers())?;
    Ok(next.run(request).await)
}
