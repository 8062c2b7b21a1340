use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

/// Gate for every business endpoint: `Authorization: Bearer <key>` compared
/// byte-for-byte against the process-wide API key. Rejection happens before
/// the handler body runs, so a failed request never touches the store.
#[derive(Debug)]
pub struct ApiKey;

#[async_trait]
impl FromRequestParts<AppState> for ApiKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".into()))?;

        let key = auth
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid Authorization header".into()))?;

        if key.as_bytes() != state.config.api_key.as_bytes() {
            warn!("rejected request with wrong api key");
            return Err(ApiError::Unauthorized("Invalid API key".into()));
        }

        Ok(ApiKey)
    }
}
