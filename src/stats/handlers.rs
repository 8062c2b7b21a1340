use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::auth::ApiKey;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{GlobalReport, StatReport, SummaryQuery, SummaryResponse, SyncResponse};
use super::services::{self, Period};

pub fn sync_routes() -> Router<AppState> {
    Router::new().route("/api/stats/update", post(sync_stats))
}

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/api/stats/:user_id", get(user_summary))
        .route("/api/admin/stats", get(admin_report))
}

/// Batch reconciliation. A well-formed batch always answers 200; the caller
/// must inspect the per-item outcomes.
#[instrument(skip(state, body))]
pub async fn sync_stats(
    State(state): State<AppState>,
    _key: ApiKey,
    Json(body): Json<Value>,
) -> Result<Json<SyncResponse>, ApiError> {
    let items = body
        .get("stats")
        .and_then(Value::as_array)
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ApiError::BadRequest("stats must be a non-empty array".into()))?;

    let reports: Vec<StatReport> = serde_json::from_value(Value::Array(items.clone()))
        .map_err(|e| ApiError::BadRequest(format!("invalid stats payload: {e}")))?;

    let batch_len = reports.len();
    let results = services::reconcile(state.store.as_ref(), reports).await;
    info!(batch_len, "stats batch reconciled");
    Ok(Json(SyncResponse { results }))
}

#[instrument(skip(state))]
pub async fn user_summary(
    State(state): State<AppState>,
    _key: ApiKey,
    Path(user_id): Path<String>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let period = Period::parse(query.period.as_deref());
    let summary = services::summarize(state.store.as_ref(), &user_id, period).await?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn admin_report(
    State(state): State<AppState>,
    _key: ApiKey,
) -> Result<Json<GlobalReport>, ApiError> {
    let report = services::global_report(state.store.as_ref()).await?;
    Ok(Json(report))
}
