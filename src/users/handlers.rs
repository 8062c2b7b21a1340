use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::auth::ApiKey;
use crate::error::ApiError;
use crate::state::AppState;

use super::dto::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UsersListResponse};
use super::services::{self, RegisterOutcome};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/api/users/register", post(register))
        .route("/api/users/login", post(login))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/api/admin/users", get(list_users))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    _key: ApiKey,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    match services::register_or_update(state.store.as_ref(), payload).await? {
        RegisterOutcome::Created(user) => {
            info!(user_id = %user.user_id, username = %user.username, "user registered");
            Ok((
                StatusCode::CREATED,
                Json(RegisterResponse {
                    message: "User registered".into(),
                    user,
                }),
            ))
        }
        RegisterOutcome::Updated(user) => {
            info!(user_id = %user.user_id, username = %user.username, "user updated");
            Ok((
                StatusCode::OK,
                Json(RegisterResponse {
                    message: "User updated".into(),
                    user,
                }),
            ))
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    _key: ApiKey,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let last_login =
        services::record_login(state.store.as_ref(), &payload.user_id, payload.timestamp).await?;
    info!(user_id = %payload.user_id, "login recorded");
    Ok(Json(LoginResponse {
        message: "Login recorded".into(),
        last_login,
    }))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    _key: ApiKey,
) -> Result<Json<UsersListResponse>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(UsersListResponse { users }))
}
