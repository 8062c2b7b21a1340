use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::store::User;

/// Request body for registration. The client installation assigns `user_id`;
/// re-sending the same id overwrites the profile fields.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}

/// Request body for login reporting. `timestamp` defaults to server time.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub timestamp: Option<OffsetDateTime>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub last_login: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct UsersListResponse {
    pub users: Vec<User>,
}
