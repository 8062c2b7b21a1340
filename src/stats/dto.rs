use serde::{Deserialize, Serialize};

use crate::store::{Stat, StatCounters};

/// One locally-accumulated counter record in a sync batch. `stat_id` is the
/// client-generated idempotency key.
#[derive(Debug, Clone, Deserialize)]
pub struct StatReport {
    pub stat_id: String,
    pub user_id: String,
    pub date: String,
    #[serde(flatten)]
    pub counters: StatCounters,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Created,
    Updated,
    Error,
}

/// Per-item outcome, returned in the same order as the incoming batch.
#[derive(Debug, Serialize)]
pub struct SyncResult {
    pub stat_id: String,
    pub status: SyncStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub results: Vec<SyncResult>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub period: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub summary: StatCounters,
    pub details: Vec<Stat>,
}

/// One leaderboard entry, enriched with the identity fields.
#[derive(Debug, Serialize)]
pub struct TopUser {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub images_processed: i64,
}

#[derive(Debug, Serialize)]
pub struct GlobalReport {
    pub user_count: i64,
    pub global_stats: StatCounters,
    pub top_users: Vec<TopUser>,
}
