use async_trait::async_trait;
use time::OffsetDateTime;

pub mod memory;
pub mod postgres;
mod types;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use types::{Stat, StatCounters, User};

/// Persistence boundary for the identity store and the usage ledger.
///
/// Every method is a single durable statement; there is no transaction
/// spanning calls. Concurrent writers racing on the same `stat_id` or
/// `user_id` are resolved by the backing store's atomic single-row write,
/// last arrival wins.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user(&self, user_id: &str) -> anyhow::Result<Option<User>>;

    /// Find a user matching ANY of the three identity fields. Used to detect
    /// both re-registration (same `user_id`) and identity collisions
    /// (same `username`/`email` under a different `user_id`).
    async fn find_user_by_identity(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
    ) -> anyhow::Result<Option<User>>;

    async fn insert_user(&self, user: &User) -> anyhow::Result<()>;

    async fn update_user_profile(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
        full_name: &str,
    ) -> anyhow::Result<()>;

    /// Returns false when no such user exists.
    async fn set_last_login(&self, user_id: &str, ts: OffsetDateTime) -> anyhow::Result<bool>;

    async fn list_users(&self) -> anyhow::Result<Vec<User>>;

    async fn count_users(&self) -> anyhow::Result<i64>;

    async fn find_stat(&self, stat_id: &str) -> anyhow::Result<Option<Stat>>;

    async fn insert_stat(&self, stat: &Stat) -> anyhow::Result<()>;

    /// Replace the five counters and refresh `sync_timestamp`; `date` and
    /// `user_id` on the existing row are left untouched.
    async fn update_stat_counters(
        &self,
        stat_id: &str,
        counters: &StatCounters,
        synced_at: OffsetDateTime,
    ) -> anyhow::Result<()>;

    async fn stats_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Stat>>;

    /// Element-wise sum over every ledger row; zeros when the ledger is empty.
    async fn total_counters(&self) -> anyhow::Result<StatCounters>;

    /// User ids ranked by total `images_processed`, descending. Tie order is
    /// not deterministic.
    async fn top_users_by_images(&self, limit: i64) -> anyhow::Result<Vec<(String, i64)>>;
}
