use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::bail;
use async_trait::async_trait;
use time::OffsetDateTime;

use super::{Stat, StatCounters, Store, User};

/// In-memory store used by `AppState::fake()` and the tests. Mirrors the
/// uniqueness rules the Postgres schema enforces with indexes.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    stats: Vec<Stat>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn find_user_by_identity(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.user_id == user_id || u.username == username || u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| {
            u.user_id == user.user_id || u.username == user.username || u.email == user.email
        }) {
            bail!("unique constraint violated on users");
        }
        inner.users.push(user.clone());
        Ok(())
    }

    async fn update_user_profile(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
        full_name: &str,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.user_id == user_id) {
            user.username = username.to_string();
            user.email = email.to_string();
            user.full_name = full_name.to_string();
        }
        Ok(())
    }

    async fn set_last_login(&self, user_id: &str, ts: OffsetDateTime) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.iter_mut().find(|u| u.user_id == user_id) {
            Some(user) => {
                user.last_login = Some(ts);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.clone())
    }

    async fn count_users(&self) -> anyhow::Result<i64> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.len() as i64)
    }

    async fn find_stat(&self, stat_id: &str) -> anyhow::Result<Option<Stat>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.stats.iter().find(|s| s.stat_id == stat_id).cloned())
    }

    async fn insert_stat(&self, stat: &Stat) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if inner.stats.iter().any(|s| s.stat_id == stat.stat_id) {
            bail!("unique constraint violated on stats");
        }
        inner.stats.push(stat.clone());
        Ok(())
    }

    async fn update_stat_counters(
        &self,
        stat_id: &str,
        counters: &StatCounters,
        synced_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(stat) = inner.stats.iter_mut().find(|s| s.stat_id == stat_id) {
            stat.counters = *counters;
            stat.sync_timestamp = synced_at;
        }
        Ok(())
    }

    async fn stats_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Stat>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .stats
            .iter()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn total_counters(&self) -> anyhow::Result<StatCounters> {
        let inner = self.inner.lock().unwrap();
        let mut totals = StatCounters::default();
        for stat in &inner.stats {
            totals.add(&stat.counters);
        }
        Ok(totals)
    }

    async fn top_users_by_images(&self, limit: i64) -> anyhow::Result<Vec<(String, i64)>> {
        let inner = self.inner.lock().unwrap();
        let mut totals: HashMap<String, i64> = HashMap::new();
        for stat in &inner.stats {
            *totals.entry(stat.user_id.clone()).or_default() += stat.counters.images_processed;
        }
        let mut ranked: Vec<(String, i64)> = totals.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked.truncate(limit as usize);
        Ok(ranked)
    }
}
