use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::{Stat, StatCounters, Store, User};

/// Postgres-backed store. Each method is one statement; the row-level
/// atomicity of single statements is the only concurrency guard.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user(&self, user_id: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, full_name, password_hash,
                   created_at, last_login, is_active
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_identity(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
    ) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, full_name, password_hash,
                   created_at, last_login, is_active
            FROM users
            WHERE user_id = $1 OR username = $2 OR email = $3
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO users (user_id, username, email, full_name, password_hash,
                               created_at, last_login, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.last_login)
        .bind(user.is_active)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_user_profile(
        &self,
        user_id: &str,
        username: &str,
        email: &str,
        full_name: &str,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET username = $2, email = $3, full_name = $4
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(username)
        .bind(email)
        .bind(full_name)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_last_login(&self, user_id: &str, ts: OffsetDateTime) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET last_login = $2 WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(ts)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users(&self) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, full_name, password_hash,
                   created_at, last_login, is_active
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn count_users(&self) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn find_stat(&self, stat_id: &str) -> anyhow::Result<Option<Stat>> {
        let stat = sqlx::query_as::<_, Stat>(
            r#"
            SELECT stat_id, user_id, date, images_processed, resize_operations,
                   bg_removal_operations, face_crop_operations, process_time,
                   sync_timestamp
            FROM stats
            WHERE stat_id = $1
            "#,
        )
        .bind(stat_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stat)
    }

    async fn insert_stat(&self, stat: &Stat) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO stats (stat_id, user_id, date, images_processed,
                               resize_operations, bg_removal_operations,
                               face_crop_operations, process_time, sync_timestamp)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&stat.stat_id)
        .bind(&stat.user_id)
        .bind(&stat.date)
        .bind(stat.counters.images_processed)
        .bind(stat.counters.resize_operations)
        .bind(stat.counters.bg_removal_operations)
        .bind(stat.counters.face_crop_operations)
        .bind(stat.counters.process_time)
        .bind(stat.sync_timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_stat_counters(
        &self,
        stat_id: &str,
        counters: &StatCounters,
        synced_at: OffsetDateTime,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE stats
            SET images_processed = $2, resize_operations = $3,
                bg_removal_operations = $4, face_crop_operations = $5,
                process_time = $6, sync_timestamp = $7
            WHERE stat_id = $1
            "#,
        )
        .bind(stat_id)
        .bind(counters.images_processed)
        .bind(counters.resize_operations)
        .bind(counters.bg_removal_operations)
        .bind(counters.face_crop_operations)
        .bind(counters.process_time)
        .bind(synced_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn stats_for_user(&self, user_id: &str) -> anyhow::Result<Vec<Stat>> {
        let stats = sqlx::query_as::<_, Stat>(
            r#"
            SELECT stat_id, user_id, date, images_processed, resize_operations,
                   bg_removal_operations, face_crop_operations, process_time,
                   sync_timestamp
            FROM stats
            WHERE user_id = $1
            ORDER BY date
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(stats)
    }

    async fn total_counters(&self) -> anyhow::Result<StatCounters> {
        // SUM(bigint) widens to NUMERIC in Postgres, so cast back.
        let totals = sqlx::query_as::<_, StatCounters>(
            r#"
            SELECT COALESCE(SUM(images_processed), 0)::BIGINT AS images_processed,
                   COALESCE(SUM(resize_operations), 0)::BIGINT AS resize_operations,
                   COALESCE(SUM(bg_removal_operations), 0)::BIGINT AS bg_removal_operations,
                   COALESCE(SUM(face_crop_operations), 0)::BIGINT AS face_crop_operations,
                   COALESCE(SUM(process_time), 0)::DOUBLE PRECISION AS process_time
            FROM stats
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(totals)
    }

    async fn top_users_by_images(&self, limit: i64) -> anyhow::Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT user_id, SUM(images_processed)::BIGINT AS total
            FROM stats
            GROUP BY user_id
            ORDER BY total DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
