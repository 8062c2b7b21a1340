use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Registered client-app user. Identifiers are assigned by the client
/// installation, not by this service.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>, // reserved, no flow sets it from plaintext
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    pub is_active: bool,
}

/// The five usage counters reported by clients. Element-wise addable so the
/// same shape serves as a single day's report and as a window summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct StatCounters {
    #[serde(default)]
    pub images_processed: i64,
    #[serde(default)]
    pub resize_operations: i64,
    #[serde(default)]
    pub bg_removal_operations: i64,
    #[serde(default)]
    pub face_crop_operations: i64,
    #[serde(default)]
    pub process_time: f64,
}

impl StatCounters {
    pub fn add(&mut self, other: &StatCounters) {
        self.images_processed += other.images_processed;
        self.resize_operations += other.resize_operations;
        self.bg_removal_operations += other.bg_removal_operations;
        self.face_crop_operations += other.face_crop_operations;
        self.process_time += other.process_time;
    }
}

/// One user's counters for one calendar day, as reported by one sync batch.
/// `stat_id` is the client-generated idempotency key; distinct ids for the
/// same `(user_id, date)` stay distinct rows.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Stat {
    pub stat_id: String,
    pub user_id: String,
    pub date: String,
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub counters: StatCounters,
    #[serde(with = "time::serde::rfc3339")]
    pub sync_timestamp: OffsetDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_add_is_element_wise() {
        let mut a = StatCounters {
            images_processed: 5,
            resize_operations: 1,
            bg_removal_operations: 0,
            face_crop_operations: 2,
            process_time: 1.5,
        };
        let b = StatCounters {
            images_processed: 7,
            resize_operations: 0,
            bg_removal_operations: 3,
            face_crop_operations: 1,
            process_time: 0.5,
        };
        a.add(&b);
        assert_eq!(a.images_processed, 12);
        assert_eq!(a.resize_operations, 1);
        assert_eq!(a.bg_removal_operations, 3);
        assert_eq!(a.face_crop_operations, 3);
        assert!((a.process_time - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn counters_deserialize_with_missing_fields_as_zero() {
        let c: StatCounters = serde_json::from_str(r#"{"images_processed": 3}"#).unwrap();
        assert_eq!(c.images_processed, 3);
        assert_eq!(c.resize_operations, 0);
        assert!((c.process_time - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn user_serialization_excludes_password_hash() {
        let user = User {
            user_id: "u-1".into(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            full_name: "Alice".into(),
            password_hash: Some("secret-hash".into()),
            created_at: OffsetDateTime::UNIX_EPOCH,
            last_login: None,
            is_active: true,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("alice@example.com"));
    }
}
