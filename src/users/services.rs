use time::OffsetDateTime;

use crate::error::ApiError;
use crate::store::{Store, User};

use super::dto::RegisterRequest;

#[derive(Debug)]
pub enum RegisterOutcome {
    Created(User),
    Updated(User),
}

/// Create a user, or overwrite the profile of an already-known `user_id`.
/// A `username`/`email` held by a different identity is a conflict and
/// nothing is written.
pub async fn register_or_update(
    store: &dyn Store,
    req: RegisterRequest,
) -> Result<RegisterOutcome, ApiError> {
    let existing = store
        .find_user_by_identity(&req.user_id, &req.username, &req.email)
        .await?;

    match existing {
        Some(user) if user.user_id == req.user_id => {
            store
                .update_user_profile(&req.user_id, &req.username, &req.email, &req.full_name)
                .await?;
            Ok(RegisterOutcome::Updated(User {
                username: req.username,
                email: req.email,
                full_name: req.full_name,
                ..user
            }))
        }
        Some(_) => Err(ApiError::Conflict(
            "Username or email already registered to another user".into(),
        )),
        None => {
            let user = User {
                user_id: req.user_id,
                username: req.username,
                email: req.email,
                full_name: req.full_name,
                password_hash: None,
                created_at: req.created_at.unwrap_or_else(OffsetDateTime::now_utc),
                last_login: None,
                is_active: true,
            };
            store.insert_user(&user).await?;
            Ok(RegisterOutcome::Created(user))
        }
    }
}

/// Stamp `last_login`, defaulting to server time when the client sends none.
pub async fn record_login(
    store: &dyn Store,
    user_id: &str,
    timestamp: Option<OffsetDateTime>,
) -> Result<OffsetDateTime, ApiError> {
    let ts = timestamp.unwrap_or_else(OffsetDateTime::now_utc);
    if store.set_last_login(user_id, ts).await? {
        Ok(ts)
    } else {
        Err(ApiError::NotFound("User not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn request(user_id: &str, username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            user_id: user_id.into(),
            username: username.into(),
            email: email.into(),
            full_name: format!("{username} full"),
            created_at: None,
        }
    }

    #[tokio::test]
    async fn register_creates_then_updates_same_user_id() {
        let store = MemoryStore::new();

        let outcome = register_or_update(&store, request("u-1", "alice", "a@example.com"))
            .await
            .unwrap();
        assert!(matches!(outcome, RegisterOutcome::Created(_)));

        let outcome = register_or_update(&store, request("u-1", "alice2", "a2@example.com"))
            .await
            .unwrap();
        let RegisterOutcome::Updated(user) = outcome else {
            panic!("expected update");
        };
        assert_eq!(user.username, "alice2");
        assert_eq!(user.email, "a2@example.com");

        // Still one user, with the overwritten profile persisted.
        let users = store.list_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].username, "alice2");
    }

    #[tokio::test]
    async fn register_conflicts_on_username_held_by_other_identity() {
        let store = MemoryStore::new();
        register_or_update(&store, request("u-a", "x", "a@example.com"))
            .await
            .unwrap();

        let err = register_or_update(&store, request("u-b", "x", "b@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let named_x: Vec<_> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .filter(|u| u.username == "x")
            .collect();
        assert_eq!(named_x.len(), 1);
        assert_eq!(named_x[0].user_id, "u-a");
    }

    #[tokio::test]
    async fn register_defaults_created_at_when_absent() {
        let store = MemoryStore::new();
        let before = OffsetDateTime::now_utc();
        let outcome = register_or_update(&store, request("u-1", "alice", "a@example.com"))
            .await
            .unwrap();
        let RegisterOutcome::Created(user) = outcome else {
            panic!("expected create");
        };
        assert!(user.created_at >= before);
    }

    #[tokio::test]
    async fn record_login_sets_timestamp_or_fails_for_unknown_user() {
        let store = MemoryStore::new();
        register_or_update(&store, request("u-1", "alice", "a@example.com"))
            .await
            .unwrap();

        let ts = OffsetDateTime::UNIX_EPOCH;
        let recorded = record_login(&store, "u-1", Some(ts)).await.unwrap();
        assert_eq!(recorded, ts);
        let user = store.find_user("u-1").await.unwrap().unwrap();
        assert_eq!(user.last_login, Some(ts));

        let err = record_login(&store, "ghost", None).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
