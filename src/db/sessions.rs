//! Login sessions backing the `cookieToken` cookie.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::User;
use super::{format_timestamp, now, RepositoryError};
use crate::crypto::{generate_token, hash_token};

/// Repository for session operations.
pub struct SessionRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionRepository<'a> {
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a session for `user_id` and return the raw token.
    ///
    /// Only the token's hash is stored.
    pub async fn create(&self, user_id: &str, ttl: chrono::Duration) -> Result<String, RepositoryError> {
        let created_at = chrono::Utc::now();
        let expires_at = created_at
            .checked_add_signed(ttl)
            .ok_or(RepositoryError::InvalidTtl)?;
        let token = generate_token();

        sqlx::query(
            "INSERT INTO sessions (id, user_id, token_hash, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(hash_token(&token))
        .bind(format_timestamp(expires_at))
        .bind(format_timestamp(created_at))
        .execute(self.pool)
        .await?;

        Ok(token)
    }

    /// The user owning an unexpired session, if any.
    pub async fn resolve(&self, token: &str) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM users u
            JOIN sessions s ON s.user_id = u.id
            WHERE s.token_hash = ? AND s.expires_at > ?
            "#,
        )
        .bind(hash_token(token))
        .bind(now())
        .fetch_optional(self.pool)
        .await?;
        Ok(user)
    }

    /// Revoke a session. Returns whether one existed.
    pub async fn revoke(&self, token: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove expired sessions, returning how many were dropped.
    pub async fn purge_expired(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory;
    use crate::db::users::tests::john_doe;
    use crate::db::UserRepository;

    #[tokio::test]
    async fn test_create_resolve_revoke() {
        let pool = init_memory().await.unwrap();
        let user = UserRepository::new(&pool).create_with_cart(&john_doe()).await.unwrap();
        let repo = SessionRepository::new(&pool);

        let token = repo.create(&user.id, chrono::Duration::hours(1)).await.unwrap();
        let (user_id, token_hash): (String, String) =
            sqlx::query_as("SELECT user_id, token_hash FROM sessions")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(user_id, user.id);
        assert_eq!(token_hash, hash_token(&token));
        assert_ne!(token_hash, token);

        let resolved = repo.resolve(&token).await.unwrap().unwrap();
        assert_eq!(resolved.email, "jdoe@gmail.com");

        assert!(repo.revoke(&token).await.unwrap());
        assert!(!repo.revoke(&token).await.unwrap());
        assert!(repo.resolve(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_sessions_do_not_resolve_and_get_purged() {
        let pool = init_memory().await.unwrap();
        let user = UserRepository::new(&pool).create_with_cart(&john_doe()).await.unwrap();
        let repo = SessionRepository::new(&pool);

        let expired = repo.create(&user.id, chrono::Duration::seconds(-5)).await.unwrap();
        let live = repo.create(&user.id, chrono::Duration::hours(1)).await.unwrap();

        assert!(repo.resolve(&expired).await.unwrap().is_none());
        assert_eq!(repo.purge_expired().await.unwrap(), 1);
        assert!(repo.resolve(&live).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let pool = init_memory().await.unwrap();
        let repo = SessionRepository::new(&pool);
        assert!(repo.resolve("deadbeef").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_sessions_removed_with_user() {
        let pool = init_memory().await.unwrap();
        let users = UserRepository::new(&pool);
        let user = users.create_with_cart(&john_doe()).await.unwrap();
        let repo = SessionRepository::new(&pool);
        let token = repo.create(&user.id, chrono::Duration::hours(1)).await.unwrap();

        users.delete(&user.id).await.unwrap();
        assert!(repo.resolve(&token).await.unwrap().is_none());
        let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(left, 0);
    }

    #[tokio::test]
    async fn test_out_of_range_ttl_is_rejected() {
        let pool = init_memory().await.unwrap();
        let user = UserRepository::new(&pool).create_with_cart(&john_doe()).await.unwrap();
        let repo = SessionRepository::new(&pool);

        assert!(matches!(
            repo.create(&user.id, chrono::Duration::MAX).await,
            Err(RepositoryError::InvalidTtl)
        ));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
