//! Refresh token storage.
//!
//! Refresh tokens are opaque random strings. Each user has at most one live
//! token; issuing a new one replaces the old row in a single statement.

use sqlx::sqlite::SqlitePool;
use thiserror::Error;

use super::UserStore;
use crate::auth::Identity;

#[derive(Debug, Error)]
pub enum RefreshTokenError {
    /// No token with that value, or its owner no longer exists
    #[error("no matching refresh token")]
    NoRecord,
    /// The token has expired; the owner's tokens were removed
    #[error("refresh token expired")]
    Expired,
    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(sqlx::FromRow)]
struct TokenRow {
    user_id: i64,
    expired: bool,
}

#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a refresh token for a user, valid for `ttl_days`. Any token the
    /// user already holds is replaced.
    pub async fn insert(
        &self,
        value: &str,
        ttl_days: i64,
        user_id: i64,
    ) -> Result<(), RefreshTokenError> {
        sqlx::query(
            "INSERT OR REPLACE INTO refresh_tokens (value, user_id, expires)
             VALUES (?, ?, datetime('now', ? || ' days'))",
        )
        .bind(value)
        .bind(user_id)
        .bind(ttl_days)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Look up a refresh token and return its owner's identity.
    ///
    /// An expired token is deleted together with every other token of the
    /// same user before `Expired` is returned.
    pub async fn check_and_resolve(&self, value: &str) -> Result<Identity, RefreshTokenError> {
        let row: Option<TokenRow> = sqlx::query_as(
            "SELECT user_id, expires <= datetime('now') AS expired FROM refresh_tokens WHERE value = ?",
        )
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        let row = row.ok_or(RefreshTokenError::NoRecord)?;

        if row.expired {
            self.delete(row.user_id).await?;
            return Err(RefreshTokenError::Expired);
        }

        UserStore::new(self.pool.clone())
            .get_by_id(row.user_id)
            .await?
            .ok_or(RefreshTokenError::NoRecord)
    }

    /// Delete all refresh tokens of a user. Returns how many were removed.
    pub async fn delete(&self, user_id: i64) -> Result<u64, RefreshTokenError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete all expired refresh tokens.
    pub async fn delete_expired(&self) -> Result<u64, RefreshTokenError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires <= datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
