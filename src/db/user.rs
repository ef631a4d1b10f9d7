//! User accounts with bcrypt-hashed passwords.

use sqlx::sqlite::SqlitePool;
use thiserror::Error;

use crate::auth::Identity;

/// bcrypt cost factor.
const BCRYPT_COST: u32 = 12;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("invalid credentials")]
    WrongCredentials,
    #[error("duplicate email")]
    DuplicateEmail,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: i64,
    name: String,
    email: String,
}

impl From<IdentityRow> for Identity {
    fn from(row: IdentityRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct CredentialsRow {
    id: i64,
    name: String,
    email: String,
    hashed_password: String,
}

#[derive(Clone)]
pub struct UserStore {
    pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user. Returns the new user ID.
    pub async fn insert(&self, name: &str, email: &str, password: &str) -> Result<i64, UserError> {
        let password = password.to_owned();
        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST))
            .await??;

        let result =
            sqlx::query("INSERT INTO users (name, email, hashed_password) VALUES (?, ?, ?)")
                .bind(name)
                .bind(email)
                .bind(&hashed)
                .execute(&self.pool)
                .await
                .map_err(|e| match e {
                    sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                        UserError::DuplicateEmail
                    }
                    e => UserError::Storage(e),
                })?;

        Ok(result.last_insert_rowid())
    }

    /// Check an email/password pair and return the matching identity.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, UserError> {
        let row: Option<CredentialsRow> =
            sqlx::query_as("SELECT id, name, email, hashed_password FROM users WHERE email = ?")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Err(UserError::WrongCredentials);
        };

        let password = password.to_owned();
        let hashed = row.hashed_password;
        let matches =
            tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed)).await??;

        if !matches {
            return Err(UserError::WrongCredentials);
        }

        Ok(Identity {
            id: row.id,
            name: row.name,
            email: row.email,
        })
    }

    /// Get a user's identity by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Identity>, sqlx::Error> {
        let row: Option<IdentityRow> =
            sqlx::query_as("SELECT id, name, email FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Identity::from))
    }
}
