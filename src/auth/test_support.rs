//! Shared fixtures for the auth unit tests.

use std::sync::Arc;

use super::types::Identity;
use crate::db::Database;
use crate::jwt::JwtConfig;

#[derive(Clone)]
pub struct TestBackend {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub secure_cookies: bool,
}

crate::impl_has_auth_backend!(TestBackend);

impl TestBackend {
    pub async fn new() -> Self {
        Self {
            db: Database::open(":memory:").await.unwrap(),
            jwt: Arc::new(JwtConfig::new(b"test-secret-key-for-testing")),
            secure_cookies: false,
        }
    }

    /// Insert a user row directly, skipping password hashing.
    pub async fn create_user(&self, name: &str) -> Identity {
        let email = format!("{}@example.com", name);
        let result =
            sqlx::query("INSERT INTO users (name, email, hashed_password) VALUES (?, ?, 'x')")
                .bind(name)
                .bind(&email)
                .execute(self.db.pool())
                .await
                .unwrap();

        Identity {
            id: result.last_insert_rowid(),
            name: name.to_string(),
            email,
        }
    }
}
