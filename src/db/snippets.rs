use sqlx::sqlite::SqlitePool;

/// How many snippets the home page lists.
const LATEST_LIMIT: i64 = 10;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    /// UTC, `YYYY-MM-DD HH:MM:SS`
    pub created: String,
    /// UTC, `YYYY-MM-DD HH:MM:SS`
    pub expires: String,
}

#[derive(Clone)]
pub struct SnippetStore {
    pool: SqlitePool,
}

impl SnippetStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a snippet that expires `expires_days` from now. Returns the ID.
    pub async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO snippets (title, content, expires) VALUES (?, ?, datetime('now', ? || ' days'))",
        )
        .bind(title)
        .bind(content)
        .bind(expires_days)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Get a snippet by ID. Expired snippets are treated as missing.
    pub async fn get(&self, id: i64) -> Result<Option<Snippet>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, title, content, created, expires FROM snippets
             WHERE id = ? AND expires > datetime('now')",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// The most recently created snippets that have not expired, newest first.
    pub async fn latest(&self) -> Result<Vec<Snippet>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, title, content, created, expires FROM snippets
             WHERE expires > datetime('now') ORDER BY id DESC LIMIT ?",
        )
        .bind(LATEST_LIMIT)
        .fetch_all(&self.pool)
        .await
    }

    /// Delete all expired snippets.
    pub async fn delete_expired(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM snippets WHERE expires <= datetime('now')")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
