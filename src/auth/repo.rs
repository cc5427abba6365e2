use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::User;
use crate::db::{bounded, StoreError};

/// Persistence operations for the credential store, kept abstract so the
/// auth service only sees an async result-or-error operation.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new user. A duplicate `name` surfaces as
    /// `StoreError::Duplicate` via the store's uniqueness constraint.
    async fn insert(&self, name: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Finds a user by exact `name` match.
    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;
}

/// sqlx-backed store over the `users` table.
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, name: &str, password_hash: &str) -> Result<User, StoreError> {
        let user = bounded(
            self.timeout,
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (name, password)
                VALUES ($1, $2)
                RETURNING id, name, password AS password_hash
                "#,
            )
            .bind(name)
            .bind(password_hash)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(user)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let user = bounded(
            self.timeout,
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, name, password AS password_hash
                FROM users
                WHERE name = $1
                "#,
            )
            .bind(name)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(user)
    }
}
