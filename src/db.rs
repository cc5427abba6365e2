use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::config::AppConfig;

/// Postgres error code for `unique_violation`.
const PG_UNIQUE_VIOLATION: &str = "23505";

pub async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(config.store_timeout())
        .connect(&config.database_url)
        .await
        .context("connect to database")?;
    Ok(pool)
}

/// Failure modes of the persistence collaborator. Services map these onto the
/// client-facing error taxonomy; none of them crash a request.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. duplicate user name).
    #[error("unique constraint {constraint} violated")]
    Duplicate { constraint: String },

    /// The statement matched no row.
    #[error("no matching row")]
    NotFound,

    /// The store did not answer within the configured bound.
    #[error("store did not respond within {0:?}")]
    Timeout(Duration),

    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(PG_UNIQUE_VIOLATION) {
                return StoreError::Duplicate {
                    constraint: db.constraint().unwrap_or("unknown").to_owned(),
                };
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return StoreError::NotFound;
        }
        StoreError::Query(err)
    }
}

/// Awaits a store operation under the configured time bound. A request whose
/// query never answers gets a `Timeout` instead of hanging forever.
pub(crate) async fn bounded<T>(
    limit: Duration,
    op: impl Future<Output = Result<T, sqlx::Error>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(limit, op).await {
        Ok(res) => res.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn bounded_times_out_on_silent_store() {
        let limit = Duration::from_millis(10);
        let err = bounded(limit, std::future::pending::<Result<(), sqlx::Error>>())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Timeout(d) if d == limit));
    }

    #[tokio::test]
    async fn bounded_passes_results_through() {
        let limit = Duration::from_secs(1);
        let value = bounded(limit, async { Ok::<_, sqlx::Error>(7_i64) })
            .await
            .expect("future resolves in time");
        assert_eq!(value, 7);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::NotFound));
    }
}
