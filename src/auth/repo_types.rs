use serde::Serialize;
use sqlx::FromRow;

/// User record in the database. The hash column is aliased to
/// `password_hash` in queries and is skipped on serialization so it can
/// never leak into a client-facing response.
#[derive(Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}
