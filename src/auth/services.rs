use tokio::task;
use tracing::{info, warn};

use crate::auth::dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest};
use crate::auth::jwt::JwtKeys;
use crate::auth::password;
use crate::auth::repo::UserStore;
use crate::db::StoreError;
use crate::error::ApiError;

/// Registers a new identity: validate, hash, persist, issue a token.
///
/// Hashing is CPU-bound and runs on the blocking pool so it cannot stall
/// other in-flight requests. A duplicate name loses the race at the store's
/// uniqueness constraint and comes back as a conflict, not a crash.
pub async fn register(
    users: &dyn UserStore,
    keys: &JwtKeys,
    req: RegisterRequest,
) -> Result<AuthResponse, ApiError> {
    if req.name.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Name and password are required".into(),
        ));
    }

    let plain = req.password;
    let hash = task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(ApiError::internal)?
        .map_err(ApiError::internal)?;

    let user = users.insert(&req.name, &hash).await.map_err(|e| match e {
        StoreError::Duplicate { .. } => {
            warn!(name = %req.name, "registration for taken name");
            ApiError::Conflict("Name already registered".into())
        }
        other => ApiError::internal(other),
    })?;

    let token = keys.sign(user.id, &user.name).map_err(ApiError::internal)?;

    info!(user_id = user.id, name = %user.name, "user registered");
    Ok(AuthResponse {
        message: "User registered successfully".into(),
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
        },
    })
}

/// Logs an identity in: validate, fetch, verify, issue a token.
///
/// Unknown name and wrong password produce the same error so callers cannot
/// probe which names are registered.
pub async fn login(
    users: &dyn UserStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<AuthResponse, ApiError> {
    if req.name.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Name and password are required".into(),
        ));
    }

    let user = users
        .find_by_name(&req.name)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| {
            warn!(name = %req.name, "login for unknown name");
            ApiError::Auth
        })?;

    let plain = req.password;
    let stored = user.password_hash.clone();
    let matches = task::spawn_blocking(move || password::verify_password(&plain, &stored))
        .await
        .map_err(ApiError::internal)?;

    if !matches {
        warn!(user_id = user.id, "login with invalid password");
        return Err(ApiError::Auth);
    }

    let token = keys.sign(user.id, &user.name).map_err(ApiError::internal)?;

    info!(user_id = user.id, name = %user.name, "user logged in");
    Ok(AuthResponse {
        message: "Login successful".into(),
        token,
        user: PublicUser {
            id: user.id,
            name: user.name,
        },
    })
}
