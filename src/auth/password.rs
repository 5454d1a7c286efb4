use bcrypt::DEFAULT_COST;

use crate::utils::error::{AppError, AppResult};

/// bcrypt is CPU-bound, so hashing runs on the blocking pool.
pub async fn hash_password(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, DEFAULT_COST))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {e}")))?
        .map_err(AppError::from)
}

pub async fn verify_password(password: String, password_hash: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("verify task failed: {e}")))?
        .map_err(AppError::from)
}
