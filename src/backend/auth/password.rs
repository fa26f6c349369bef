//! bcrypt hashing, run on the blocking pool so request tasks stay responsive.

use crate::backend::error::BackendError;

pub async fn hash_password(password: String, cost: u32) -> Result<String, BackendError> {
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
    Ok(hash)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, BackendError> {
    let valid = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(valid)
}
