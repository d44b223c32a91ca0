use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::accounts::{hash_password, verify_password, Account};
use crate::server::error::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AccountIn {
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub contact_number: Option<String>,
    #[serde(default)]
    pub avatar_img: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct AccountOut {
    pub id: i64,
    pub name: String,
    pub contact_number: Option<String>,
    pub avatar_img: Option<String>,
}

impl From<Account> for AccountOut {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            name: a.name,
            contact_number: a.contact_number,
            avatar_img: a.avatar_img,
        }
    }
}

/// Trims `name` and rejects empty credentials.
pub(crate) fn validate_credentials<'a>(name: &'a str, password: &str) -> Result<&'a str, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::Unprocessable("name must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(ApiError::Unprocessable("password must not be empty".to_string()));
    }
    Ok(name)
}

/// Argon2 runs on the blocking pool, off the runtime workers.
pub(crate) async fn hash_blocking(password: String) -> Result<String, ApiError> {
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| anyhow::anyhow!("password hashing task failed: {e}"))??;
    Ok(hash)
}

pub(crate) async fn verify_blocking(password: String, hash: String) -> Result<bool, ApiError> {
    let ok = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| anyhow::anyhow!("password check task failed: {e}"))?;
    Ok(ok)
}

pub async fn create_account(
    State(state): State<AppState>,
    body: Result<Json<AccountIn>, JsonRejection>,
) -> Result<Json<AccountOut>, ApiError> {
    let Json(body) = body?;
    let name = validate_credentials(&body.name, &body.password)?.to_string();
    let hash = hash_blocking(body.password).await?;
    let account = state.accounts.create(&name, &hash, body.contact_number, body.avatar_img)?;
    tracing::info!(id = account.id, "account created");
    Ok(Json(account.into()))
}

pub async fn fetch_account(State(state): State<AppState>, Path(name): Path<String>) -> Json<Option<AccountOut>> {
    Json(state.accounts.by_name(&name).map(AccountOut::from))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use super::*;

    #[tokio::test]
    async fn hashing_leaves_the_runtime_free() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let ticker = tokio::spawn({
            let ticks = ticks.clone();
            async move {
                loop {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                    ticks.fetch_add(1, Ordering::SeqCst);
                }
            }
        });

        let hash = hash_blocking("pw".to_string()).await.unwrap();
        assert!(ticks.load(Ordering::SeqCst) > 0);
        ticker.abort();

        assert!(verify_blocking("pw".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_blocking("nope".to_string(), hash).await.unwrap());
    }
}
