use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::accounts::Account;
use crate::server::accounts::{hash_blocking, validate_credentials, verify_blocking};
use crate::server::error::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthRes {
    pub token: String,
    pub user_id: i64,
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContactBody {
    pub contact_number: Option<String>,
}

fn issue(state: &AppState, account: Account) -> Result<Json<AuthRes>, ApiError> {
    let tokens = state
        .tokens
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("auth disabled".to_string()))?;
    Ok(Json(AuthRes {
        token: tokens.issue(account.id)?,
        user_id: account.id,
        name: account.name,
    }))
}

pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthRes>, ApiError> {
    let Json(body) = body?;
    let name = validate_credentials(&body.name, &body.password)?.to_string();
    let hash = hash_blocking(body.password).await?;
    let account = state.accounts.create(&name, &hash, None, None)?;
    issue(&state, account)
}

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthRes>, ApiError> {
    let Json(body) = body?;
    let invalid = || ApiError::Unauthorized("invalid credentials".to_string());
    let account = state.accounts.by_name(body.name.trim()).ok_or_else(invalid)?;
    if verify_blocking(body.password, account.password_hash.clone()).await? {
        issue(&state, account)
    } else {
        Err(invalid())
    }
}

/// Account resolved from an `Authorization: Bearer <token>` header.
#[derive(Debug)]
pub struct CurrentUser(pub Account);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let tokens = state
            .tokens
            .as_ref()
            .ok_or_else(|| ApiError::Unauthorized("auth disabled".to_string()))?;
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;
        let user_id = tokens.verify(token)?;
        let account = state
            .accounts
            .by_id(user_id)
            .ok_or_else(|| ApiError::Unauthorized("user not found".to_string()))?;
        Ok(CurrentUser(account))
    }
}

pub async fn get_contact(CurrentUser(user): CurrentUser) -> Json<ContactBody> {
    Json(ContactBody { contact_number: user.contact_number })
}

pub async fn set_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    body: Result<Json<ContactBody>, JsonRejection>,
) -> Result<Json<ContactBody>, ApiError> {
    let Json(body) = body?;
    state.accounts.set_contact(user.id, body.contact_number.clone())?;
    Ok(Json(body))
}
