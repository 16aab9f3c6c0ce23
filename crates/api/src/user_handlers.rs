use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use storage::Account;
use tracing::info;
use uuid::Uuid;

use crate::auth_handlers::json_body;
use crate::middleware::AuthUser;
use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub new_password: String,
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("invalid user ID".to_string()))
}

/// GET /users - List all accounts (password hashes are never serialized)
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AuthUser(_identity): AuthUser,
) -> Result<Json<Vec<Account>>, ApiError> {
    let accounts = state.accounts.list().await?;
    Ok(Json(accounts))
}

/// DELETE /users/{id} - Delete an account
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    info!(actor = %identity.id, user_id = %id, "Delete requested");
    state.accounts.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /users/{id}/password - Replace an account's password
pub async fn update_password(
    State(state): State<Arc<AppState>>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    body: Result<Json<UpdatePasswordRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let payload = json_body(body)?;
    if payload.new_password.is_empty() {
        return Err(ApiError::Validation("new_password is required".to_string()));
    }

    info!(actor = %identity.id, user_id = %id, "Password change requested");
    state.accounts.update_password(id, &payload.new_password).await?;
    Ok(StatusCode::OK)
}
