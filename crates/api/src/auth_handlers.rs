use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Unwrap a JSON body, mapping every rejection to a 400
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(payload)| payload).map_err(|e| {
        debug!(reason = %e.body_text(), "Rejected request body");
        ApiError::Validation("invalid request body".to_string())
    })
}

/// Registration additionally requires a non-empty email and password
fn new_credentials(body: Result<Json<CredentialsRequest>, JsonRejection>) -> Result<CredentialsRequest, ApiError> {
    let payload = json_body(body)?;
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("email and password are required".to_string()));
    }
    Ok(payload)
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// POST /register - Create an account
pub async fn register(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let payload = new_credentials(body)?;
    state.credentials.register(&payload.email, &payload.password).await?;
    Ok(StatusCode::CREATED)
}

/// POST /login - Exchange credentials for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, ApiError> {
    let payload = json_body(body)?;
    let token = state.credentials.login(&payload.email, &payload.password).await?;
    Ok(Json(TokenResponse { token }))
}
