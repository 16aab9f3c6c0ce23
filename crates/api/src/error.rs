use auth::{AuthError, TokenError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use storage::StoreError;
use tracing::error;

use crate::middleware::INVALID_TOKEN;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Errors a handler can return, each mapped to a status and a safe message.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed body or path parameter
    Validation(String),
    /// Missing or bad token, or bad login credentials
    Authentication(&'static str),
    /// Store lookup miss on an account-management path
    NotFound,
    /// Email already registered
    Conflict,
    /// Store or hashing failure; details are logged, not returned
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict => StatusCode::BAD_REQUEST,
            Self::Authentication(_) => StatusCode::UNAUTHORIZED,
            // Account-management misses keep the coarse 500 mapping.
            Self::NotFound | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::Authentication(msg) => msg.to_string(),
            Self::NotFound => "account not found".to_string(),
            Self::Conflict => "email already registered".to_string(),
            Self::Internal => "internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = ErrorResponse {
            error: self.message(),
        };
        (self.status(), Json(error)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateEmail => Self::Conflict,
            StoreError::NotFound => Self::NotFound,
            StoreError::Backend(_) => {
                error!(error = %e, "Store failure");
                Self::Internal
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => Self::Authentication("invalid credentials"),
            AuthError::Store(store) => store.into(),
            AuthError::HashingError(_)
            | AuthError::MalformedHash
            | AuthError::TokenGenerationError(_) => {
                error!(error = %e, "Auth failure");
                Self::Internal
            }
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        // The kind is never exposed to the caller.
        Self::Authentication(INVALID_TOKEN)
    }
}
