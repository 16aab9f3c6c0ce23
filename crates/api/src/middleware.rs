use auth::AuthenticatedIdentity;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, Extensions, HeaderMap},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error};

use crate::{ApiError, AppState};

pub const MISSING_HEADER: &str = "Authorization header required";
pub const INVALID_HEADER: &str = "Invalid authorization header";
pub const INVALID_TOKEN: &str = "Invalid token";

/// Extract the bearer token from the Authorization header
///
/// The header must be exactly two space-separated parts, the first being
/// `bearer` in any case.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .filter(|v| !v.is_empty())
        .ok_or(ApiError::Authentication(MISSING_HEADER))?
        .to_str()
        .map_err(|_| ApiError::Authentication(INVALID_HEADER))?;

    let mut parts = value.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None)
            if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() =>
        {
            Ok(token)
        }
        _ => Err(ApiError::Authentication(INVALID_HEADER)),
    }
}

/// Middleware to require authentication
///
/// On success the verified identity is stored in the request extensions for
/// handlers to pick up through `AuthUser`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(request.headers())?;

    let identity = state.tokens.verify(token, Utc::now()).map_err(|e| {
        debug!(reason = %e, "Rejected bearer token");
        ApiError::from(e)
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Identity attached by `require_auth`, if any
pub fn identity_from_extensions(extensions: &Extensions) -> Option<&AuthenticatedIdentity> {
    extensions.get::<AuthenticatedIdentity>()
}

/// Extractor for the authenticated identity
/// Use this in handlers that are protected by auth middleware
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedIdentity);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_extensions(&parts.extensions)
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                // Only reachable if a protected route was mounted without require_auth.
                error!(path = %parts.uri.path(), "No identity on authenticated route");
                ApiError::Internal
            })
    }
}
