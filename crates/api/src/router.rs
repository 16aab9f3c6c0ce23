use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::{sync::Arc, time::Duration};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{auth_handlers, middleware as auth_middleware, user_handlers, AppState};

pub fn router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/health", get(auth_handlers::health))
        .route("/register", post(auth_handlers::register))
        .route("/login", post(auth_handlers::login));

    // Account management (requires a bearer token)
    let user_routes = Router::new()
        .route("/users", get(user_handlers::list_users))
        .route("/users/{id}", delete(user_handlers::delete_user))
        .route("/users/{id}/password", patch(user_handlers::update_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware::require_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
