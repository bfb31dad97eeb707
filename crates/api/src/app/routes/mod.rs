use axum::{
    Router,
    routing::{get, post},
};

pub mod auth;
pub mod system;

/// Routes that need no token.
pub fn public_router() -> Router {
    Router::new()
        .route("/api/v1/health", get(system::health))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
}

/// Routes behind the authenticated (verify + sync) chain.
pub fn authenticated_router() -> Router {
    Router::new().route("/api/v1/auth/me", get(auth::me))
}
