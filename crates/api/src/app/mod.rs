//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: startup wiring (public key, stores, policy)
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: pipeline rejections and consistent error responses

use std::sync::Arc;

use axum::Router;
use axum::middleware::from_fn_with_state;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware;
use crate::pipeline::Pipeline;

pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// Build the full HTTP router.
///
/// `application` holds the caller's business routes; every one of them is
/// put behind the authorized chain (verify, sync, policy). Its paths must be
/// full paths such as `/api/v1/items/:id`, since policy rules are matched
/// against them.
pub fn build_app(services: AppServices, application: Router) -> Router {
    let authenticated = Arc::new(Pipeline::authenticated(&services));
    let authorized = Arc::new(Pipeline::authorized(&services));
    let cors = middleware::cors_layer(&services.allowed_origins);

    let authenticated_routes = routes::authenticated_router().layer(from_fn_with_state(
        authenticated,
        middleware::pipeline_middleware,
    ));

    let authorized_routes =
        application.layer(from_fn_with_state(authorized, middleware::pipeline_middleware));

    Router::new()
        .merge(routes::public_router())
        .merge(authenticated_routes)
        .merge(authorized_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
