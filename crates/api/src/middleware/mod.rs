//! axum adapters around the authorization [`Pipeline`](crate::pipeline::Pipeline).

mod cors;

use std::sync::Arc;

use axum::{
    extract::{OriginalUri, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{Instrument, info_span};

use crate::pipeline::{Pipeline, RequestHead};

pub use cors::cors_layer;

/// Run `pipeline` over the request head. On success the
/// [`RequestIdentity`](crate::context::RequestIdentity) is inserted as a
/// request extension and the handler runs.
pub async fn pipeline_middleware(
    State(pipeline): State<Arc<Pipeline>>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let head = request_head(&req);
    let span = info_span!("authz", method = %head.method, path = %head.path);

    match pipeline.run(&head).instrument(span).await {
        Ok(identity) => {
            req.extensions_mut().insert(identity);
            next.run(req).await
        }
        Err(rejection) => {
            rejection.log(head.method.as_str(), &head.path);
            rejection.into_response()
        }
    }
}

fn request_head(req: &axum::http::Request<axum::body::Body>) -> RequestHead {
    // nested routers strip their prefix from `uri()`; policy is written
    // against the full path
    let path = req
        .extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    RequestHead {
        method: req.method().clone(),
        path,
        authorization: req.headers().get(AUTHORIZATION).cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, Request, Uri};

    #[test]
    fn head_prefers_original_uri() {
        let mut req = Request::builder()
            .method(Method::DELETE)
            .uri("/42")
            .header(AUTHORIZATION, "Bearer abc")
            .body(axum::body::Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(OriginalUri(Uri::from_static("/api/v1/items/42")));

        let head = request_head(&req);
        assert_eq!(head.method, Method::DELETE);
        assert_eq!(head.path, "/api/v1/items/42");
        assert_eq!(head.authorization.unwrap(), "Bearer abc");
    }

    #[test]
    fn head_falls_back_to_request_uri() {
        let req = Request::builder()
            .uri("/api/v1/items?page=2")
            .body(axum::body::Body::empty())
            .unwrap();

        let head = request_head(&req);
        assert_eq!(head.path, "/api/v1/items");
        assert!(head.authorization.is_none());
    }
}
