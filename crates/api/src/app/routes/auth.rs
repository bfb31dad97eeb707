use axum::{Extension, Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::context::RequestIdentity;

/// The caller's local record, or the token's view of them when the sync
/// degraded.
pub async fn me(Extension(identity): Extension<RequestIdentity>) -> impl IntoResponse {
    match identity.record {
        Some(record) => Json(json!(record)),
        None => Json(json!({
            "id": identity.user_id,
            "email": identity.email,
            "name": identity.name,
            "sync_degraded": true,
        })),
    }
}

/// Tokens are issued by the auth service; nothing to refresh here.
pub async fn refresh() -> impl IntoResponse {
    (
        StatusCode::NOT_IMPLEMENTED,
        Json(json!({ "message": "refresh token endpoint not implemented" })),
    )
}

/// Stateless tokens: logout is acknowledged and nothing else.
pub async fn logout() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "message": "logged out successfully" })),
    )
}
