use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error, warn};

use starter_auth::VerificationError;

/// Why the pipeline refused a request.
///
/// Mapping to a status is fixed. Response bodies carry a generic message
/// only; the detail goes to the log.
#[derive(Debug, Error)]
pub enum Rejection {
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] VerificationError),

    #[error("account is inactive")]
    AccountInactive,

    #[error("no policy rule allows this request")]
    Forbidden,

    #[error("internal error: {0}")]
    Internal(String),
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Rejection::AccountInactive | Rejection::Forbidden => StatusCode::FORBIDDEN,
            Rejection::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Rejection::Unauthenticated(_) => "unauthorized",
            Rejection::AccountInactive => "account_inactive",
            Rejection::Forbidden => "forbidden",
            Rejection::Internal(_) => "internal_error",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            Rejection::Unauthenticated(VerificationError::MalformedHeader) => {
                "missing or invalid authorization header"
            }
            Rejection::Unauthenticated(_) => "invalid or expired token",
            Rejection::AccountInactive => "user account is inactive",
            Rejection::Forbidden => "insufficient permissions",
            Rejection::Internal(_) => "internal server error",
        }
    }

    /// Log at the level the rejection class calls for.
    pub fn log(&self, method: &str, path: &str) {
        match self {
            Rejection::Unauthenticated(e) => {
                debug!(method, path, reason = %e, "request unauthenticated")
            }
            Rejection::AccountInactive => warn!(method, path, "inactive account rejected"),
            Rejection::Forbidden => warn!(method, path, "request forbidden by policy"),
            Rejection::Internal(e) => {
                error!(method, path, error = %e, "authorization pipeline fault")
            }
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> axum::response::Response {
        json_error(self.status(), self.code(), self.public_message())
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
