//! Startup fetch of the token-signing public key from the auth service.

use std::time::Duration;

use jsonwebtoken::DecodingKey;
use thiserror::Error;
use tracing::{info, instrument};

#[derive(Debug, Error)]
pub enum PublicKeyError {
    #[error("public key request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("public key endpoint {url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("public key is not a valid RSA PEM: {0}")]
    Pem(String),
}

/// GET `url` and decode the body as an RSA public key PEM.
///
/// Anything other than `200 OK` is an error; there is no retry.
#[instrument(skip(timeout), err)]
pub async fn fetch_public_key(url: &str, timeout: Duration) -> Result<DecodingKey, PublicKeyError> {
    let request_error = |e: reqwest::Error| PublicKeyError::Request {
        url: url.to_string(),
        message: e.to_string(),
    };

    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(request_error)?;

    let response = client.get(url).send().await.map_err(request_error)?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(PublicKeyError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(request_error)?;
    let key = decode_public_key_pem(&body)?;
    info!(bytes = body.len(), "public key fetched");
    Ok(key)
}

/// Accepts both `RSA PUBLIC KEY` (PKCS#1) and `PUBLIC KEY` (SPKI) blocks.
pub fn decode_public_key_pem(pem: &[u8]) -> Result<DecodingKey, PublicKeyError> {
    DecodingKey::from_rsa_pem(pem).map_err(|e| PublicKeyError::Pem(e.to_string()))
}
