//! Bearer token verification.
//!
//! Tokens are compact JWS strings signed by the auth service with an RSA key.
//! Verification is a pure function of the token, the public key and the
//! current time; no network calls are made here.

use std::collections::HashSet;
use std::str::FromStr;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

use crate::claims::{IdentityClaims, validate_claims};

/// Signing algorithms accepted from the issuer: RSASSA-PKCS1-v1_5 only.
/// Everything else (RSA-PSS, HMAC, `none`, elliptic curves, unknown names)
/// is rejected before the signature is looked at.
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] =
    [Algorithm::RS256, Algorithm::RS384, Algorithm::RS512];

/// Why a bearer token was not accepted.
///
/// Every variant is an authentication failure; the API maps them all to the
/// same external status without exposing which check failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("missing or malformed authorization header")]
    MalformedHeader,

    #[error("token could not be decoded")]
    Malformed,

    #[error("token signing algorithm is not accepted")]
    AlgorithmMismatch,

    #[error("token signature does not match the public key")]
    BadSignature,

    #[error("token has expired")]
    Expired,

    #[error("token is not valid yet")]
    NotYetValid,
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Read the `alg` the token declares, without trusting anything else in it.
///
/// Parsed by hand rather than through `jsonwebtoken::decode_header` so that
/// names the library has no variant for (`none`) still classify as an
/// algorithm mismatch instead of a decode failure.
fn declared_algorithm(token: &str) -> Result<Algorithm, VerificationError> {
    let mut segments = token.split('.');
    let header = segments.next().ok_or(VerificationError::Malformed)?;
    if segments.count() != 2 {
        return Err(VerificationError::Malformed);
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|_| VerificationError::Malformed)?;
    let raw: RawHeader =
        serde_json::from_slice(&bytes).map_err(|_| VerificationError::Malformed)?;

    let alg = Algorithm::from_str(&raw.alg).map_err(|_| VerificationError::AlgorithmMismatch)?;
    if ACCEPTED_ALGORITHMS.contains(&alg) {
        Ok(alg)
    } else {
        Err(VerificationError::AlgorithmMismatch)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> VerificationError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
            VerificationError::BadSignature
        }
        ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
            VerificationError::AlgorithmMismatch
        }
        ErrorKind::ExpiredSignature => VerificationError::Expired,
        ErrorKind::ImmatureSignature => VerificationError::NotYetValid,
        _ => VerificationError::Malformed,
    }
}

fn verify_with_leeway(
    token: &str,
    key: &DecodingKey,
    now: DateTime<Utc>,
    leeway_secs: i64,
) -> Result<IdentityClaims, VerificationError> {
    let alg = declared_algorithm(token)?;

    // Temporal claims are checked by `validate_claims` against the caller's
    // clock, so the library only checks the signature and claim shape.
    let mut validation = Validation::new(alg);
    validation.algorithms = vec![alg];
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.leeway = 0;
    validation.required_spec_claims = HashSet::from(["exp".to_string()]);

    let data = jsonwebtoken::decode::<IdentityClaims>(token, key, &validation)
        .map_err(map_jwt_error)?;

    validate_claims(&data.claims, now, leeway_secs)?;
    Ok(data.claims)
}

/// Verify a compact token against `key` at time `now`, with no clock leeway.
pub fn verify(
    token: &str,
    key: &DecodingKey,
    now: DateTime<Utc>,
) -> Result<IdentityClaims, VerificationError> {
    verify_with_leeway(token, key, now, 0)
}

/// Token verification seam used by the request pipeline.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, VerificationError>;
}

/// Verifier bound to the single RSA public key fetched at startup.
#[derive(Clone)]
pub struct RsaTokenVerifier {
    key: DecodingKey,
    leeway_secs: i64,
}

impl RsaTokenVerifier {
    pub fn new(key: DecodingKey) -> Self {
        Self { key, leeway_secs: 0 }
    }

    /// Build from a PEM public key (PKCS#1 `RSA PUBLIC KEY` or SPKI `PUBLIC KEY`).
    pub fn from_pem(pem: &[u8]) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self::new(DecodingKey::from_rsa_pem(pem)?))
    }

    pub fn with_leeway(mut self, leeway_secs: i64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }
}

impl TokenVerifier for RsaTokenVerifier {
    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<IdentityClaims, VerificationError> {
        verify_with_leeway(token, &self.key, now, self.leeway_secs)
    }
}
