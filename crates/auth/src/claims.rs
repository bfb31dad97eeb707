use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use starter_core::UserId;

use crate::token::VerificationError;

/// Identity claims carried by an access token issued by the auth service.
///
/// Produced fresh for every request once the token signature has been
/// verified. Never persisted directly; the synchronizer copies the relevant
/// fields into an [`IdentityRecord`](crate::IdentityRecord).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    pub email: String,

    /// Display name. Subjects without one get an empty string.
    #[serde(default)]
    pub name: String,

    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,

    /// Not-before, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Issued-at, seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

/// Deterministically validate the temporal claims against `now`.
///
/// `leeway_secs` widens both bounds to tolerate clock skew between this
/// process and the token issuer.
///
/// Note: this validates the *claims* only. Signature checks happen in
/// [`verify`](crate::verify) before this is called.
pub fn validate_claims(
    claims: &IdentityClaims,
    now: DateTime<Utc>,
    leeway_secs: i64,
) -> Result<(), VerificationError> {
    let now = now.timestamp();

    if let Some(nbf) = claims.nbf {
        if now + leeway_secs < nbf {
            return Err(VerificationError::NotYetValid);
        }
    }
    if now - leeway_secs >= claims.exp {
        return Err(VerificationError::Expired);
    }
    Ok(())
}
