//! `Authorization` header parsing.

use crate::token::VerificationError;

/// The only accepted authorization scheme. Matched case-sensitively.
pub const BEARER_SCHEME: &str = "Bearer";

/// Extract the compact token from an `Authorization` header value.
///
/// The header must be exactly `Bearer <token>`: two space-separated parts,
/// the scheme spelled `Bearer` and a non-empty token with no further spaces.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, VerificationError> {
    let header = header.ok_or(VerificationError::MalformedHeader)?;

    let (scheme, token) = header
        .split_once(' ')
        .ok_or(VerificationError::MalformedHeader)?;

    if scheme != BEARER_SCHEME {
        return Err(VerificationError::MalformedHeader);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(VerificationError::MalformedHeader);
    }

    Ok(token)
}
