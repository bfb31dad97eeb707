//! Local identity record, synchronized from verified token claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use starter_core::UserId;

use crate::claims::IdentityClaims;

/// Persistent user record mirrored from the auth service.
///
/// # Invariants
/// - `id` is immutable once the record exists.
/// - `email` is unique across records.
/// - An inactive record fails every authorization check for its subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub id: UserId,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IdentityRecord {
    /// First sighting of a subject: active, no provider metadata yet.
    pub fn from_claims(claims: &IdentityClaims, now: DateTime<Utc>) -> Self {
        Self {
            id: claims.sub,
            email: claims.email.clone(),
            name: claims.name.clone(),
            google_id: None,
            avatar_url: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the mutable profile fields from a later token.
    ///
    /// Only email, name and `updated_at` change; `id`, `is_active` and
    /// `created_at` are left alone.
    pub fn refresh_from(&mut self, claims: &IdentityClaims, now: DateTime<Utc>) {
        self.email = claims.email.clone();
        self.name = claims.name.clone();
        self.updated_at = now;
    }
}
