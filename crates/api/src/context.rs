use serde::Serialize;

use starter_auth::{IdentityClaims, IdentityRecord};
use starter_core::UserId;

/// Identity attached to a request that passed the pipeline.
///
/// `record` is absent when the identity sync degraded; handlers then only
/// have what the token said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestIdentity {
    pub user_id: UserId,
    pub email: String,
    pub name: String,
    pub record: Option<IdentityRecord>,
    pub sync_degraded: bool,
}

impl RequestIdentity {
    pub fn is_synced(&self) -> bool {
        self.record.is_some()
    }
}

/// Mutable state threaded through the pipeline stages of one request.
#[derive(Debug, Default)]
pub struct PipelineContext {
    pub claims: Option<IdentityClaims>,
    pub record: Option<IdentityRecord>,
    pub sync_degraded: bool,
}

impl PipelineContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Final identity, if a stage verified the token.
    pub fn into_identity(self) -> Option<RequestIdentity> {
        let claims = self.claims?;
        Some(RequestIdentity {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            record: self.record,
            sync_degraded: self.sync_degraded,
        })
    }
}
