use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use starter_auth::{PolicyEvaluator, Role, TokenVerifier, VerificationError, parse_bearer};
use starter_infra::{IdentitySynchronizer, SyncFailurePolicy, SyncOutcome};

use super::{RequestHead, Stage, StageOutcome};
use crate::app::errors::Rejection;
use crate::context::PipelineContext;

/// Parses `Authorization: Bearer <token>` and verifies the token.
pub struct AuthenticateStage {
    verifier: Arc<dyn TokenVerifier>,
}

impl AuthenticateStage {
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }
}

#[async_trait]
impl Stage for AuthenticateStage {
    fn name(&self) -> &'static str {
        "authenticate"
    }

    async fn process(&self, head: &RequestHead, ctx: &mut PipelineContext) -> StageOutcome {
        let header = match head.authorization.as_ref().map(|v| v.to_str()) {
            None => None,
            Some(Ok(value)) => Some(value),
            Some(Err(_)) => {
                return StageOutcome::Reject(Rejection::Unauthenticated(
                    VerificationError::MalformedHeader,
                ));
            }
        };

        let claims = parse_bearer(header).and_then(|token| self.verifier.verify(token, Utc::now()));
        match claims {
            Ok(claims) => {
                ctx.claims = Some(claims);
                StageOutcome::Continue
            }
            Err(e) => StageOutcome::Reject(Rejection::Unauthenticated(e)),
        }
    }
}

/// Upserts the local record and enforces the active flag.
pub struct SyncIdentityStage {
    synchronizer: IdentitySynchronizer,
    on_failure: SyncFailurePolicy,
}

impl SyncIdentityStage {
    pub fn new(synchronizer: IdentitySynchronizer, on_failure: SyncFailurePolicy) -> Self {
        Self {
            synchronizer,
            on_failure,
        }
    }
}

#[async_trait]
impl Stage for SyncIdentityStage {
    fn name(&self) -> &'static str {
        "sync_identity"
    }

    async fn process(&self, _head: &RequestHead, ctx: &mut PipelineContext) -> StageOutcome {
        let Some(claims) = ctx.claims.as_ref() else {
            return StageOutcome::Reject(Rejection::Internal(
                "identity sync ran before authentication".to_string(),
            ));
        };

        let outcome = self.synchronizer.sync(claims).await;
        match outcome {
            SyncOutcome::Synced(record) if !record.is_active => {
                StageOutcome::Reject(Rejection::AccountInactive)
            }
            SyncOutcome::Synced(record) => {
                ctx.record = Some(record);
                StageOutcome::Continue
            }
            SyncOutcome::Degraded(err) => match self.on_failure {
                // active status unknown for this request
                SyncFailurePolicy::Degrade => {
                    ctx.sync_degraded = true;
                    StageOutcome::Continue
                }
                SyncFailurePolicy::FailClosed => {
                    let reason = format!("identity sync failed: {err}");
                    StageOutcome::Reject(Rejection::Internal(reason))
                }
            },
        }
    }
}

/// Checks the configured role against the request path and verb.
pub struct AuthorizeStage {
    policy: Arc<dyn PolicyEvaluator>,
    role: Role,
}

impl AuthorizeStage {
    pub fn new(policy: Arc<dyn PolicyEvaluator>, role: Role) -> Self {
        Self { policy, role }
    }
}

#[async_trait]
impl Stage for AuthorizeStage {
    fn name(&self) -> &'static str {
        "authorize"
    }

    async fn process(&self, head: &RequestHead, _ctx: &mut PipelineContext) -> StageOutcome {
        match self
            .policy
            .enforce(&self.role, &head.path, head.method.as_str())
        {
            Ok(true) => StageOutcome::Continue,
            Ok(false) => StageOutcome::Reject(Rejection::Forbidden),
            Err(e) => StageOutcome::Reject(Rejection::Internal(e.to_string())),
        }
    }
}
