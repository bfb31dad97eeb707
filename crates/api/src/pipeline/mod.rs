//! Ordered authorization stages.
//!
//! A request moves through the stages in order:
//!
//! 1. **Authenticate** - bearer header parsed, token verified
//! 2. **Sync identity** - local record upserted from the claims
//! 3. **Authorize** - policy evaluated over (role, path, verb)
//!
//! Any stage may reject, which ends the run. Stages never see the body.

mod stages;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{HeaderValue, Method};
use tracing::debug;

use crate::app::errors::Rejection;
use crate::app::services::AppServices;
use crate::context::{PipelineContext, RequestIdentity};

pub use stages::{AuthenticateStage, AuthorizeStage, SyncIdentityStage};

/// The parts of a request the stages are allowed to look at.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub path: String,
    pub authorization: Option<HeaderValue>,
}

impl RequestHead {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            authorization: None,
        }
    }

    pub fn with_authorization(mut self, value: HeaderValue) -> Self {
        self.authorization = Some(value);
        self
    }
}

#[derive(Debug)]
pub enum StageOutcome {
    Continue,
    Reject(Rejection),
}

#[async_trait]
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;

    async fn process(&self, head: &RequestHead, ctx: &mut PipelineContext) -> StageOutcome;
}

pub type BoxedStage = Arc<dyn Stage>;

/// Immutable list of stages, run in insertion order.
#[derive(Clone)]
pub struct Pipeline {
    stages: Vec<BoxedStage>,
}

impl Pipeline {
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Verify and sync. Used for routes any signed-in user may call.
    pub fn authenticated(services: &AppServices) -> Self {
        Self::builder()
            .stage(AuthenticateStage::new(Arc::clone(&services.verifier)))
            .stage(SyncIdentityStage::new(
                services.synchronizer.clone(),
                services.sync_failure_policy,
            ))
            .build()
    }

    /// Verify, sync, then check policy.
    pub fn authorized(services: &AppServices) -> Self {
        Self::builder()
            .stage(AuthenticateStage::new(Arc::clone(&services.verifier)))
            .stage(SyncIdentityStage::new(
                services.synchronizer.clone(),
                services.sync_failure_policy,
            ))
            .stage(AuthorizeStage::new(
                Arc::clone(&services.policy),
                services.role.clone(),
            ))
            .build()
    }

    /// Run every stage until one rejects.
    pub async fn run(&self, head: &RequestHead) -> Result<RequestIdentity, Rejection> {
        let mut ctx = PipelineContext::new();

        for stage in &self.stages {
            match stage.process(head, &mut ctx).await {
                StageOutcome::Continue => debug!(stage = stage.name(), "stage passed"),
                StageOutcome::Reject(rejection) => {
                    debug!(stage = stage.name(), code = rejection.code(), "stage rejected");
                    return Err(rejection);
                }
            }
        }

        ctx.into_identity().ok_or_else(|| {
            Rejection::Internal("pipeline finished without a verified identity".to_string())
        })
    }
}

#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<BoxedStage>,
}

impl PipelineBuilder {
    #[must_use]
    pub fn stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}
