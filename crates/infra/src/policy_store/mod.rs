//! Source of policy rules and the reload path into a live [`PolicyEnforcer`].
//!
//! [`PolicyEnforcer`]: starter_auth::PolicyEnforcer

mod memory;
mod postgres;
mod reload;

use async_trait::async_trait;
use thiserror::Error;

use starter_auth::{EvalError, PolicyError, RuleSet};

pub use memory::StaticPolicyStore;
pub use postgres::PostgresPolicyStore;
pub use reload::{load_enforcer, reload, spawn_periodic_reload};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyStoreError {
    #[error("policy store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    InvalidRule(#[from] PolicyError),

    #[error(transparent)]
    Snapshot(#[from] EvalError),
}

/// Read-only access to the persisted rule set. Rules are seeded at
/// deployment; nothing here writes them.
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Load and parse every `p` rule. A single bad row fails the whole load.
    async fn load_rules(&self) -> Result<RuleSet, PolicyStoreError>;
}
