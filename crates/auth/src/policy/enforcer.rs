use std::sync::{Arc, RwLock};

use thiserror::Error;

use super::RuleSet;
use crate::Role;

/// Fault inside the evaluation engine itself.
///
/// A request that simply matches no rule is `Ok(false)`, never an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("policy rule snapshot is unavailable")]
    SnapshotUnavailable,
}

/// Policy decision seam used by the request pipeline.
pub trait PolicyEvaluator: Send + Sync {
    fn enforce(&self, role: &Role, resource: &str, action: &str) -> Result<bool, EvalError>;
}

/// Evaluator over an atomically swappable rule-set snapshot.
///
/// Readers clone the current `Arc<RuleSet>` and evaluate without holding the
/// lock, so a concurrent [`replace`](Self::replace) is observed either fully
/// or not at all.
#[derive(Debug)]
pub struct PolicyEnforcer {
    current: RwLock<Arc<RuleSet>>,
}

impl PolicyEnforcer {
    pub fn new(rules: RuleSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(rules)),
        }
    }

    pub fn snapshot(&self) -> Result<Arc<RuleSet>, EvalError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| EvalError::SnapshotUnavailable)
    }

    /// Install a new snapshot, returning the one it replaced.
    pub fn replace(&self, rules: RuleSet) -> Result<Arc<RuleSet>, EvalError> {
        let mut guard = self
            .current
            .write()
            .map_err(|_| EvalError::SnapshotUnavailable)?;
        Ok(std::mem::replace(&mut *guard, Arc::new(rules)))
    }
}

impl PolicyEvaluator for PolicyEnforcer {
    fn enforce(&self, role: &Role, resource: &str, action: &str) -> Result<bool, EvalError> {
        Ok(self.snapshot()?.allows(role, resource, action))
    }
}
