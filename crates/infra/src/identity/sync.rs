use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error};

use starter_auth::{IdentityClaims, IdentityRecord};

use super::{IdentityStore, StoreError};

/// What the pipeline does when the identity upsert fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncFailurePolicy {
    /// Continue on verified claims alone. The active-status check is skipped
    /// for that request.
    #[default]
    Degrade,
    /// Reject the request as an internal fault.
    FailClosed,
}

impl FromStr for SyncFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "degrade" => Ok(Self::Degrade),
            "fail_closed" | "fail-closed" => Ok(Self::FailClosed),
            other => Err(format!(
                "unknown sync failure policy '{other}', expected degrade or fail_closed"
            )),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("identity sync task did not complete: {0}")]
    Aborted(String),
}

/// Result of one sync attempt. A degraded sync is not a request failure by
/// itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced(IdentityRecord),
    Degraded(SyncError),
}

impl SyncOutcome {
    pub fn record(&self) -> Option<&IdentityRecord> {
        match self {
            Self::Synced(record) => Some(record),
            Self::Degraded(_) => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// Mirrors verified claims into the identity store.
///
/// Whether a failure is fatal is the caller's decision; this type only
/// reports it.
#[derive(Clone)]
pub struct IdentitySynchronizer {
    store: Arc<dyn IdentityStore>,
}

impl IdentitySynchronizer {
    pub fn new(store: Arc<dyn IdentityStore>) -> Self {
        Self { store }
    }

    /// Upsert the subject described by `claims`. One durable write, no retry.
    ///
    /// The write runs on its own task: if this future is dropped (client
    /// went away) the wait is abandoned but the idempotent upsert still
    /// completes.
    pub async fn sync_identity(
        &self,
        claims: &IdentityClaims,
    ) -> Result<IdentityRecord, SyncError> {
        let store = Arc::clone(&self.store);
        let owned = claims.clone();
        let write = tokio::spawn(async move { store.upsert_from_claims(&owned).await });

        let record = write
            .await
            .map_err(|e| SyncError::Aborted(e.to_string()))??;

        debug!(user_id = %record.id, is_active = record.is_active, "identity synced");
        Ok(record)
    }

    /// Like [`sync_identity`](Self::sync_identity) but folds failure into a
    /// [`SyncOutcome::Degraded`], logged at error level.
    pub async fn sync(&self, claims: &IdentityClaims) -> SyncOutcome {
        match self.sync_identity(claims).await {
            Ok(record) => SyncOutcome::Synced(record),
            Err(err) => {
                error!(
                    user_id = %claims.sub,
                    error = %err,
                    "identity sync failed, continuing on token claims"
                );
                SyncOutcome::Degraded(err)
            }
        }
    }
}
