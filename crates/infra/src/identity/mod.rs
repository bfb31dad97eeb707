//! Local identity records: storage and synchronization from token claims.

mod memory;
mod postgres;
mod sync;

use async_trait::async_trait;
use thiserror::Error;

use starter_auth::{IdentityClaims, IdentityRecord};
use starter_core::UserId;

pub use memory::InMemoryIdentityStore;
pub use postgres::PostgresIdentityStore;
pub use sync::{IdentitySynchronizer, SyncError, SyncFailurePolicy, SyncOutcome};

/// Identity store failure.
///
/// A conflict on the subject id itself is resolved by the upsert and never
/// surfaces here; `Conflict` means some *other* unique constraint (email).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("identity store unavailable: {0}")]
    Unavailable(String),

    #[error("identity conflict: {0}")]
    Conflict(String),

    #[error("invalid identity row: {0}")]
    Decode(String),
}

/// Persistence for [`IdentityRecord`]s keyed by subject id.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Insert the subject if unseen, otherwise refresh email and name.
    ///
    /// Must be one atomic conditional write; `is_active` and `created_at`
    /// of an existing record are never touched.
    async fn upsert_from_claims(
        &self,
        claims: &IdentityClaims,
    ) -> Result<IdentityRecord, StoreError>;

    async fn find(&self, id: UserId) -> Result<Option<IdentityRecord>, StoreError>;

    /// Administrative (de)activation. Returns `false` when no record exists.
    async fn set_active(&self, id: UserId, active: bool) -> Result<bool, StoreError>;

    async fn is_active(&self, id: UserId) -> Result<Option<bool>, StoreError> {
        Ok(self.find(id).await?.map(|record| record.is_active))
    }
}
