use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use starter_auth::{IdentityClaims, IdentityRecord};
use starter_core::UserId;

use super::{IdentityStore, StoreError};

/// In-memory identity store for tests/dev.
///
/// The whole upsert runs under one write lock, which gives the same
/// single-writer semantics as the SQL `ON CONFLICT` statement.
#[derive(Debug, Default)]
pub struct InMemoryIdentityStore {
    inner: RwLock<HashMap<UserId, IdentityRecord>>,
}

impl InMemoryIdentityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> StoreError {
    StoreError::Unavailable("in-memory identity store lock poisoned".to_string())
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn upsert_from_claims(
        &self,
        claims: &IdentityClaims,
    ) -> Result<IdentityRecord, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;

        let email_taken = map
            .values()
            .any(|record| record.id != claims.sub && record.email == claims.email);
        if email_taken {
            return Err(StoreError::Conflict(format!(
                "email {} belongs to another user",
                claims.email
            )));
        }

        let now = Utc::now();
        let record = match map.entry(claims.sub) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().refresh_from(claims, now);
                entry.get().clone()
            }
            Entry::Vacant(entry) => entry.insert(IdentityRecord::from_claims(claims, now)).clone(),
        };
        Ok(record)
    }

    async fn find(&self, id: UserId) -> Result<Option<IdentityRecord>, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.get(&id).cloned())
    }

    async fn set_active(&self, id: UserId, active: bool) -> Result<bool, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        match map.get_mut(&id) {
            Some(record) => {
                record.is_active = active;
                record.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
