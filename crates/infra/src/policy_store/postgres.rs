//! Postgres-backed policy store over the `casbin_rule` table.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, instrument};

use starter_auth::RuleSet;

use super::{PolicyStore, PolicyStoreError};

#[derive(Debug, Clone)]
pub struct PostgresPolicyStore {
    pool: Arc<PgPool>,
}

impl PostgresPolicyStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl PolicyStore for PostgresPolicyStore {
    #[instrument(skip(self), err)]
    async fn load_rules(&self) -> Result<RuleSet, PolicyStoreError> {
        let rows = sqlx::query("SELECT v0, v1, v2 FROM casbin_rule WHERE ptype = 'p' ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| PolicyStoreError::Unavailable(format!("load casbin_rule: {e}")))?;

        let triples = rows
            .iter()
            .map(|row| {
                Ok((
                    row.try_get::<String, _>("v0")?,
                    row.try_get::<String, _>("v1")?,
                    row.try_get::<String, _>("v2")?,
                ))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(|e| PolicyStoreError::Unavailable(format!("decode casbin_rule: {e}")))?;

        let rules = RuleSet::parse_rows(triples)?;
        debug!(rows = rows.len(), rules = rules.len(), "policy rules loaded");
        Ok(rules)
    }
}
