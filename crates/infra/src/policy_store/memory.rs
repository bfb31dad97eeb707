use std::sync::RwLock;

use async_trait::async_trait;

use starter_auth::RuleSet;

use super::{PolicyStore, PolicyStoreError};

type Row = (String, String, String);

/// Rule rows held in memory. Used when persistent stores are disabled and
/// in tests.
#[derive(Debug, Default)]
pub struct StaticPolicyStore {
    rows: RwLock<Vec<Row>>,
}

impl StaticPolicyStore {
    pub fn new<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        Self {
            rows: RwLock::new(to_rows(rows)),
        }
    }

    /// Same rules the `casbin_rule` migration seeds.
    pub fn seeded() -> Self {
        Self::new([
            ("user", "/api/v1/items", "(GET)|(POST)"),
            ("user", "/api/v1/items/*", "(GET)|(PUT)|(PATCH)|(DELETE)"),
        ])
    }

    /// Replace the stored rows; takes effect on the next load.
    pub fn set_rows<I, S>(&self, rows: I) -> Result<(), PolicyStoreError>
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: Into<String>,
    {
        let mut guard = self
            .rows
            .write()
            .map_err(|_| PolicyStoreError::Unavailable("policy rows lock poisoned".to_string()))?;
        *guard = to_rows(rows);
        Ok(())
    }
}

fn to_rows<I, S>(rows: I) -> Vec<Row>
where
    I: IntoIterator<Item = (S, S, S)>,
    S: Into<String>,
{
    rows.into_iter()
        .map(|(role, resource, action)| (role.into(), resource.into(), action.into()))
        .collect()
}

#[async_trait]
impl PolicyStore for StaticPolicyStore {
    async fn load_rules(&self) -> Result<RuleSet, PolicyStoreError> {
        let guard = self
            .rows
            .read()
            .map_err(|_| PolicyStoreError::Unavailable("policy rows lock poisoned".to_string()))?;
        let rows = guard
            .iter()
            .map(|(role, resource, action)| (role.as_str(), resource.as_str(), action.as_str()));
        Ok(RuleSet::parse_rows(rows)?)
    }
}
