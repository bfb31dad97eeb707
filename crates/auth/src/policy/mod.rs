//! Declarative (role, resource, action) policy rules and their evaluation.
//!
//! Rules come from the `casbin_rule` table as plain string triples. They are
//! parsed once into a [`RuleSet`] snapshot; evaluation never mutates it.

mod enforcer;
mod pattern;

use thiserror::Error;

use crate::Role;

pub use enforcer::{EvalError, PolicyEnforcer, PolicyEvaluator};
pub use pattern::{ActionPattern, ResourcePattern};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy rule has an empty role")]
    EmptyRole,

    #[error("invalid resource pattern '{0}': only a single trailing '*' is supported")]
    InvalidResourcePattern(String),

    #[error("invalid action pattern '{0}'")]
    InvalidActionPattern(String),
}

/// One permission tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyRule {
    pub role: Role,
    pub resource: ResourcePattern,
    pub action: ActionPattern,
}

impl PolicyRule {
    pub fn parse(role: &str, resource: &str, action: &str) -> Result<Self, PolicyError> {
        let role = role.trim();
        if role.is_empty() {
            return Err(PolicyError::EmptyRole);
        }

        Ok(Self {
            role: Role::new(role.to_string()),
            resource: resource.parse()?,
            action: action.parse()?,
        })
    }

    /// Role must be equal; resource and action must match their patterns.
    pub fn matches(&self, role: &Role, resource: &str, action: &str) -> bool {
        self.role == *role && self.resource.matches(resource) && self.action.matches(action)
    }
}

impl core::fmt::Display for PolicyRule {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "p, {}, {}, {}", self.role, self.resource, self.action)
    }
}

/// Immutable, de-duplicated set of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<PolicyRule>,
}

impl RuleSet {
    /// Build a set, collapsing rules that repeat the full tuple. The first
    /// occurrence keeps its position.
    pub fn new(rules: impl IntoIterator<Item = PolicyRule>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let rules = rules
            .into_iter()
            .filter(|rule| seen.insert(rule.clone()))
            .collect();
        Self { rules }
    }

    /// Parse raw `(role, resource, action)` rows. Fails on the first bad row.
    pub fn parse_rows<I, S>(rows: I) -> Result<Self, PolicyError>
    where
        I: IntoIterator<Item = (S, S, S)>,
        S: AsRef<str>,
    {
        let rules = rows
            .into_iter()
            .map(|(role, resource, action)| {
                PolicyRule::parse(role.as_ref(), resource.as_ref(), action.as_ref())
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn allows(&self, role: &Role, resource: &str, action: &str) -> bool {
        self.rules
            .iter()
            .any(|rule| rule.matches(role, resource, action))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PolicyRule> {
        self.rules.iter()
    }
}
