use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role identifier used as the policy subject.
///
/// Roles are opaque strings at this layer. The shipped rule set grants
/// everything to a single coarse role for all authenticated callers, but the
/// evaluator compares roles generically so finer roles can be added later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Role given to every authenticated caller.
    pub const AUTHENTICATED: &'static str = "user";

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn authenticated() -> Self {
        Self(Cow::Borrowed(Self::AUTHENTICATED))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
