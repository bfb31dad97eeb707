use core::str::FromStr;

use super::PolicyError;

/// Resource side of a rule: an exact path, or a prefix ending in `*`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourcePattern {
    Exact(String),
    /// The stored prefix excludes the `*`.
    Prefix(String),
}

impl ResourcePattern {
    pub fn matches(&self, resource: &str) -> bool {
        match self {
            Self::Exact(path) => path == resource,
            Self::Prefix(prefix) => resource.starts_with(prefix.as_str()),
        }
    }
}

impl FromStr for ResourcePattern {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(PolicyError::InvalidResourcePattern(s.to_string()));
        }

        match s.find('*') {
            None => Ok(Self::Exact(s.to_string())),
            Some(idx) if idx == s.len() - 1 => Ok(Self::Prefix(s[..idx].to_string())),
            Some(_) => Err(PolicyError::InvalidResourcePattern(s.to_string())),
        }
    }
}

impl core::fmt::Display for ResourcePattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Exact(path) => f.write_str(path),
            Self::Prefix(prefix) => write!(f, "{prefix}*"),
        }
    }
}

/// Action side of a rule: one verb, or a disjunction like `(GET)|(PATCH)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionPattern(Vec<String>);

impl ActionPattern {
    pub fn matches(&self, action: &str) -> bool {
        self.0.iter().any(|verb| verb == action)
    }

    pub fn verbs(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for ActionPattern {
    type Err = PolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PolicyError::InvalidActionPattern(s.to_string());

        let mut verbs = Vec::new();
        for alternative in s.split('|') {
            let mut verb = alternative.trim();
            if let Some(inner) = verb.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
                verb = inner.trim();
            }
            if verb.is_empty() || !verb.bytes().all(|b| b.is_ascii_alphabetic()) {
                return Err(invalid());
            }
            if !verbs.iter().any(|v| v == verb) {
                verbs.push(verb.to_string());
            }
        }

        Ok(Self(verbs))
    }
}

impl core::fmt::Display for ActionPattern {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let [single] = self.0.as_slice() {
            return f.write_str(single);
        }
        let joined = self
            .0
            .iter()
            .map(|verb| format!("({verb})"))
            .collect::<Vec<_>>()
            .join("|");
        f.write_str(&joined)
    }
}
