//! Fact and condition definitions - the vocabulary of the knowledge store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A fact is an opaque token of world knowledge.
///
/// Facts carry no payload: a name once met, a clue found, a completed action.
/// Only membership in the [`KnowledgeStore`](super::KnowledgeStore) matters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fact(String);

impl Fact {
    /// Create a fact from a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Create a fact, expanding the `.token` shorthand into `namespace.token`.
    ///
    /// Tokens that do not start with `.` are global and returned unchanged.
    pub fn namespaced(namespace: &str, token: &str) -> Self {
        if token.starts_with('.') {
            Self(format!("{namespace}{token}"))
        } else {
            Self(token.to_string())
        }
    }

    /// The raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Fact {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Fact {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// A set of facts that must all be known for something to become available.
///
/// The empty condition is always satisfied. Conditions are ordered sets so
/// they can serve as completion keys and serialize deterministically.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Condition(BTreeSet<Fact>);

impl Condition {
    /// The empty, always-satisfied condition.
    pub fn always() -> Self {
        Self::default()
    }

    /// Add a required fact.
    pub fn with_fact(mut self, fact: impl Into<Fact>) -> Self {
        self.0.insert(fact.into());
        self
    }

    /// Add a required fact in place.
    pub fn insert(&mut self, fact: Fact) -> bool {
        self.0.insert(fact)
    }

    /// Iterate over the required facts.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> {
        self.0.iter()
    }

    /// Check whether a fact is required.
    pub fn requires(&self, fact: &Fact) -> bool {
        self.0.contains(fact)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<Fact> for Condition {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(always)");
        }
        let facts: Vec<_> = self.0.iter().map(Fact::as_str).collect();
        write!(f, "{}", facts.join(", "))
    }
}
