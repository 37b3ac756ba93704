//! Knowledge Store - the set of facts the player currently knows.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{Condition, Fact};

/// The process-wide set of learned facts.
///
/// Empty at new-game start, replaced wholesale on load and persisted
/// wholesale on save. Membership is all that matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct KnowledgeStore {
    facts: BTreeSet<Fact>,
}

impl KnowledgeStore {
    /// Create an empty knowledge store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Learn a fact. Returns `true` if it was not known before.
    pub fn learn(&mut self, fact: Fact) -> bool {
        let learned = self.facts.insert(fact);
        if learned {
            tracing::debug!(count = self.facts.len(), "learned a new fact");
        }
        learned
    }

    /// Forget a fact. Returns `true` if it was known.
    pub fn forget(&mut self, fact: &Fact) -> bool {
        self.facts.remove(fact)
    }

    /// Check if a single fact is known.
    pub fn knows(&self, fact: &Fact) -> bool {
        self.facts.contains(fact)
    }

    /// Check if every fact of a condition is known.
    pub fn satisfies(&self, condition: &Condition) -> bool {
        condition.facts().all(|fact| self.facts.contains(fact))
    }

    /// Iterate over all known facts in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.iter()
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

impl FromIterator<Fact> for KnowledgeStore {
    fn from_iter<I: IntoIterator<Item = Fact>>(iter: I) -> Self {
        Self {
            facts: iter.into_iter().collect(),
        }
    }
}

impl Extend<Fact> for KnowledgeStore {
    fn extend<I: IntoIterator<Item = Fact>>(&mut self, iter: I) {
        self.facts.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::collection::btree_set;
    use proptest::prelude::*;

    #[test]
    fn test_learn_and_forget() {
        let mut store = KnowledgeStore::new();

        assert!(store.learn(Fact::new("Kitty Morgan")));
        assert!(!store.learn(Fact::new("Kitty Morgan")));
        assert!(store.knows(&Fact::new("Kitty Morgan")));
        assert_eq!(store.len(), 1);

        assert!(store.forget(&Fact::new("Kitty Morgan")));
        assert!(!store.forget(&Fact::new("Kitty Morgan")));
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_condition_always_satisfied() {
        let store = KnowledgeStore::new();
        assert!(store.satisfies(&Condition::always()));
    }

    #[test]
    fn test_satisfies_requires_superset() {
        let store: KnowledgeStore = [Fact::new("a"), Fact::new("b")].into_iter().collect();

        assert!(store.satisfies(&Condition::always().with_fact("a")));
        assert!(store.satisfies(&Condition::always().with_fact("a").with_fact("b")));
        assert!(!store.satisfies(&Condition::always().with_fact("a").with_fact("c")));
    }

    #[test]
    fn test_serializes_as_sorted_list() {
        let store: KnowledgeStore = [Fact::new("b"), Fact::new("a")].into_iter().collect();
        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"["a","b"]"#);

        let restored: KnowledgeStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, store);
    }

    proptest! {
        #[test]
        fn test_visibility_is_monotone(
            known in btree_set("[a-f]", 0..6),
            extra in btree_set("[a-f]", 0..6),
            required in btree_set("[a-f]", 0..4),
        ) {
            let condition: Condition = required.into_iter().map(Fact::from).collect();
            let smaller: KnowledgeStore = known.iter().cloned().map(Fact::from).collect();
            let mut larger = smaller.clone();
            larger.extend(extra.into_iter().map(Fact::from));

            if smaller.satisfies(&condition) {
                prop_assert!(larger.satisfies(&condition));
            }
        }
    }
}
