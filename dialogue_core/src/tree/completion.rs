//! Completion tracking - which topic variants the player has already seen.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use world_rules::Condition;

/// Address of a topic: script namespace, sub-menu path and key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPath<'a> {
    pub namespace: &'a str,
    pub menu: &'a [String],
    pub key: &'a str,
}

impl<'a> TopicPath<'a> {
    pub fn new(namespace: &'a str, menu: &'a [String], key: &'a str) -> Self {
        Self {
            namespace,
            menu,
            key,
        }
    }

    /// Flat key used in the completion map: `namespace/menu.path.key`.
    pub fn to_key(&self) -> String {
        if self.menu.is_empty() {
            format!("{}/{}", self.namespace, self.key)
        } else {
            format!("{}/{}.{}", self.namespace, self.menu.join("."), self.key)
        }
    }
}

impl std::fmt::Display for TopicPath<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_key())
    }
}

/// Seen variants per topic, keyed by the variant's condition.
///
/// Keying on the condition rather than the topic means a newly unlocked
/// variant of an old topic counts as unseen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CompletionMap {
    seen: BTreeMap<String, BTreeSet<Condition>>,
}

impl CompletionMap {
    /// Create an empty completion map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a topic's variant for `condition` has been shown.
    pub fn is_seen(&self, topic: &TopicPath<'_>, condition: &Condition) -> bool {
        self.seen
            .get(&topic.to_key())
            .map(|conditions| conditions.contains(condition))
            .unwrap_or(false)
    }

    /// Record a variant as shown. Returns `true` if it wasn't already.
    pub fn mark_seen(&mut self, topic: &TopicPath<'_>, condition: Condition) -> bool {
        self.seen.entry(topic.to_key()).or_default().insert(condition)
    }

    /// Number of topics with at least one seen variant.
    pub fn topic_count(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_path_keys() {
        let root: Vec<String> = vec![];
        let nested = vec!["room".to_string(), "desk".to_string()];

        assert_eq!(TopicPath::new("kitty", &root, "Bye").to_key(), "kitty/Bye");
        assert_eq!(
            TopicPath::new("kitty", &nested, "drawer").to_key(),
            "kitty/room.desk.drawer"
        );
    }

    #[test]
    fn test_completion_keyed_by_condition() {
        let menu: Vec<String> = vec![];
        let topic = TopicPath::new("kitty", &menu, "About yourself");
        let generic = Condition::always();
        let specific = Condition::always().with_fact("X");
        let mut completion = CompletionMap::new();

        assert!(completion.mark_seen(&topic, generic.clone()));
        assert!(!completion.mark_seen(&topic, generic.clone()));

        assert!(completion.is_seen(&topic, &generic));
        assert!(!completion.is_seen(&topic, &specific));

        completion.mark_seen(&topic, specific.clone());
        assert!(completion.is_seen(&topic, &specific));
        assert_eq!(completion.topic_count(), 1);
    }

    #[test]
    fn test_same_key_in_different_menus() {
        let root: Vec<String> = vec![];
        let room = vec!["room".to_string()];
        let mut completion = CompletionMap::new();

        completion.mark_seen(&TopicPath::new("kitty", &root, "door"), Condition::always());

        assert!(!completion.is_seen(&TopicPath::new("kitty", &room, "door"), &Condition::always()));
        assert!(!completion.is_seen(&TopicPath::new("cheshire", &root, "door"), &Condition::always()));
    }
}
