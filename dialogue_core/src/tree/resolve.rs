//! Resolution - which topics are on offer given what the player knows.

use world_rules::{Condition, KnowledgeStore};

use super::{CompletionMap, Menu, MenuEntry, Step, TopicPath, ENTER_KEY};

/// The variant of a topic that applies right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolved<'m> {
    pub condition: &'m Condition,
    pub steps: &'m [Step],
    /// Whether this exact variant has been shown before.
    pub seen: bool,
}

/// What selecting a choice leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    Topic,
    Menu,
}

/// One offerable entry of a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub key: String,
    pub kind: ChoiceKind,
    pub seen: bool,
}

/// Resolves topics of one script against the current knowledge and completion state.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    namespace: &'a str,
    knowledge: &'a KnowledgeStore,
    completion: &'a CompletionMap,
}

impl<'a> Resolver<'a> {
    pub fn new(namespace: &'a str, knowledge: &'a KnowledgeStore, completion: &'a CompletionMap) -> Self {
        Self {
            namespace,
            knowledge,
            completion,
        }
    }

    /// Steps of the latest satisfied variant of `key`, or `None` if nothing is satisfied yet.
    pub fn get_steps<'m>(&self, menu: &'m Menu, path: &[String], key: &str) -> Option<Resolved<'m>> {
        let variant = menu.topic(key)?.resolve(self.knowledge)?;
        let topic = TopicPath::new(self.namespace, path, key);

        Some(Resolved {
            condition: &variant.condition,
            steps: &variant.steps,
            seen: self.completion.is_seen(&topic, &variant.condition),
        })
    }

    /// The auto-played opening topic of a menu.
    pub fn get_enter<'m>(&self, menu: &'m Menu, path: &[String]) -> Option<Resolved<'m>> {
        self.get_steps(menu, path, ENTER_KEY)
    }

    /// Offerable choices in authoring order, with their seen flags.
    ///
    /// A sub-menu is offered when it has choices of its own, and counts as
    /// seen once all of them are.
    pub fn get_choices(&self, menu: &Menu, path: &[String]) -> Vec<Choice> {
        menu.entries()
            .filter(|(key, _)| *key != ENTER_KEY)
            .filter_map(|(key, entry)| match entry {
                MenuEntry::Topic(_) => self.get_steps(menu, path, key).map(|resolved| Choice {
                    key: key.to_string(),
                    kind: ChoiceKind::Topic,
                    seen: resolved.seen,
                }),
                MenuEntry::Menu(sub) => {
                    let mut sub_path = path.to_vec();
                    sub_path.push(key.to_string());
                    let choices = self.get_choices(sub, &sub_path);
                    if choices.is_empty() {
                        None
                    } else {
                        Some(Choice {
                            key: key.to_string(),
                            kind: ChoiceKind::Menu,
                            seen: choices.iter().all(|choice| choice.seen),
                        })
                    }
                }
            })
            .collect()
    }
}

/// Mark the currently resolved variant of a topic as seen.
pub fn mark_seen(
    completion: &mut CompletionMap,
    namespace: &str,
    path: &[String],
    key: &str,
    condition: &Condition,
) -> bool {
    let topic = TopicPath::new(namespace, path, key);
    let newly = completion.mark_seen(&topic, condition.clone());
    if newly {
        tracing::debug!(topic = %topic, condition = %condition, "variant marked seen");
    }
    newly
}
