//! Dialogue trees - menus of topics, each with knowledge-gated variants.
//!
//! A script compiles into a root [`Menu`]. Dotted keys (`room.door`) nest
//! menus; every leaf is a [`Topic`] holding variants in authoring order.

mod completion;
mod resolve;

pub use completion::*;
pub use resolve::*;

use serde::{Deserialize, Serialize};
use world_rules::{Condition, Fact, KnowledgeStore};

use crate::effects::Effect;

/// Reserved key for the line auto-played when a menu opens.
pub const ENTER_KEY: &str = "enter";

/// Topic keys that say goodbye; they always end with an exit.
pub const GOODBYE_KEYS: [&str; 2] = ["Bye", "Done"];

/// Check whether a topic key is a goodbye.
pub fn is_goodbye(key: &str) -> bool {
    GOODBYE_KEYS.contains(&key)
}

/// Who says a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Speaker {
    Player,
    Other,
}

impl Speaker {
    /// Text color the driver should use for this speaker.
    pub fn color(&self) -> &'static str {
        match self {
            Speaker::Player => "#88bbff",
            Speaker::Other => "#ffffff",
        }
    }
}

/// One unit of dialogue playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Step {
    Speak { speaker: Speaker, text: String },
    Learn(Fact),
    Forget(Fact),
    Exec(Effect),
    /// Ends the whole session.
    Exit,
}

impl Step {
    pub fn is_exit(&self) -> bool {
        matches!(self, Step::Exit)
    }
}

/// One gated version of a topic.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub condition: Condition,
    pub steps: Vec<Step>,
}

/// A named conversation choice (a "match") with variants in authoring order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Topic {
    variants: Vec<Variant>,
}

impl Topic {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a variant; later variants take priority when satisfied.
    pub fn push_variant(&mut self, condition: Condition, steps: Vec<Step>) {
        self.variants.push(Variant { condition, steps });
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// The most recently authored variant whose condition is known.
    pub fn resolve(&self, knowledge: &KnowledgeStore) -> Option<&Variant> {
        self.variants
            .iter()
            .rev()
            .find(|variant| knowledge.satisfies(&variant.condition))
    }

    fn has_exit(&self) -> bool {
        self.variants
            .iter()
            .any(|variant| variant.steps.iter().any(Step::is_exit))
    }
}

/// An entry of a menu: either a nested menu or a topic.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEntry {
    Menu(Menu),
    Topic(Topic),
}

/// An ordered collection of topics and sub-menus.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Menu {
    entries: Vec<(String, MenuEntry)>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an entry by key.
    pub fn get(&self, key: &str) -> Option<&MenuEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut MenuEntry> {
        self.entries
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, entry)| entry)
    }

    /// Iterate over entries in authoring order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &MenuEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Get a topic by key.
    pub fn topic(&self, key: &str) -> Option<&Topic> {
        match self.get(key) {
            Some(MenuEntry::Topic(topic)) => Some(topic),
            _ => None,
        }
    }

    /// The auto-played `enter` topic, if any.
    pub fn enter(&self) -> Option<&Topic> {
        self.topic(ENTER_KEY)
    }

    /// Walk down a path of sub-menu keys.
    pub fn submenu(&self, path: &[String]) -> Option<&Menu> {
        path.iter().try_fold(self, |menu, key| match menu.get(key) {
            Some(MenuEntry::Menu(sub)) => Some(sub),
            _ => None,
        })
    }

    /// Get or create a sub-menu. Fails with `None` if the key holds a topic.
    pub fn submenu_mut(&mut self, key: &str) -> Option<&mut Menu> {
        if self.get(key).is_none() {
            self.entries
                .push((key.to_string(), MenuEntry::Menu(Menu::new())));
        }
        match self.get_mut(key) {
            Some(MenuEntry::Menu(sub)) => Some(sub),
            _ => None,
        }
    }

    /// Get or create a topic. Fails with `None` if the key holds a menu.
    pub fn topic_mut(&mut self, key: &str) -> Option<&mut Topic> {
        if self.get(key).is_none() {
            self.entries
                .push((key.to_string(), MenuEntry::Topic(Topic::new())));
        }
        match self.get_mut(key) {
            Some(MenuEntry::Topic(topic)) => Some(topic),
            _ => None,
        }
    }

    /// Check whether any variant anywhere below this menu reaches an exit.
    pub fn has_exit(&self) -> bool {
        self.entries.iter().any(|(_, entry)| match entry {
            MenuEntry::Menu(sub) => sub.has_exit(),
            MenuEntry::Topic(topic) => topic.has_exit(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
