//! Registered effects for the `EXEC` script action.
//!
//! Scripts never run code. `EXEC: name` refers to an entry in an
//! [`EffectRegistry`], resolved when the script is parsed, and the game layer
//! applies the resulting [`Effect`] after the dialogue step runs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use world_rules::{DeckId, World, WorldError};

/// The closed set of one-off world mutations a script may trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    /// Play an ending sequence. The current session still plays out.
    Ending { ending: String },
    /// Move the player to a deck.
    Teleport { deck: DeckId, x: f32 },
    /// Switch the ambient music.
    PlayMusic { track: String },
    /// A named cue forwarded verbatim to the driver.
    Signal { name: String },
}

/// Named effects that scripts may `EXEC`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct EffectRegistry {
    effects: HashMap<String, Effect>,
}

impl EffectRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an effect under a name, replacing any previous one.
    pub fn register(&mut self, name: impl Into<String>, effect: Effect) -> &mut Self {
        self.effects.insert(name.into(), effect);
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, name: impl Into<String>, effect: Effect) -> Self {
        self.register(name, effect);
        self
    }

    /// Look up an effect by name.
    pub fn resolve(&self, name: &str) -> Option<&Effect> {
        self.effects.get(name)
    }

    /// Check that every teleport lands on a deck the world has.
    pub fn validate(&self, world: &World) -> Result<(), WorldError> {
        let mut names: Vec<&String> = self.effects.keys().collect();
        names.sort();
        for name in names {
            if let Some(Effect::Teleport { deck, .. }) = self.effects.get(name) {
                if world.deck(deck).is_none() {
                    return Err(WorldError::UnknownDeck {
                        deck: deck.clone(),
                        context: format!("effect `{}`", name),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
