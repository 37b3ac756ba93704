//! Non-player characters standing on a deck.

use serde::{Deserialize, Serialize};

use super::ActorId;

/// A non-player character the player can talk to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    #[serde(default, skip_serializing)]
    pub id: ActorId,
    pub name: String,
    /// Deck-local horizontal position.
    pub x: f32,
    /// Namespace of the dialogue script this actor talks with.
    pub script: String,
}

impl Actor {
    /// Create a new actor at a position, talking with the given script.
    pub fn new(name: impl Into<String>, x: f32, script: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            name: name.into(),
            x,
            script: script.into(),
        }
    }

    /// Prompt shown when the player stands next to this actor.
    pub fn caption(&self) -> String {
        format!("Talk to {}", self.name)
    }
}
