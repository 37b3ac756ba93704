//! Entity definitions for the ship: non-player characters and the player.

mod actor;
mod player;

pub use actor::*;
pub use player::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Runtime identifier for actors.
///
/// Actor ids are generated when a world is loaded and never persisted; saves
/// refer to decks by their stable [`DeckId`](crate::DeckId) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub Uuid);

impl ActorId {
    /// Create a new random actor ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
