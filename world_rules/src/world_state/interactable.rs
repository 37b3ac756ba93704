//! Interactables - doors, lifts and observation points placed on a deck.

use serde::{Deserialize, Serialize};

use super::{DeckId, World};
use crate::entities::ActorId;
use crate::knowledge::{Condition, KnowledgeStore};
use crate::mechanics::MovementRules;

/// A world object offering a contextual action when the player is near it.
///
/// Every kind may be gated on a [`Condition`] and may override its caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Interactable {
    /// Teleports the player to another deck.
    Door {
        x: f32,
        target: DeckId,
        /// Arrival position on the target deck; the player keeps their x if absent.
        #[serde(default)]
        target_x: Option<f32>,
        #[serde(default)]
        requires: Condition,
        #[serde(default)]
        caption: Option<String>,
    },

    /// Puts the player into lift mode.
    Lift {
        x: f32,
        #[serde(default)]
        requires: Condition,
        #[serde(default)]
        caption: Option<String>,
    },

    /// Opens a dialogue session on an object, e.g. examining a corpse.
    Observation {
        x: f32,
        name: String,
        script: String,
        #[serde(default)]
        requires: Condition,
        #[serde(default)]
        caption: Option<String>,
    },
}

/// The side effect of using something, applied by the game layer.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    /// Start a conversation with an actor.
    Talk {
        actor: ActorId,
        name: String,
        script: String,
    },
    /// Move to another deck.
    Teleport { deck: DeckId, x: Option<f32> },
    /// Step into the lift.
    EnterLift,
    /// Start a dialogue session on an object.
    Observe { name: String, script: String },
}

/// The single action currently on offer to the player.
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub caption: String,
    pub interaction: Interaction,
}

impl Interactable {
    /// Deck-local position.
    pub fn x(&self) -> f32 {
        match self {
            Interactable::Door { x, .. }
            | Interactable::Lift { x, .. }
            | Interactable::Observation { x, .. } => *x,
        }
    }

    /// Facts required before this interactable shows up at all.
    pub fn requires(&self) -> &Condition {
        match self {
            Interactable::Door { requires, .. }
            | Interactable::Lift { requires, .. }
            | Interactable::Observation { requires, .. } => requires,
        }
    }

    /// Check whether the player is in reach and knows enough to use this.
    pub fn is_near(&self, player_x: f32, knowledge: &KnowledgeStore, rules: &MovementRules) -> bool {
        rules.in_reach(player_x, self.x()) && knowledge.satisfies(self.requires())
    }

    /// User-facing prompt.
    pub fn caption(&self, world: &World) -> String {
        match self {
            Interactable::Door {
                caption: Some(caption),
                ..
            }
            | Interactable::Lift {
                caption: Some(caption),
                ..
            }
            | Interactable::Observation {
                caption: Some(caption),
                ..
            } => caption.clone(),
            Interactable::Door { target, .. } => {
                let name = world
                    .deck(target)
                    .map(|deck| deck.name.as_str())
                    .unwrap_or(target.as_str());
                format!("Go to {}", name)
            }
            Interactable::Lift { .. } => "Take the lift".to_string(),
            Interactable::Observation { name, .. } => format!("Examine {}", name),
        }
    }

    /// What using this interactable does.
    pub fn activate(&self) -> Interaction {
        match self {
            Interactable::Door {
                target, target_x, ..
            } => Interaction::Teleport {
                deck: target.clone(),
                x: *target_x,
            },
            Interactable::Lift { .. } => Interaction::EnterLift,
            Interactable::Observation { name, script, .. } => Interaction::Observe {
                name: name.clone(),
                script: script.clone(),
            },
        }
    }
}
