//! World state management - the decks of the ship and what stands on them.

mod interactable;

pub use interactable::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::entities::Actor;
use crate::knowledge::KnowledgeStore;
use crate::mechanics::MovementRules;

/// Errors raised while loading a world layout.
#[derive(Debug, Error)]
pub enum WorldError {
    #[error("failed to read world layout {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid world layout: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("world has no decks")]
    Empty,

    #[error("deck `{0}` is declared more than once")]
    DuplicateDeck(DeckId),

    #[error("{context} refers to unknown deck `{deck}`")]
    UnknownDeck { deck: DeckId, context: String },

    #[error("deck `{0}` has a lift but is not a lift stop")]
    LiftNotAStop(DeckId),
}

/// Stable identifier for decks.
///
/// Unlike actor ids this is authored, so saves can refer to it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(String);

impl DeckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DeckId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeckId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A horizontally scrolling deck (or room).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    pub id: DeckId,
    /// Display name, e.g. "First-class Cabins".
    pub name: String,
    /// Usable width in deck-local units.
    pub width: f32,
    /// Ambient music track for this deck.
    #[serde(default)]
    pub music: Option<String>,
    #[serde(default)]
    pub actors: Vec<Actor>,
    #[serde(default)]
    pub interactables: Vec<Interactable>,
}

impl Deck {
    /// Create an empty deck.
    pub fn new(id: impl Into<String>, name: impl Into<String>, width: f32) -> Self {
        Self {
            id: DeckId::new(id),
            name: name.into(),
            width,
            music: None,
            actors: Vec::new(),
            interactables: Vec::new(),
        }
    }

    pub fn with_music(mut self, track: impl Into<String>) -> Self {
        self.music = Some(track.into());
        self
    }

    pub fn with_actor(mut self, actor: Actor) -> Self {
        self.actors.push(actor);
        self
    }

    pub fn with_interactable(mut self, interactable: Interactable) -> Self {
        self.interactables.push(interactable);
        self
    }

    /// Position of this deck's lift door, if it has one.
    pub fn lift_x(&self) -> Option<f32> {
        self.interactables.iter().find_map(|i| match i {
            Interactable::Lift { x, .. } => Some(*x),
            _ => None,
        })
    }

    /// First actor in reach of the player.
    pub fn actor_near(&self, player_x: f32, rules: &MovementRules) -> Option<&Actor> {
        self.actors.iter().find(|a| rules.in_reach(player_x, a.x))
    }

    /// First interactable, in list order, that the player can use right now.
    pub fn interactable_near(
        &self,
        player_x: f32,
        knowledge: &KnowledgeStore,
        rules: &MovementRules,
    ) -> Option<&Interactable> {
        self.interactables
            .iter()
            .find(|i| i.is_near(player_x, knowledge, rules))
    }
}

/// Where a new game begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartPosition {
    pub deck: DeckId,
    pub x: f32,
}

/// The complete, static layout of the ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub start: StartPosition,

    /// Decks reachable by lift, top to bottom.
    #[serde(default)]
    pub lift_stops: Vec<DeckId>,

    pub decks: Vec<Deck>,
}

impl World {
    /// Create a world from decks, starting on the first one.
    pub fn new(decks: Vec<Deck>, start_x: f32) -> Result<Self, WorldError> {
        let first = decks.first().ok_or(WorldError::Empty)?;
        let world = Self {
            start: StartPosition {
                deck: first.id.clone(),
                x: start_x,
            },
            lift_stops: Vec::new(),
            decks,
        };
        world.validate()?;
        Ok(world)
    }

    /// Set the decks served by the lift, top to bottom.
    pub fn with_lift_stops(mut self, stops: impl IntoIterator<Item = DeckId>) -> Result<Self, WorldError> {
        self.lift_stops = stops.into_iter().collect();
        self.validate()?;
        Ok(self)
    }

    /// Parse and validate a TOML world layout.
    pub fn from_toml_str(source: &str) -> Result<Self, WorldError> {
        let world: World = toml::from_str(source)?;
        world.validate()?;
        Ok(world)
    }

    /// Read, parse and validate a TOML world layout file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, WorldError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| WorldError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let world = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), decks = world.decks.len(), "world layout loaded");
        Ok(world)
    }

    /// Check that every deck reference resolves and every lift can be boarded.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.decks.is_empty() {
            return Err(WorldError::Empty);
        }

        let mut ids = HashSet::new();
        for deck in &self.decks {
            if !ids.insert(&deck.id) {
                return Err(WorldError::DuplicateDeck(deck.id.clone()));
            }
        }

        let check = |deck: &DeckId, context: String| {
            if ids.contains(deck) {
                Ok(())
            } else {
                Err(WorldError::UnknownDeck {
                    deck: deck.clone(),
                    context,
                })
            }
        };

        check(&self.start.deck, "start position".to_string())?;
        for stop in &self.lift_stops {
            check(stop, "lift stop".to_string())?;
        }
        for deck in &self.decks {
            for interactable in &deck.interactables {
                match interactable {
                    Interactable::Door { target, .. } => {
                        check(target, format!("door on deck `{}`", deck.id))?;
                    }
                    Interactable::Lift { .. } if self.lift_stop_index(&deck.id).is_none() => {
                        return Err(WorldError::LiftNotAStop(deck.id.clone()));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Get a deck by ID.
    pub fn deck(&self, id: &DeckId) -> Option<&Deck> {
        self.decks.iter().find(|d| &d.id == id)
    }

    /// Index of a deck among the lift stops.
    pub fn lift_stop_index(&self, id: &DeckId) -> Option<usize> {
        self.lift_stops.iter().position(|stop| stop == id)
    }

    /// Deck served by a lift stop.
    pub fn lift_stop(&self, index: usize) -> Option<&DeckId> {
        self.lift_stops.get(index)
    }

    /// The action on offer at a position: actors first, then interactables in order.
    pub fn prompt_at(
        &self,
        deck_id: &DeckId,
        player_x: f32,
        knowledge: &KnowledgeStore,
        rules: &MovementRules,
    ) -> Option<Prompt> {
        let deck = self.deck(deck_id)?;

        if let Some(actor) = deck.actor_near(player_x, rules) {
            return Some(Prompt {
                caption: actor.caption(),
                interaction: Interaction::Talk {
                    actor: actor.id,
                    name: actor.name.clone(),
                    script: actor.script.clone(),
                },
            });
        }

        deck.interactable_near(player_x, knowledge, rules)
            .map(|interactable| Prompt {
                caption: interactable.caption(self),
                interaction: interactable.activate(),
            })
    }
}
