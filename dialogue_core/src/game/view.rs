//! The read-only view model the driver renders each frame.

use serde::Serialize;
use world_rules::{AnimationState, DeckId, Facing};

use super::menu::GameMenuView;
use crate::session::DialogueView;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub facing: Facing,
    pub animation: AnimationState,
    pub in_lift: bool,
    pub lift_y: f32,
    /// `Deck N: <name>` while riding the lift.
    pub lift_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameView {
    pub deck: DeckId,
    pub deck_name: String,
    pub deck_width: f32,
    /// Deck x-coordinate at the left edge of the screen.
    pub camera_offset: f32,
    pub player: PlayerView,
    /// Caption of the action on offer, if any.
    pub prompt: Option<String>,
    pub dialogue: Option<DialogueView>,
    pub menu: Option<GameMenuView>,
    /// Set once an ending has been triggered.
    pub ending: Option<String>,
}
