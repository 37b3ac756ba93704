//! The player character.

use serde::{Deserialize, Serialize};

use crate::mechanics::{AnimationState, Direction, Facing, MovementRules};
use crate::world_state::DeckId;

/// Where the player is and what they're doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Deck-local horizontal position.
    pub x: f32,
    /// The deck the player is on (or the lift is stopped at).
    pub deck: DeckId,
    pub in_lift: bool,
    /// Vertical position of the lift car on the lift screen.
    pub lift_y: f32,
    /// Index of the current deck among the lift stops.
    pub deck_index: usize,
    pub facing: Facing,
    pub animation: AnimationState,
}

impl Player {
    /// Place a new player on a deck.
    pub fn new(deck: DeckId, x: f32) -> Self {
        Self {
            x,
            deck,
            in_lift: false,
            lift_y: 0.0,
            deck_index: 0,
            facing: Facing::Front,
            animation: AnimationState::Standing,
        }
    }

    /// Walk one step. Horizontal moves turn the player and start the walk cycle.
    pub fn walk(&mut self, direction: Direction, rules: &MovementRules, level_width: f32) {
        match direction {
            Direction::Left => self.facing = Facing::Left,
            Direction::Right => self.facing = Facing::Right,
            Direction::Up | Direction::Down => return,
        }
        self.x = rules.step(self.x, direction, level_width);
        self.animation = AnimationState::Walking;
    }

    /// Stop walking and face the camera.
    pub fn rest(&mut self) {
        self.facing = Facing::Front;
        self.animation = AnimationState::Standing;
    }

    /// Step into the lift at the given stop.
    pub fn board_lift(&mut self, stop: usize, spacing: f32) {
        self.in_lift = true;
        self.deck_index = stop;
        self.lift_y = lift_height(stop, spacing);
        self.rest();
    }

    /// Move the lift one stop up or down.
    ///
    /// Returns the new stop index, or `None` if the lift can't go that way.
    pub fn ride_lift(&mut self, direction: Direction, stop_count: usize, spacing: f32) -> Option<usize> {
        let next = match direction {
            Direction::Up if self.deck_index > 0 => self.deck_index - 1,
            Direction::Down if self.deck_index + 1 < stop_count => self.deck_index + 1,
            _ => return None,
        };
        self.deck_index = next;
        self.lift_y = lift_height(next, spacing);
        Some(next)
    }

    pub fn leave_lift(&mut self) {
        self.in_lift = false;
    }
}

/// Lift car height for a stop: one spacing below the previous, starting at one spacing.
pub fn lift_height(stop: usize, spacing: f32) -> f32 {
    spacing * stop as f32 + spacing
}
