//! # World Rules
//!
//! The "World Bible" crate - knowledge, decks, interactables and movement rules.
//! This crate is the single source of truth for the ship's layout and the
//! player's knowledge, and does not contain any dialogue logic.

pub mod entities;
pub mod knowledge;
pub mod mechanics;
pub mod world_state;

pub use entities::*;
pub use knowledge::*;
pub use mechanics::*;
pub use world_state::*;
