//! Knowledge module - what the player has learned so far.
//!
//! Knowledge is deliberately flat:
//! - **Facts**: opaque tokens such as a character's name or a clue
//! - **Conditions**: sets of facts that gate dialogue variants and interactables
//! - **KnowledgeStore**: the set of facts currently known

mod fact;
mod store;

pub use fact::*;
pub use store::*;
