//! # Dialogue Core
//!
//! Conversations, knowledge gating and the game loop facade for
//! "A Death at Sea". This crate sits on top of `world_rules`, which owns the
//! ship layout and the player's knowledge.
//!
//! ## Core Components
//!
//! - **script**: Parses dialogue scripts into menus of topics
//! - **tree**: Menus, topics with knowledge-gated variants, completion tracking
//! - **session**: The choice-list / line-playback state machine of one conversation
//! - **effects**: The closed set of world mutations scripts may `EXEC`
//! - **persist**: Named JSON save slots
//! - **game**: The facade the driver forwards input to and renders from
//! - **events**: Events the driver drains once per frame
//!
//! ## Design Philosophy
//!
//! - **Knowledge-Driven**: What can be said or opened depends only on the facts the player knows
//! - **Event-Driven**: The core never calls the driver; it queues events and exposes a view model
//! - **Data-Driven**: Scripts, the world layout and effects are content, not code

pub mod config;
pub mod effects;
pub mod events;
pub mod game;
pub mod persist;
pub mod script;
pub mod session;
pub mod tree;

pub use config::*;
pub use effects::*;
pub use events::*;
pub use game::*;
pub use persist::*;
pub use script::*;
pub use session::*;
pub use tree::*;
