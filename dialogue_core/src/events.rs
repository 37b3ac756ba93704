//! Events emitted by the game for the driver to react to.
//!
//! The game never calls back into the driver. Anything the driver has to
//! do (play a sound, fade to an ending, close the window) is queued here and
//! drained once per frame.

use serde::{Deserialize, Serialize};
use world_rules::{ActorId, DeckId};

use crate::session::SessionId;

/// Something the driver should know about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    SessionStarted {
        session: SessionId,
        namespace: String,
        partner: String,
        /// The actor spoken to; `None` for observations and the intro.
        actor: Option<ActorId>,
    },
    SessionEnded {
        session: SessionId,
        /// `true` when an `EXIT` step closed it.
        exited: bool,
    },
    DeckEntered {
        deck: DeckId,
        x: f32,
    },
    MusicChanged {
        track: Option<String>,
    },
    LiftMoved {
        deck: DeckId,
        deck_index: usize,
        lift_y: f32,
    },
    Saved {
        slot: String,
    },
    Loaded {
        slot: String,
    },
    EndingTriggered {
        ending: String,
    },
    Signal {
        name: String,
    },
    ScriptsReloaded {
        scripts: usize,
    },
    QuitRequested,
}

impl GameEvent {
    /// Event type as a static string, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            GameEvent::SessionStarted { .. } => "session_started",
            GameEvent::SessionEnded { .. } => "session_ended",
            GameEvent::DeckEntered { .. } => "deck_entered",
            GameEvent::MusicChanged { .. } => "music_changed",
            GameEvent::LiftMoved { .. } => "lift_moved",
            GameEvent::Saved { .. } => "saved",
            GameEvent::Loaded { .. } => "loaded",
            GameEvent::EndingTriggered { .. } => "ending_triggered",
            GameEvent::Signal { .. } => "signal",
            GameEvent::ScriptsReloaded { .. } => "scripts_reloaded",
            GameEvent::QuitRequested => "quit_requested",
        }
    }
}
