//! Save slots for save/load.
//!
//! Each slot is one pretty-printed JSON file in the save directory. Writes go
//! to a temporary file next to the target and are renamed over it, so a crash
//! mid-write leaves the previous content of the slot intact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use world_rules::{DeckId, KnowledgeStore};

use crate::tree::CompletionMap;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no save in slot `{slot}`")]
    NotFound { slot: String },

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

impl PersistError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        PersistError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// Slot written on every conversation exit and by the driver's timer.
pub const AUTOSAVE_SLOT: &str = "Auto-save";

/// Slots the player can save to by hand.
pub const MANUAL_SLOTS: [&str; 5] = ["Slot 1", "Slot 2", "Slot 3", "Slot 4", "Slot 5"];

/// Everything needed to resume play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    /// Save format version for compatibility checking.
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub knowledge: KnowledgeStore,
    pub completion: CompletionMap,
    pub player_x: f32,
    pub deck: DeckId,
    pub lift_y: f32,
    pub deck_index: usize,
}

impl SaveRecord {
    /// Stamp a record with the current version and time.
    pub fn new(
        knowledge: KnowledgeStore,
        completion: CompletionMap,
        player_x: f32,
        deck: DeckId,
        lift_y: f32,
        deck_index: usize,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            saved_at: Utc::now(),
            knowledge,
            completion,
            player_x,
            deck,
            lift_y,
            deck_index,
        }
    }
}

/// A slot as listed in the save and load menus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    pub name: String,
    /// When the slot was last written, `None` if it is empty.
    pub saved_at: Option<DateTime<Utc>>,
}

impl SlotInfo {
    pub fn is_empty(&self) -> bool {
        self.saved_at.is_none()
    }
}

/// The save directory and its named slots.
#[derive(Debug, Clone)]
pub struct SaveSlots {
    dir: PathBuf,
    autosave: String,
}

impl SaveSlots {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            autosave: AUTOSAVE_SLOT.to_string(),
        }
    }

    /// Use a different name for the autosave slot.
    pub fn with_autosave(mut self, slot: impl Into<String>) -> Self {
        self.autosave = slot.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn autosave_slot(&self) -> &str {
        &self.autosave
    }

    /// File backing a slot.
    pub fn path_for(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_slot_name(slot)))
    }

    /// Write a record to a slot, replacing its previous content.
    pub fn save(&self, slot: &str, record: &SaveRecord) -> Result<PathBuf, PersistError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| PersistError::io(&self.dir, e))?;

        let path = self.path_for(slot);
        let tmp = self.dir.join(format!(".{}.json.tmp", sanitize_slot_name(slot)));
        let content = serde_json::to_string_pretty(record)?;

        std::fs::write(&tmp, content).map_err(|e| PersistError::io(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| PersistError::io(&path, e))?;

        tracing::info!(slot, path = %path.display(), "game saved");
        Ok(path)
    }

    /// Read a record back from a slot.
    pub fn load(&self, slot: &str) -> Result<SaveRecord, PersistError> {
        let path = self.path_for(slot);
        if !path.exists() {
            return Err(PersistError::NotFound {
                slot: slot.to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|e| PersistError::io(&path, e))?;
        let record: SaveRecord = serde_json::from_str(&content)?;

        if record.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: record.version,
            });
        }

        tracing::info!(slot, facts = record.knowledge.len(), "game loaded");
        Ok(record)
    }

    /// When a slot was saved, without loading the full state.
    ///
    /// Unreadable or outdated files count as empty.
    pub fn peek(&self, slot: &str) -> Option<DateTime<Utc>> {
        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            saved_at: DateTime<Utc>,
        }

        let content = std::fs::read_to_string(self.path_for(slot)).ok()?;
        let partial: Partial = serde_json::from_str(&content).ok()?;
        (partial.version == SAVE_VERSION).then_some(partial.saved_at)
    }

    /// The fixed slot list, with the autosave slot first when requested.
    pub fn list_slots(&self, include_autosave: bool) -> Vec<SlotInfo> {
        let autosave = include_autosave.then_some(self.autosave.as_str());
        autosave
            .into_iter()
            .chain(MANUAL_SLOTS)
            .map(|name| SlotInfo {
                name: name.to_string(),
                saved_at: self.peek(name),
            })
            .collect()
    }
}

/// File-system safe form of a slot name.
pub fn sanitize_slot_name(slot: &str) -> String {
    let name: String = slot
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}
