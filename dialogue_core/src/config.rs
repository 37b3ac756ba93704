//! Engine configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use world_rules::{Camera, MovementRules};

use crate::effects::EffectRegistry;
use crate::persist::AUTOSAVE_SLOT;
use crate::session::DEFAULT_VISIBLE_CHOICES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Engine configuration, loaded from TOML. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding the `*.txt` dialogue scripts
    pub script_dir: PathBuf,
    /// Directory holding the save slots
    pub save_dir: PathBuf,
    /// World layout
    pub world_file: PathBuf,

    pub viewport_width: f32,
    pub walk_speed: f32,
    pub interact_radius: f32,
    pub edge_margin: f32,

    /// Choices shown at once in a dialogue list
    pub visible_choices: usize,
    /// Vertical distance between lift stops
    pub lift_spacing: f32,

    pub autosave_slot: String,
    /// Script played as a root session when a new game starts
    pub intro_script: String,
    /// Name the player's lines are attributed to
    pub player_name: String,

    /// Effects scripts may `EXEC`, as `[effects.<name>]` tables
    pub effects: EffectRegistry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let movement = MovementRules::default();
        Self {
            script_dir: PathBuf::from("scripts"),
            save_dir: PathBuf::from("saves"),
            world_file: PathBuf::from("world.toml"),
            viewport_width: Camera::default().viewport_width,
            walk_speed: movement.walk_speed,
            interact_radius: movement.interact_radius,
            edge_margin: movement.edge_margin,
            visible_choices: DEFAULT_VISIBLE_CHOICES,
            lift_spacing: 100.0,
            autosave_slot: AUTOSAVE_SLOT.to_string(),
            intro_script: "intro".to_string(),
            player_name: "Billy".to_string(),
            effects: EffectRegistry::new(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load configuration from a TOML file.
    ///
    /// Relative directories are resolved against the file's own directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&source)?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        tracing::info!(path = %path.display(), effects = config.effects.len(), "config loaded");
        Ok(config)
    }

    /// Resolve relative paths against `base`.
    pub fn rebase(&mut self, base: &Path) {
        for dir in [&mut self.script_dir, &mut self.save_dir, &mut self.world_file] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    pub fn movement(&self) -> MovementRules {
        MovementRules {
            walk_speed: self.walk_speed,
            edge_margin: self.edge_margin,
            interact_radius: self.interact_radius,
        }
    }

    pub fn camera(&self) -> Camera {
        Camera::new(self.viewport_width)
    }
}
