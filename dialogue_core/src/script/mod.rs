//! Dialogue scripts - parsing and the loaded library of compiled menus.

mod parser;

pub use parser::parse_script;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::effects::EffectRegistry;
use crate::tree::Menu;

/// File extension of dialogue scripts.
pub const SCRIPT_EXTENSION: &str = "txt";

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("{file}:{line}: unknown action `{action}`")]
    UnknownAction {
        file: String,
        line: usize,
        action: String,
    },

    #[error("{file}:{line}: malformed topic header `{text}`")]
    MalformedHeader {
        file: String,
        line: usize,
        text: String,
    },

    #[error("{file}:{line}: text outside of a PLAYER or OTHER step")]
    TextOutsideStep { file: String, line: usize },

    #[error("{file}:{line}: action before the first topic header")]
    ActionOutsideTopic { file: String, line: usize },

    #[error("{file}:{line}: `{action}` needs a value")]
    MissingValue {
        file: String,
        line: usize,
        action: String,
    },

    #[error("{file}:{line}: `{segment}` in `{key}` is a topic, not a menu")]
    NotAMenu {
        file: String,
        line: usize,
        key: String,
        segment: String,
    },

    #[error("{file}:{line}: `{key}` is a menu, not a topic")]
    NotATopic {
        file: String,
        line: usize,
        key: String,
    },

    #[error("{file}:{line}: no registered effect named `{effect}`")]
    UnknownEffect {
        file: String,
        line: usize,
        effect: String,
    },

    #[error("{file}: no topic ever exits the conversation")]
    NoExit { file: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Compiled scripts keyed by namespace (the file stem).
#[derive(Debug, Clone, Default)]
pub struct ScriptLibrary {
    scripts: HashMap<String, Menu>,
}

impl ScriptLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every `*.txt` script in a directory.
    ///
    /// Fails on the first script that doesn't parse; nothing is returned
    /// partially loaded.
    pub fn load_dir(dir: impl AsRef<Path>, effects: &EffectRegistry) -> Result<Self, ScriptError> {
        let dir = dir.as_ref();
        let io_error = |source| ScriptError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            let path = entry.map_err(io_error)?.path();
            if path.extension().is_some_and(|ext| ext == SCRIPT_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut library = Self::new();
        for path in paths {
            let Some(namespace) = path.file_stem().and_then(|stem| stem.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping script with a non UTF-8 name");
                continue;
            };
            let namespace = namespace.to_string();

            let source = std::fs::read_to_string(&path).map_err(|source| ScriptError::Io {
                path: path.clone(),
                source,
            })?;
            library.parse_source(&namespace, &path.display().to_string(), &source, effects)?;
        }

        tracing::info!(dir = %dir.display(), scripts = library.len(), "loaded dialogue scripts");
        Ok(library)
    }

    /// Parse one script and register it under `namespace`, replacing any previous one.
    pub fn parse_source(
        &mut self,
        namespace: &str,
        file: &str,
        source: &str,
        effects: &EffectRegistry,
    ) -> Result<(), ScriptError> {
        let menu = parse_script(namespace, file, source, effects)?;
        tracing::debug!(namespace, topics = menu.len(), "parsed script");
        self.insert(namespace, menu);
        Ok(())
    }

    pub fn insert(&mut self, namespace: impl Into<String>, menu: Menu) {
        self.scripts.insert(namespace.into(), menu);
    }

    /// Root menu of a script.
    pub fn get(&self, namespace: &str) -> Option<&Menu> {
        self.scripts.get(namespace)
    }

    /// A menu inside a script, addressed by sub-menu path.
    pub fn menu(&self, namespace: &str, path: &[String]) -> Option<&Menu> {
        self.get(namespace)?.submenu(path)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.scripts.contains_key(namespace)
    }

    /// Loaded namespaces, sorted.
    pub fn namespaces(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.scripts.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_dir_reads_only_scripts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kitty.txt"), "[enter]\nOTHER: Hello.\n[Bye]\n").unwrap();
        std::fs::write(dir.path().join("captain.txt"), "[Bye]\nOTHER: Dismissed.\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "not a script").unwrap();

        let library = ScriptLibrary::load_dir(dir.path(), &EffectRegistry::new()).unwrap();

        assert_eq!(library.namespaces(), vec!["captain", "kitty"]);
        assert!(library.get("kitty").unwrap().enter().is_some());
        assert!(!library.contains("notes"));
    }

    #[test]
    fn test_load_dir_fails_on_bad_script() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kitty.txt"), "[Chat]\nOTHER: Endless.\n").unwrap();

        let err = ScriptLibrary::load_dir(dir.path(), &EffectRegistry::new()).unwrap_err();
        assert!(matches!(err, ScriptError::NoExit { ref file } if file.ends_with("kitty.txt")));
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScriptLibrary::load_dir(dir.path().join("nope"), &EffectRegistry::new()).unwrap_err();
        assert!(matches!(err, ScriptError::Io { .. }));
    }

    #[test]
    fn test_menu_by_path() {
        let mut library = ScriptLibrary::new();
        library
            .parse_source("kitty", "kitty.txt", "[room.door]\nOTHER: Locked.\n[Bye]\n", &EffectRegistry::new())
            .unwrap();

        let room = vec!["room".to_string()];
        assert!(library.menu("kitty", &room).unwrap().topic("door").is_some());
        assert!(library.menu("kitty", &["nope".to_string()]).is_none());
        assert!(library.menu("captain", &[]).is_none());
    }
}
