//! Line-oriented parser for dialogue scripts.
//!
//! ```text
//! [enter]
//! OTHER: Oh! You startled me.
//!
//! [About yourself]
//! OTHER: I'm Kitty Morgan. I sing in the lounge,
//! when they let me.
//! LEARN: Kitty Morgan
//!
//! [Kitty Morgan?] if .met, Murder
//! PLAYER: Where were you last night?
//!
//! [Bye]
//! OTHER: Toodle-oo.
//! ```

use world_rules::{Condition, Fact};

use super::ScriptError;
use crate::effects::EffectRegistry;
use crate::tree::{is_goodbye, Menu, Speaker, Step};

/// Compile one script into its root menu.
///
/// `namespace` expands `.token` facts; `file` is only used in error messages.
pub fn parse_script(
    namespace: &str,
    file: &str,
    source: &str,
    effects: &EffectRegistry,
) -> Result<Menu, ScriptError> {
    let mut parser = ScriptParser {
        namespace,
        file,
        effects,
        root: Menu::new(),
        block: None,
    };

    for (index, line) in source.lines().enumerate() {
        parser.parse_line(index + 1, line)?;
    }
    parser.finish_block()?;

    if !parser.root.has_exit() {
        return Err(ScriptError::NoExit {
            file: file.to_string(),
        });
    }

    Ok(parser.root)
}

/// A topic variant being assembled.
struct Block {
    line: usize,
    key: String,
    condition: Condition,
    steps: Vec<Step>,
    text: Option<SpokenText>,
}

/// Raw lines of a spoken step, wrapped on flush.
struct SpokenText {
    speaker: Speaker,
    lines: Vec<String>,
}

impl SpokenText {
    /// Join single line breaks with spaces; blank lines separate paragraphs.
    fn wrap(&self) -> String {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in &self.lines {
            if line.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join(" "));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join(" "));
        }

        paragraphs.join("\n\n")
    }
}

impl Block {
    fn flush_text(&mut self) {
        if let Some(text) = self.text.take() {
            self.steps.push(Step::Speak {
                speaker: text.speaker,
                text: text.wrap(),
            });
        }
    }
}

struct ScriptParser<'a> {
    namespace: &'a str,
    file: &'a str,
    effects: &'a EffectRegistry,
    root: Menu,
    block: Option<Block>,
}

impl<'a> ScriptParser<'a> {
    fn parse_line(&mut self, line_no: usize, raw: &str) -> Result<(), ScriptError> {
        let line = raw.trim_end();

        if line.trim_start().starts_with('#') {
            return Ok(());
        }

        if line.starts_with('[') {
            self.finish_block()?;
            self.block = Some(self.parse_header(line_no, line)?);
            return Ok(());
        }

        if let Some((action, value)) = split_action(line) {
            return self.push_action(line_no, action, value.trim());
        }

        let text = line.trim();
        match self.block.as_mut().and_then(|block| block.text.as_mut()) {
            Some(spoken) => {
                spoken.lines.push(text.to_string());
                Ok(())
            }
            None if text.is_empty() => Ok(()),
            None => Err(ScriptError::TextOutsideStep {
                file: self.file.to_string(),
                line: line_no,
            }),
        }
    }

    /// `[key]`, `[key?]` or `[key]?`, optionally followed by `if fact, fact`.
    fn parse_header(&self, line_no: usize, line: &str) -> Result<Block, ScriptError> {
        let malformed = || ScriptError::MalformedHeader {
            file: self.file.to_string(),
            line: line_no,
            text: line.to_string(),
        };

        let close = line.find(']').ok_or_else(malformed)?;
        let mut key = line[1..close].trim();
        let mut rest = &line[close + 1..];
        let mut self_gated = false;

        if let Some(stripped) = rest.strip_prefix('?') {
            self_gated = true;
            rest = stripped;
        }
        if let Some(stripped) = key.strip_suffix('?') {
            self_gated = true;
            key = stripped.trim_end();
        }

        if key.is_empty() || key.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(malformed());
        }

        let mut condition = Condition::always();
        if self_gated {
            condition.insert(Fact::new(key));
        }

        let rest = rest.trim();
        if !rest.is_empty() {
            let facts = rest.strip_prefix("if ").ok_or_else(malformed)?;
            for token in facts.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    return Err(malformed());
                }
                condition.insert(Fact::namespaced(self.namespace, token));
            }
        }

        Ok(Block {
            line: line_no,
            key: key.to_string(),
            condition,
            steps: Vec::new(),
            text: None,
        })
    }

    fn push_action(&mut self, line_no: usize, action: &str, value: &str) -> Result<(), ScriptError> {
        let file = self.file;
        let namespace = self.namespace;
        let effects = self.effects;

        let block = self
            .block
            .as_mut()
            .ok_or_else(|| ScriptError::ActionOutsideTopic {
                file: file.to_string(),
                line: line_no,
            })?;
        block.flush_text();

        let required = |value: &str| {
            if value.is_empty() {
                Err(ScriptError::MissingValue {
                    file: file.to_string(),
                    line: line_no,
                    action: action.to_string(),
                })
            } else {
                Ok(())
            }
        };

        match action {
            "PLAYER" | "OTHER" => {
                let speaker = if action == "PLAYER" {
                    Speaker::Player
                } else {
                    Speaker::Other
                };
                block.text = Some(SpokenText {
                    speaker,
                    lines: vec![value.to_string()],
                });
            }
            "EXIT" => block.steps.push(Step::Exit),
            "LEARN" => {
                required(value)?;
                block.steps.push(Step::Learn(Fact::namespaced(namespace, value)));
            }
            "FORGET" => {
                required(value)?;
                block.steps.push(Step::Forget(Fact::namespaced(namespace, value)));
            }
            "EXEC" => {
                required(value)?;
                let effect = effects
                    .resolve(value)
                    .ok_or_else(|| ScriptError::UnknownEffect {
                        file: file.to_string(),
                        line: line_no,
                        effect: value.to_string(),
                    })?;
                block.steps.push(Step::Exec(effect.clone()));
            }
            _ => {
                return Err(ScriptError::UnknownAction {
                    file: file.to_string(),
                    line: line_no,
                    action: action.to_string(),
                })
            }
        }

        Ok(())
    }

    /// Close the open block and file its variant under its (possibly dotted) key.
    fn finish_block(&mut self) -> Result<(), ScriptError> {
        let Some(mut block) = self.block.take() else {
            return Ok(());
        };
        block.flush_text();

        let segments: Vec<&str> = block.key.split('.').map(str::trim).collect();
        let (leaf, parents) = match segments.split_last() {
            Some(split) => split,
            None => return Ok(()),
        };

        if is_goodbye(leaf) && !block.steps.last().is_some_and(Step::is_exit) {
            block.steps.push(Step::Exit);
        }

        let mut menu = &mut self.root;
        for segment in parents {
            menu = match menu.submenu_mut(segment) {
                Some(sub) => sub,
                None => {
                    return Err(ScriptError::NotAMenu {
                        file: self.file.to_string(),
                        line: block.line,
                        key: block.key.clone(),
                        segment: segment.to_string(),
                    })
                }
            };
        }

        match menu.topic_mut(leaf) {
            Some(topic) => {
                topic.push_variant(block.condition, block.steps);
                Ok(())
            }
            None => Err(ScriptError::NotATopic {
                file: self.file.to_string(),
                line: block.line,
                key: block.key.clone(),
            }),
        }
    }
}

/// Split `ACTION: value` lines. Actions are all-caps words of two or more letters.
fn split_action(line: &str) -> Option<(&str, &str)> {
    let (head, rest) = line.split_once(':')?;
    let is_action = head.len() >= 2
        && head.starts_with(|c: char| c.is_ascii_uppercase())
        && head.chars().all(|c| c.is_ascii_uppercase() || c == '_');
    is_action.then_some((head, rest))
}
