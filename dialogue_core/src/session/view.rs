//! Read-only snapshots of a session for the driver to draw.

use serde::Serialize;

use crate::tree::{Choice, ChoiceKind, Speaker};

/// What a dialogue session currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DialogueView {
    Choices(ChoiceListView),
    Line(LineView),
}

/// A spoken line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineView {
    pub speaker: Speaker,
    /// Display name of the speaker.
    pub name: String,
    pub text: String,
    pub color: &'static str,
}

/// One visible row of a choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceRow {
    /// Index into the full list.
    pub index: usize,
    pub label: String,
    pub seen: bool,
    pub submenu: bool,
    pub highlighted: bool,
}

/// The scrolled window of a choice list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChoiceListView {
    pub rows: Vec<ChoiceRow>,
    pub selected: usize,
    pub offset: usize,
    pub total: usize,
    pub more_above: bool,
    pub more_below: bool,
}

impl ChoiceListView {
    pub(crate) fn window(choices: &[Choice], selected: usize, offset: usize, visible: usize) -> Self {
        let rows = choices
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(index, choice)| ChoiceRow {
                index,
                label: choice.key.clone(),
                seen: choice.seen,
                submenu: choice.kind == ChoiceKind::Menu,
                highlighted: index == selected,
            })
            .collect();

        Self {
            rows,
            selected,
            offset,
            total: choices.len(),
            more_above: offset > 0,
            more_below: offset + visible < choices.len(),
        }
    }
}
