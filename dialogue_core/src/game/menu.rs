//! The pause menu and its save/load slot lists.

use serde::Serialize;

use crate::persist::{SaveSlots, SlotInfo};

/// Which page of the game menu is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuScreen {
    Pause,
    Save,
    Load,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum MenuItem {
    Resume,
    Save,
    Load,
    Quit,
    Slot(SlotInfo),
}

impl MenuItem {
    fn label(&self) -> String {
        match self {
            MenuItem::Resume => "Resume".to_string(),
            MenuItem::Save => "Save".to_string(),
            MenuItem::Load => "Load".to_string(),
            MenuItem::Quit => "Quit".to_string(),
            MenuItem::Slot(slot) => slot.name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct MenuPage {
    screen: MenuScreen,
    items: Vec<MenuItem>,
    selected: usize,
}

/// What the game should do after a menu selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    /// Stay in the menu.
    Stay,
    Close,
    Quit,
    SaveTo(String),
    LoadFrom(String),
}

/// The game menu, opened with escape.
#[derive(Debug, Clone)]
pub struct GameMenu {
    pages: Vec<MenuPage>,
}

impl GameMenu {
    pub fn pause() -> Self {
        Self {
            pages: vec![MenuPage {
                screen: MenuScreen::Pause,
                items: vec![MenuItem::Resume, MenuItem::Save, MenuItem::Load, MenuItem::Quit],
                selected: 0,
            }],
        }
    }

    pub fn screen(&self) -> MenuScreen {
        self.pages.last().map_or(MenuScreen::Pause, |page| page.screen)
    }

    pub fn up(&mut self) {
        if let Some(page) = self.pages.last_mut() {
            let len = page.items.len();
            page.selected = (page.selected + len - 1) % len;
        }
    }

    pub fn down(&mut self) {
        if let Some(page) = self.pages.last_mut() {
            page.selected = (page.selected + 1) % page.items.len();
        }
    }

    pub fn select(&mut self, slots: &SaveSlots) -> MenuAction {
        let Some(page) = self.pages.last() else {
            return MenuAction::Close;
        };
        let screen = page.screen;
        let Some(item) = page.items.get(page.selected).cloned() else {
            return MenuAction::Stay;
        };

        match (screen, item) {
            (_, MenuItem::Resume) => MenuAction::Close,
            (_, MenuItem::Quit) => MenuAction::Quit,
            (_, MenuItem::Save) => {
                self.open_slots(MenuScreen::Save, slots);
                MenuAction::Stay
            }
            (_, MenuItem::Load) => {
                self.open_slots(MenuScreen::Load, slots);
                MenuAction::Stay
            }
            (MenuScreen::Load, MenuItem::Slot(slot)) if slot.is_empty() => MenuAction::Stay,
            (MenuScreen::Load, MenuItem::Slot(slot)) => MenuAction::LoadFrom(slot.name),
            (_, MenuItem::Slot(slot)) => MenuAction::SaveTo(slot.name),
        }
    }

    fn open_slots(&mut self, screen: MenuScreen, slots: &SaveSlots) {
        let items = slots
            .list_slots(screen == MenuScreen::Load)
            .into_iter()
            .map(MenuItem::Slot)
            .collect();
        self.pages.push(MenuPage {
            screen,
            items,
            selected: 0,
        });
    }

    /// Go back one page. Returns `true` when the menu should close.
    pub fn back(&mut self) -> bool {
        self.pages.pop();
        self.pages.is_empty()
    }

    pub fn view(&self) -> GameMenuView {
        let Some(page) = self.pages.last() else {
            return GameMenuView {
                screen: MenuScreen::Pause,
                items: Vec::new(),
            };
        };

        let items = page
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let saved_at = match item {
                    MenuItem::Slot(slot) => slot.saved_at.map(|at| at.format("%Y-%m-%d %H:%M").to_string()),
                    _ => None,
                };
                let enabled = match (page.screen, item) {
                    (MenuScreen::Load, MenuItem::Slot(slot)) => !slot.is_empty(),
                    _ => true,
                };
                GameMenuItemView {
                    label: item.label(),
                    saved_at,
                    enabled,
                    highlighted: index == page.selected,
                }
            })
            .collect();

        GameMenuView {
            screen: page.screen,
            items,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameMenuItemView {
    pub label: String,
    /// Last save time for slot entries.
    pub saved_at: Option<String>,
    pub enabled: bool,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameMenuView {
    pub screen: MenuScreen,
    pub items: Vec<GameMenuItemView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{SaveRecord, AUTOSAVE_SLOT};
    use crate::tree::CompletionMap;
    use world_rules::{DeckId, KnowledgeStore};

    fn labels(menu: &GameMenu) -> Vec<String> {
        menu.view().items.into_iter().map(|item| item.label).collect()
    }

    #[test]
    fn test_pause_menu_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let slots = SaveSlots::new(dir.path());
        let mut menu = GameMenu::pause();

        assert_eq!(labels(&menu), vec!["Resume", "Save", "Load", "Quit"]);
        assert_eq!(menu.select(&slots), MenuAction::Close);

        menu.up();
        assert_eq!(menu.select(&slots), MenuAction::Quit);
    }

    #[test]
    fn test_save_list_excludes_autosave() {
        let dir = tempfile::tempdir().unwrap();
        let slots = SaveSlots::new(dir.path());
        let mut menu = GameMenu::pause();

        menu.down();
        assert_eq!(menu.select(&slots), MenuAction::Stay);
        assert_eq!(menu.screen(), MenuScreen::Save);
        assert_eq!(labels(&menu)[0], "Slot 1");
        assert_eq!(menu.select(&slots), MenuAction::SaveTo("Slot 1".to_string()));

        assert!(!menu.back());
        assert_eq!(menu.screen(), MenuScreen::Pause);
        assert!(menu.back());
    }

    #[test]
    fn test_empty_load_slots_are_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let slots = SaveSlots::new(dir.path());
        let record = SaveRecord::new(
            KnowledgeStore::new(),
            CompletionMap::new(),
            100.0,
            DeckId::new("deck1"),
            100.0,
            0,
        );
        slots.save("Slot 1", &record).unwrap();

        let mut menu = GameMenu::pause();
        menu.down();
        menu.down();
        menu.select(&slots);
        assert_eq!(menu.screen(), MenuScreen::Load);

        let view = menu.view();
        assert_eq!(view.items[0].label, AUTOSAVE_SLOT);
        assert!(!view.items[0].enabled);
        assert!(view.items[1].enabled);
        assert!(view.items[1].saved_at.is_some());

        assert_eq!(menu.select(&slots), MenuAction::Stay);
        menu.down();
        assert_eq!(menu.select(&slots), MenuAction::LoadFrom("Slot 1".to_string()));
    }
}
