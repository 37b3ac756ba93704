//! The game facade the driver talks to.
//!
//! The driver forwards discrete input (`on_move`, `on_menu_select`, ...),
//! calls [`Game::tick`] once per frame, drains [`GameEvent`]s and renders
//! [`Game::view`]. Everything in between is synchronous.

mod menu;
mod view;

pub use menu::*;
pub use view::*;

use std::path::{Path, PathBuf};

use thiserror::Error;
use world_rules::{
    lift_height, ActorId, AnimationState, DeckId, Direction, Interaction, KnowledgeStore, Player, Prompt, World, WorldError,
};

use crate::config::{ConfigError, EngineConfig};
use crate::effects::Effect;
use crate::events::GameEvent;
use crate::persist::{PersistError, SaveRecord, SaveSlots};
use crate::script::{ScriptError, ScriptLibrary};
use crate::session::{DialogueContext, DialogueSession, SessionStatus};
use crate::tree::CompletionMap;

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything a save captures.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub knowledge: KnowledgeStore,
    pub completion: CompletionMap,
    pub player: Player,
}

impl GameState {
    /// Fresh state with the player at the world's start position.
    pub fn new(world: &World, lift_spacing: f32) -> Self {
        let mut player = Player::new(world.start.deck.clone(), world.start.x);
        if let Some(index) = world.lift_stop_index(&world.start.deck) {
            player.deck_index = index;
            player.lift_y = lift_height(index, lift_spacing);
        }

        Self {
            knowledge: KnowledgeStore::new(),
            completion: CompletionMap::new(),
            player,
        }
    }

    fn to_record(&self) -> SaveRecord {
        SaveRecord::new(
            self.knowledge.clone(),
            self.completion.clone(),
            self.player.x,
            self.player.deck.clone(),
            self.player.lift_y,
            self.player.deck_index,
        )
    }
}

pub struct Game {
    config: EngineConfig,
    world: World,
    scripts: ScriptLibrary,
    slots: SaveSlots,
    state: GameState,
    camera_offset: f32,
    session: Option<DialogueSession>,
    menu: Option<GameMenu>,
    music: Option<String>,
    ending: Option<String>,
    moved: bool,
    interact_held: bool,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(config: EngineConfig, world: World, scripts: ScriptLibrary) -> Self {
        let slots = SaveSlots::new(config.save_dir.clone()).with_autosave(config.autosave_slot.clone());
        let state = GameState::new(&world, config.lift_spacing);
        let camera_offset = world
            .deck(&state.player.deck)
            .map_or(0.0, |deck| config.camera().frame(state.player.x, deck.width));

        Self {
            config,
            world,
            scripts,
            slots,
            state,
            camera_offset,
            session: None,
            menu: None,
            music: None,
            ending: None,
            moved: false,
            interact_held: false,
            events: Vec::new(),
        }
    }

    /// Load the world layout and scripts named by the config.
    pub fn from_config(config: EngineConfig) -> Result<Self, GameError> {
        let world = World::from_file(&config.world_file)?;
        config.effects.validate(&world)?;
        let scripts = ScriptLibrary::load_dir(&config.script_dir, &config.effects)?;
        Ok(Self::new(config, world, scripts))
    }

    /// Read a TOML config file, then load everything it names.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, GameError> {
        Self::from_config(EngineConfig::from_file(path)?)
    }

    /// Resume from the autosave, or start a new game with the intro.
    ///
    /// Returns `true` if a save was resumed.
    pub fn launch(&mut self) -> bool {
        let slot = self.slots.autosave_slot().to_string();
        match self.load(&slot) {
            Ok(()) => true,
            Err(GameError::Persist(PersistError::NotFound { .. })) => {
                tracing::info!("no autosave, starting a new game");
                self.new_game();
                false
            }
            Err(err) => {
                tracing::warn!(error = %err, "autosave unusable, starting a new game");
                self.new_game();
                false
            }
        }
    }

    fn new_game(&mut self) {
        self.state = GameState::new(&self.world, self.config.lift_spacing);
        self.session = None;
        self.menu = None;
        self.ending = None;

        let start = self.world.start.clone();
        self.enter_deck(&start.deck, Some(start.x));

        let intro = self.config.intro_script.clone();
        if self.scripts.contains(&intro) {
            self.start_session(&intro, "", None);
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn scripts(&self) -> &ScriptLibrary {
        &self.scripts
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn session(&self) -> Option<&DialogueSession> {
        self.session.as_ref()
    }

    pub fn music(&self) -> Option<&str> {
        self.music.as_deref()
    }

    pub fn ending(&self) -> Option<&str> {
        self.ending.as_deref()
    }

    pub fn camera_offset(&self) -> f32 {
        self.camera_offset
    }

    /// Take all events queued since the last call.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: GameEvent) {
        tracing::debug!(event = event.kind(), "game event");
        self.events.push(event);
    }

    fn is_busy(&self) -> bool {
        self.menu.is_some() || self.session.is_some() || self.ending.is_some()
    }

    // Input

    pub fn on_move(&mut self, direction: Direction) {
        if self.menu.is_some() || self.ending.is_some() {
            return;
        }
        if self.state.player.in_lift {
            if matches!(direction, Direction::Up | Direction::Down) {
                self.ride_lift(direction);
            }
            return;
        }
        if self.session.is_some() {
            return;
        }

        let Some(width) = self.world.deck(&self.state.player.deck).map(|deck| deck.width) else {
            return;
        };
        if matches!(direction, Direction::Left | Direction::Right) {
            self.state.player.walk(direction, &self.config.movement(), width);
            self.camera_offset = self
                .config
                .camera()
                .follow(self.camera_offset, self.state.player.x, width);
            self.moved = true;
        }
    }

    /// Use whatever is on offer. Holding the key down doesn't repeat.
    pub fn on_interact_pressed(&mut self) {
        if self.interact_held {
            return;
        }
        self.interact_held = true;

        if self.is_busy() {
            return;
        }
        if self.state.player.in_lift {
            self.leave_lift();
            return;
        }
        if let Some(prompt) = self.prompt() {
            self.interact(prompt.interaction);
        }
    }

    pub fn on_interact_released(&mut self) {
        self.interact_held = false;
    }

    pub fn on_menu_up(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            menu.up();
        } else if let Some(session) = self.session.as_mut() {
            session.up();
        }
    }

    pub fn on_menu_down(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            menu.down();
        } else if let Some(session) = self.session.as_mut() {
            session.down();
        }
    }

    /// Confirm in the game menu, pick a dialogue choice, advance a line or leave the lift.
    pub fn on_menu_select(&mut self) -> Result<(), GameError> {
        if let Some(menu) = self.menu.as_mut() {
            match menu.select(&self.slots) {
                MenuAction::Stay => {}
                MenuAction::Close => self.menu = None,
                MenuAction::Quit => self.emit(GameEvent::QuitRequested),
                MenuAction::SaveTo(slot) => {
                    self.save(&slot)?;
                    self.menu = None;
                }
                MenuAction::LoadFrom(slot) => self.load(&slot)?,
            }
            return Ok(());
        }

        if self.session.is_some() {
            self.drive_session(|session, ctx| session.select(ctx));
        } else if self.state.player.in_lift {
            self.leave_lift();
        }
        Ok(())
    }

    pub fn on_menu_back(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            if menu.back() {
                self.menu = None;
            }
        } else if self.session.is_some() {
            self.drive_session(|session, ctx| session.back(ctx));
        }
    }

    /// Open the pause menu, or go back one page if it is open.
    pub fn on_escape(&mut self) {
        match self.menu.as_mut() {
            Some(menu) => {
                if menu.back() {
                    self.menu = None;
                }
            }
            None => self.menu = Some(GameMenu::pause()),
        }
    }

    /// Re-read the script directory. On failure the loaded scripts stay in place.
    pub fn on_reload_scripts(&mut self) -> Result<usize, GameError> {
        match ScriptLibrary::load_dir(&self.config.script_dir, &self.config.effects) {
            Ok(scripts) => {
                let count = scripts.len();
                self.scripts = scripts;
                self.emit(GameEvent::ScriptsReloaded { scripts: count });
                Ok(count)
            }
            Err(err) => {
                tracing::warn!(error = %err, "script reload failed, keeping previous scripts");
                Err(err.into())
            }
        }
    }

    /// End-of-frame bookkeeping.
    pub fn tick(&mut self) {
        if !self.moved && self.state.player.animation == AnimationState::Walking {
            self.state.player.rest();
        }
        self.moved = false;
    }

    // World

    /// The action currently on offer, if the player is free to act.
    pub fn prompt(&self) -> Option<Prompt> {
        if self.is_busy() || self.state.player.in_lift {
            return None;
        }
        self.world.prompt_at(
            &self.state.player.deck,
            self.state.player.x,
            &self.state.knowledge,
            &self.config.movement(),
        )
    }

    fn interact(&mut self, interaction: Interaction) {
        match interaction {
            Interaction::Talk { actor, name, script } => {
                self.start_session(&script, &name, Some(actor));
            }
            Interaction::Observe { name, script } => {
                self.start_session(&script, &name, None);
            }
            Interaction::Teleport { deck, x } => {
                self.enter_deck(&deck, x);
            }
            Interaction::EnterLift => self.board_lift(),
        }
    }

    /// Move the player to a deck, reframing the camera and switching music if needed.
    pub fn enter_deck(&mut self, deck_id: &DeckId, x: Option<f32>) -> bool {
        let Some(deck) = self.world.deck(deck_id) else {
            tracing::warn!(deck = %deck_id, "cannot enter unknown deck");
            return false;
        };
        let width = deck.width;
        let music = deck.music.clone();

        let player = &mut self.state.player;
        player.deck = deck_id.clone();
        player.x = self.config.movement().clamp(x.unwrap_or(player.x), width);
        if let Some(index) = self.world.lift_stop_index(deck_id) {
            player.deck_index = index;
            player.lift_y = lift_height(index, self.config.lift_spacing);
        }
        let x = player.x;

        self.camera_offset = self.config.camera().frame(x, width);
        self.emit(GameEvent::DeckEntered {
            deck: deck_id.clone(),
            x,
        });
        if let Some(track) = music {
            self.set_music(track);
        }
        true
    }

    fn set_music(&mut self, track: String) {
        if self.music.as_deref() == Some(track.as_str()) {
            return;
        }
        tracing::debug!(track = %track, "music changed");
        self.music = Some(track.clone());
        self.emit(GameEvent::MusicChanged { track: Some(track) });
    }

    fn board_lift(&mut self) {
        let Some(index) = self.world.lift_stop_index(&self.state.player.deck) else {
            tracing::warn!(deck = %self.state.player.deck, "lift does not stop at this deck");
            return;
        };
        self.state.player.board_lift(index, self.config.lift_spacing);
        self.emit_lift_moved();
    }

    fn ride_lift(&mut self, direction: Direction) {
        let stops = self.world.lift_stops.len();
        let Some(index) = self
            .state
            .player
            .ride_lift(direction, stops, self.config.lift_spacing)
        else {
            return;
        };
        if let Some(deck) = self.world.lift_stop(index) {
            self.state.player.deck = deck.clone();
        }
        self.emit_lift_moved();
    }

    fn emit_lift_moved(&mut self) {
        let player = &self.state.player;
        let event = GameEvent::LiftMoved {
            deck: player.deck.clone(),
            deck_index: player.deck_index,
            lift_y: player.lift_y,
        };
        self.emit(event);
    }

    fn leave_lift(&mut self) {
        self.state.player.leave_lift();
        let deck = self.state.player.deck.clone();
        let x = self.world.deck(&deck).and_then(|deck| deck.lift_x());
        self.enter_deck(&deck, x);
    }

    // Dialogue

    fn start_session(&mut self, namespace: &str, partner: &str, actor: Option<ActorId>) {
        if !self.scripts.contains(namespace) {
            tracing::warn!(namespace, "no dialogue script");
            return;
        }

        let mut effects = Vec::new();
        let mut ctx = DialogueContext {
            scripts: &self.scripts,
            knowledge: &mut self.state.knowledge,
            completion: &mut self.state.completion,
            effects: &mut effects,
        };
        let (session, status) = DialogueSession::open(
            namespace,
            partner,
            self.config.player_name.clone(),
            self.config.visible_choices,
            &mut ctx,
        );

        self.emit(GameEvent::SessionStarted {
            session: session.id(),
            namespace: namespace.to_string(),
            partner: partner.to_string(),
            actor,
        });
        self.session = Some(session);
        self.apply_effects(effects);
        if !status.is_active() {
            // Nothing to show: it ended while opening
            self.end_session(status == SessionStatus::Exited);
        }
    }

    fn drive_session(
        &mut self,
        op: impl FnOnce(&mut DialogueSession, &mut DialogueContext<'_>) -> SessionStatus,
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        let mut effects = Vec::new();
        let mut ctx = DialogueContext {
            scripts: &self.scripts,
            knowledge: &mut self.state.knowledge,
            completion: &mut self.state.completion,
            effects: &mut effects,
        };
        let status = op(session, &mut ctx);

        self.apply_effects(effects);
        if !status.is_active() {
            self.end_session(status == SessionStatus::Exited);
        }
    }

    fn end_session(&mut self, exited: bool) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.emit(GameEvent::SessionEnded {
            session: session.id(),
            exited,
        });
        if exited {
            self.autosave_quietly();
        }
    }

    fn apply_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            self.apply_effect(effect);
        }
    }

    fn apply_effect(&mut self, effect: Effect) {
        tracing::debug!(?effect, "applying effect");
        match effect {
            Effect::Ending { ending } => {
                self.ending = Some(ending.clone());
                self.emit(GameEvent::EndingTriggered { ending });
            }
            Effect::Teleport { deck, x } => {
                self.state.player.leave_lift();
                self.enter_deck(&deck, Some(x));
            }
            Effect::PlayMusic { track } => self.set_music(track),
            Effect::Signal { name } => self.emit(GameEvent::Signal { name }),
        }
    }

    // Persistence

    pub fn save(&mut self, slot: &str) -> Result<PathBuf, GameError> {
        let path = self.slots.save(slot, &self.state.to_record())?;
        self.emit(GameEvent::Saved {
            slot: slot.to_string(),
        });
        Ok(path)
    }

    pub fn autosave(&mut self) -> Result<PathBuf, GameError> {
        let slot = self.slots.autosave_slot().to_string();
        self.save(&slot)
    }

    fn autosave_quietly(&mut self) {
        if let Err(err) = self.autosave() {
            tracing::warn!(error = %err, "autosave failed");
        }
    }

    /// Replace the whole game state with a saved one.
    ///
    /// A saved deck that no longer exists leaves the player where they are.
    pub fn load(&mut self, slot: &str) -> Result<(), GameError> {
        let record = self.slots.load(slot)?;

        let mut player = self.state.player.clone();
        player.leave_lift();
        player.rest();
        if self.world.deck(&record.deck).is_some() {
            player.deck = record.deck;
            player.x = record.player_x;
            player.lift_y = record.lift_y;
            player.deck_index = record.deck_index;
        } else {
            tracing::warn!(deck = %record.deck, "saved deck no longer exists, keeping position");
        }

        self.state = GameState {
            knowledge: record.knowledge,
            completion: record.completion,
            player,
        };

        if let Some(session) = self.session.take() {
            self.emit(GameEvent::SessionEnded {
                session: session.id(),
                exited: false,
            });
        }
        self.menu = None;
        self.ending = None;

        let deck = self.state.player.deck.clone();
        let x = self.state.player.x;
        self.enter_deck(&deck, Some(x));
        self.emit(GameEvent::Loaded {
            slot: slot.to_string(),
        });
        Ok(())
    }

    // View

    pub fn view(&self) -> GameView {
        let player = &self.state.player;
        let deck = self.world.deck(&player.deck);
        let deck_name = deck.map_or_else(|| player.deck.to_string(), |deck| deck.name.clone());

        GameView {
            deck: player.deck.clone(),
            deck_width: deck.map_or(0.0, |deck| deck.width),
            camera_offset: self.camera_offset,
            player: PlayerView {
                x: player.x,
                facing: player.facing,
                animation: player.animation,
                in_lift: player.in_lift,
                lift_y: player.lift_y,
                lift_label: player
                    .in_lift
                    .then(|| format!("Deck {}: {}", player.deck_index + 1, deck_name)),
            },
            deck_name,
            prompt: self.prompt().map(|prompt| prompt.caption),
            dialogue: self.session.as_ref().and_then(DialogueSession::view),
            menu: self.menu.as_ref().map(GameMenu::view),
            ending: self.ending.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectRegistry;
    use crate::session::DialogueView;
    use world_rules::{Facing, Fact};

    const SHIP: &str = r#"
        lift_stops = ["deck1", "deck2"]

        [start]
        deck = "deck1"
        x = 400.0

        [[decks]]
        id = "deck1"
        name = "On Deck"
        width = 1600.0
        music = "waves"

        [[decks.actors]]
        name = "Kitty"
        x = 600.0
        script = "kitty"

        [[decks.interactables]]
        kind = "lift"
        x = 80.0

        [[decks.interactables]]
        kind = "door"
        x = 1000.0
        target = "cabin"
        target_x = 100.0
        requires = ["Cabin key"]

        [[decks]]
        id = "deck2"
        name = "Promenade"
        width = 1200.0
        music = "waves"

        [[decks.interactables]]
        kind = "lift"
        x = 90.0

        [[decks]]
        id = "cabin"
        name = "Kitty's Cabin"
        width = 500.0
        music = "piano"

        [[decks.interactables]]
        kind = "observation"
        x = 200.0
        name = "the wardrobe"
        script = "wardrobe"
    "#;

    const KITTY: &str = "\
[enter]
OTHER: Oh! You startled me.

[About yourself]
OTHER: I sing in the lounge. Here, take my key.
LEARN: Cabin key

[Bye]
OTHER: Toodle-oo.
";

    const WARDROBE: &str = "\
[enter]
OTHER: Furs, and a pistol.
LEARN: .pistol

[Take the pistol] if .pistol
EXEC: arrest
OTHER: You're under arrest!
EXIT:
";

    struct Fixture {
        _dir: tempfile::TempDir,
        game: Game,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let effects = EffectRegistry::new().with(
            "arrest",
            Effect::Ending {
                ending: "arrest".to_string(),
            },
        );

        let mut scripts = ScriptLibrary::new();
        scripts.parse_source("kitty", "kitty.txt", KITTY, &effects).unwrap();
        scripts.parse_source("wardrobe", "wardrobe.txt", WARDROBE, &effects).unwrap();

        let config = EngineConfig {
            save_dir: dir.path().join("saves"),
            script_dir: dir.path().join("scripts"),
            effects,
            ..EngineConfig::default()
        };
        let world = World::from_toml_str(SHIP).unwrap();
        let mut game = Game::new(config, world, scripts);
        game.launch();
        game.drain_events();

        Fixture { _dir: dir, game }
    }

    fn walk_to(game: &mut Game, x: f32) {
        let direction = if x < game.state.player.x {
            Direction::Left
        } else {
            Direction::Right
        };
        while (game.state.player.x - x).abs() >= 3.0 {
            game.on_move(direction);
            game.tick();
        }
    }

    fn press(game: &mut Game) {
        game.on_interact_pressed();
        game.on_interact_released();
    }

    fn line(game: &Game) -> String {
        match game.view().dialogue {
            Some(DialogueView::Line(line)) => line.text,
            other => panic!("expected a line, got {:?}", other),
        }
    }

    #[test]
    fn test_new_game_without_autosave() {
        let fixture = fixture();
        let game = &fixture.game;

        assert_eq!(game.state.player.deck, DeckId::new("deck1"));
        assert_eq!(game.state.player.x, 400.0);
        assert_eq!(game.music(), Some("waves"));
        assert!(game.session().is_none());
    }

    #[test]
    fn test_walking_and_standing() {
        let mut fixture = fixture();
        let game = &mut fixture.game;

        game.on_move(Direction::Right);
        assert_eq!(game.state.player.x, 403.0);
        assert_eq!(game.state.player.facing, Facing::Right);
        assert_eq!(game.state.player.animation, AnimationState::Walking);

        game.tick();
        assert_eq!(game.state.player.animation, AnimationState::Walking);
        game.tick();
        assert_eq!(game.state.player.animation, AnimationState::Standing);
        assert_eq!(game.state.player.facing, Facing::Front);
    }

    #[test]
    fn test_talking_unlocks_door_and_autosaves() {
        let mut fixture = fixture();
        let game = &mut fixture.game;

        walk_to(game, 1000.0);
        assert!(game.prompt().is_none(), "door is gated on the cabin key");

        walk_to(game, 600.0);
        assert_eq!(game.view().prompt.as_deref(), Some("Talk to Kitty"));
        press(game);
        assert_eq!(line(game), "Oh! You startled me.");
        assert!(game.prompt().is_none());

        game.on_menu_select().unwrap();
        game.on_menu_select().unwrap();
        assert_eq!(line(game), "I sing in the lounge. Here, take my key.");
        game.on_menu_select().unwrap();
        assert!(game.state.knowledge.knows(&Fact::new("Cabin key")));

        // Back on the list; Bye is the only unseen choice
        game.on_menu_select().unwrap();
        assert_eq!(line(game), "Toodle-oo.");
        game.on_menu_select().unwrap();
        assert!(game.session().is_none());

        let events = game.drain_events();
        assert!(matches!(
            events.first(),
            Some(GameEvent::SessionStarted { actor: Some(_), .. })
        ));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::SessionEnded { exited: true, .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::Saved { slot } if slot == "Auto-save")));

        walk_to(game, 1000.0);
        assert_eq!(game.view().prompt.as_deref(), Some("Go to Kitty's Cabin"));
        press(game);
        assert_eq!(game.state.player.deck, DeckId::new("cabin"));
        assert_eq!(game.state.player.x, 100.0);
        assert_eq!(game.music(), Some("piano"));
        // Narrow room is centered
        assert_eq!(game.camera_offset(), -150.0);
    }

    #[test]
    fn test_interact_does_not_repeat_while_held() {
        let mut fixture = fixture();
        let game = &mut fixture.game;
        walk_to(game, 600.0);

        game.on_interact_pressed();
        let first = game.session().map(DialogueSession::id);
        game.on_interact_pressed();
        assert_eq!(game.session().map(DialogueSession::id), first);
        assert!(first.is_some());
    }

    #[test]
    fn test_lift_ride() {
        let mut fixture = fixture();
        let game = &mut fixture.game;

        walk_to(game, 80.0);
        assert_eq!(game.view().prompt.as_deref(), Some("Take the lift"));
        press(game);
        assert!(game.state.player.in_lift);
        assert_eq!(game.view().player.lift_label.as_deref(), Some("Deck 1: On Deck"));

        game.on_move(Direction::Up);
        assert_eq!(game.state.player.deck_index, 0);

        game.on_move(Direction::Down);
        assert_eq!(game.state.player.deck, DeckId::new("deck2"));
        assert_eq!(game.state.player.lift_y, 200.0);
        assert_eq!(game.view().player.lift_label.as_deref(), Some("Deck 2: Promenade"));

        game.on_move(Direction::Down);
        assert_eq!(game.state.player.deck_index, 1, "no wrap past the last stop");

        game.drain_events();
        game.on_menu_select().unwrap();
        assert!(!game.state.player.in_lift);
        assert_eq!(game.state.player.x, 90.0);

        // Same track on both decks: no restart
        let events = game.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::DeckEntered { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::MusicChanged { .. })));
    }

    #[test]
    fn test_ending_plays_out_the_session() {
        let mut fixture = fixture();
        let game = &mut fixture.game;
        game.state.knowledge.learn(Fact::new("Cabin key"));
        game.enter_deck(&DeckId::new("cabin"), Some(200.0));

        press(game);
        assert_eq!(line(game), "Furs, and a pistol.");
        game.on_menu_select().unwrap();
        assert!(game.state.knowledge.knows(&Fact::new("wardrobe.pistol")));

        game.drain_events();
        game.on_menu_select().unwrap();
        assert_eq!(line(game), "You're under arrest!");
        assert_eq!(game.ending(), Some("arrest"));
        let events = game.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::EndingTriggered { ending } if ending == "arrest")));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::SessionEnded { .. })));

        game.on_menu_select().unwrap();
        assert!(game.session().is_none());
        let events = game.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::SessionEnded { exited: true, .. })));
        assert!(game.slots.load("Auto-save").is_ok());

        assert!(game.prompt().is_none());
        game.on_move(Direction::Left);
        assert_eq!(game.state.player.x, 200.0, "no walking after an ending");
    }

    #[test]
    fn test_session_exiting_while_opening_is_reported() {
        let mut fixture = fixture();
        let effects = fixture.game.config.effects.clone();
        fixture
            .game
            .scripts
            .parse_source("note", "note.txt", "[enter]\nLEARN: Cabin key\nEXIT:\n", &effects)
            .unwrap();

        let game = &mut fixture.game;
        game.start_session("note", "the note", None);
        assert!(game.session().is_none());
        assert!(game.state.knowledge.knows(&Fact::new("Cabin key")));

        let events = game.drain_events();
        let kinds: Vec<_> = events.iter().map(GameEvent::kind).collect();
        assert_eq!(kinds, vec!["session_started", "session_ended", "saved"]);
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::SessionEnded { exited: true, .. })));
    }

    #[test]
    fn test_save_load_round_trip() {
        let mut fixture = fixture();
        let game = &mut fixture.game;

        walk_to(game, 600.0);
        press(game);
        game.on_menu_select().unwrap();
        game.on_menu_select().unwrap();
        game.on_menu_select().unwrap();
        game.on_menu_back();

        game.save("Slot 1").unwrap();
        let saved = game.state.clone();

        game.state.knowledge.learn(Fact::new("Something else"));
        game.enter_deck(&DeckId::new("deck2"), Some(500.0));

        game.load("Slot 1").unwrap();
        assert_eq!(game.state.knowledge, saved.knowledge);
        assert_eq!(game.state.completion, saved.completion);
        assert_eq!(game.state.player.x, saved.player.x);
        assert_eq!(game.state.player.deck, saved.player.deck);
        assert!(game.session().is_none());
    }

    #[test]
    fn test_load_with_missing_deck_keeps_position() {
        let mut fixture = fixture();
        let game = &mut fixture.game;

        let record = SaveRecord::new(
            [Fact::new("Cabin key")].into_iter().collect(),
            CompletionMap::new(),
            700.0,
            DeckId::new("engine_room"),
            400.0,
            3,
        );
        game.slots.save("Slot 2", &record).unwrap();

        game.load("Slot 2").unwrap();
        assert!(game.state.knowledge.knows(&Fact::new("Cabin key")));
        assert_eq!(game.state.player.deck, DeckId::new("deck1"));
        assert_eq!(game.state.player.x, 400.0);
    }

    #[test]
    fn test_launch_resumes_autosave() {
        let mut fixture = fixture();
        fixture.game.enter_deck(&DeckId::new("deck2"), Some(300.0));
        fixture.game.autosave().unwrap();

        let config = fixture.game.config.clone();
        let world = fixture.game.world.clone();
        let scripts = fixture.game.scripts.clone();
        let mut resumed = Game::new(config, world, scripts);

        assert!(resumed.launch());
        assert_eq!(resumed.state.player.deck, DeckId::new("deck2"));
        assert_eq!(resumed.state.player.x, 300.0);
        assert!(resumed
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Loaded { .. })));
    }

    #[test]
    fn test_intro_plays_on_new_game() {
        let dir = tempfile::tempdir().unwrap();
        let mut scripts = ScriptLibrary::new();
        scripts
            .parse_source(
                "intro",
                "intro.txt",
                "[enter]\nOTHER: The Atlantic, 1931.\nEXIT:\n",
                &EffectRegistry::new(),
            )
            .unwrap();
        let config = EngineConfig {
            save_dir: dir.path().to_path_buf(),
            ..EngineConfig::default()
        };

        let mut game = Game::new(config, World::from_toml_str(SHIP).unwrap(), scripts);
        assert!(!game.launch());
        assert_eq!(line(&game), "The Atlantic, 1931.");

        game.on_menu_select().unwrap();
        assert!(game.session().is_none());
        assert!(game.slots.load("Auto-save").is_ok());
    }

    #[test]
    fn test_pause_menu_save_and_quit() {
        let mut fixture = fixture();
        let game = &mut fixture.game;

        game.on_escape();
        game.on_move(Direction::Right);
        assert_eq!(game.state.player.x, 400.0, "menu blocks movement");

        game.on_menu_down();
        game.on_menu_select().unwrap();
        game.on_menu_select().unwrap();
        assert!(game.view().menu.is_none());
        assert!(game.slots.load("Slot 1").is_ok());

        game.on_escape();
        game.on_menu_up();
        game.on_menu_select().unwrap();
        assert!(game
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::QuitRequested)));

        game.on_escape();
        assert!(game.view().menu.is_none());
    }

    #[test]
    fn test_reload_failure_keeps_scripts() {
        let mut fixture = fixture();
        let script_dir = fixture.game.config.script_dir.clone();
        std::fs::create_dir_all(&script_dir).unwrap();
        std::fs::write(script_dir.join("kitty.txt"), "[Chat]\nOTHER: Endless.\n").unwrap();

        let game = &mut fixture.game;
        assert!(game.on_reload_scripts().is_err());
        assert!(game.scripts().contains("wardrobe"));

        std::fs::write(script_dir.join("kitty.txt"), "[Bye]\nOTHER: Bye now.\n").unwrap();
        assert_eq!(game.on_reload_scripts().unwrap(), 1);
        assert!(!game.scripts().contains("wardrobe"));
    }
}
