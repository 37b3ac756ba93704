use std::fs;
use std::path::Path;

use dialogue_core::{DialogueView, Game, GameError, GameEvent, ScriptError};
use world_rules::{DeckId, Direction, Fact};

const ENGINE: &str = r#"
script_dir = "scripts"
save_dir = "saves"
world_file = "world.toml"

[effects.arrest_cheshire]
kind = "ending"
ending = "arrest_cheshire"

[effects.foghorn]
kind = "signal"
name = "foghorn"
"#;

const WORLD: &str = r#"
lift_stops = ["deck1"]

[start]
deck = "deck1"
x = 500.0

[[decks]]
id = "deck1"
name = "On Deck"
width = 1600.0
music = "waves"

[[decks.actors]]
name = "Captain Barnacle"
x = 520.0
script = "captain"

[[decks.interactables]]
kind = "observation"
x = 900.0
name = "the body"
script = "body"
requires = ["Murder"]
"#;

const INTRO: &str = "\
[enter]
OTHER: Somewhere in the North Atlantic.
EXEC: foghorn
OTHER: A scream from the deck.
LEARN: Murder
EXIT:
";

const CAPTAIN: &str = "\
[enter]
OTHER: Make it quick, lad.

[The body] if Murder
OTHER: Dreadful business.
Keep it quiet.

[The body] if Murder, body.knife
OTHER: A knife? Then it was no accident.
LEARN: Cheshire

[Accuse Lord Cheshire?]
PLAYER: It was Lord Cheshire.
EXEC: arrest_cheshire

[Bye]
";

const BODY: &str = "\
[enter]
OTHER: A steward, face down.
LEARN: .knife

[Done]
";

fn write_content(root: &Path) {
    fs::write(root.join("engine.toml"), ENGINE).unwrap();
    fs::write(root.join("world.toml"), WORLD).unwrap();
    fs::create_dir_all(root.join("scripts")).unwrap();
    fs::write(root.join("scripts/intro.txt"), INTRO).unwrap();
    fs::write(root.join("scripts/captain.txt"), CAPTAIN).unwrap();
    fs::write(root.join("scripts/body.txt"), BODY).unwrap();
}

fn line(game: &Game) -> String {
    match game.view().dialogue {
        Some(DialogueView::Line(line)) => line.text,
        other => panic!("expected a line, got {:?}", other),
    }
}

fn choices(game: &Game) -> Vec<String> {
    match game.view().dialogue {
        Some(DialogueView::Choices(list)) => list.rows.into_iter().map(|row| row.label).collect(),
        other => panic!("expected choices, got {:?}", other),
    }
}

fn press(game: &mut Game) {
    game.on_interact_pressed();
    game.on_interact_released();
}

fn walk_to(game: &mut Game, x: f32) {
    let direction = if x < game.state().player.x {
        Direction::Left
    } else {
        Direction::Right
    };
    while (game.state().player.x - x).abs() >= 3.0 {
        game.on_move(direction);
        game.tick();
    }
}

#[test]
fn test_full_investigation() {
    let dir = tempfile::tempdir().unwrap();
    write_content(dir.path());

    let mut game = Game::from_config_file(dir.path().join("engine.toml")).unwrap();
    assert!(!game.launch(), "fresh install has no autosave");

    // Intro: the signal fires and the fact is learned without stopping
    assert_eq!(line(&game), "Somewhere in the North Atlantic.");
    game.on_menu_select().unwrap();
    assert_eq!(line(&game), "A scream from the deck.");
    game.on_menu_select().unwrap();
    assert!(game.session().is_none());
    assert!(game.state().knowledge.knows(&Fact::new("Murder")));

    let events = game.drain_events();
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::Signal { name } if name == "foghorn")));
    assert!(events.iter().any(|e| matches!(e, GameEvent::Saved { .. })));

    // Generic variant first
    press(&mut game);
    assert_eq!(line(&game), "Make it quick, lad.");
    game.on_menu_select().unwrap();
    assert_eq!(choices(&game), vec!["The body", "Bye"]);
    game.on_menu_select().unwrap();
    assert_eq!(line(&game), "Dreadful business. Keep it quiet.");
    game.on_menu_select().unwrap();

    // Bye is the first unseen choice now, and it exits right away
    game.on_menu_select().unwrap();
    assert!(game.session().is_none());

    // Examine the body
    walk_to(&mut game, 900.0);
    assert_eq!(game.view().prompt.as_deref(), Some("Examine the body"));
    press(&mut game);
    game.on_menu_select().unwrap();
    assert_eq!(choices(&game), vec!["Done"]);
    game.on_menu_select().unwrap();
    assert!(game.state().knowledge.knows(&Fact::new("body.knife")));

    // The specific variant is new even though the topic was asked before
    walk_to(&mut game, 520.0);
    press(&mut game);
    game.on_menu_select().unwrap();
    match game.view().dialogue {
        Some(DialogueView::Choices(list)) => {
            assert_eq!(list.rows[0].label, "The body");
            assert!(!list.rows[0].seen);
            assert!(list.rows[0].highlighted);
        }
        other => panic!("expected choices, got {:?}", other),
    }
    game.on_menu_select().unwrap();
    assert_eq!(line(&game), "A knife? Then it was no accident.");
    game.on_menu_select().unwrap();

    // Accusing still needs its own fact
    assert_eq!(choices(&game), vec!["The body", "Bye"]);
    game.on_menu_back();
    game.on_escape();
    game.on_menu_select().unwrap();
    assert!(game.view().menu.is_none());

    // A save from here resumes on the next launch
    game.autosave().unwrap();
    let mut resumed = Game::from_config_file(dir.path().join("engine.toml")).unwrap();
    assert!(resumed.launch());
    assert_eq!(resumed.state().knowledge, game.state().knowledge);
    assert_eq!(resumed.state().completion, game.state().completion);
    assert_eq!(resumed.state().player.deck, DeckId::new("deck1"));
    assert!(resumed.session().is_none());
}

#[test]
fn test_broken_script_fails_with_location() {
    let dir = tempfile::tempdir().unwrap();
    write_content(dir.path());
    fs::write(dir.path().join("scripts/body.txt"), "[Done]\nWHISPER: psst\n").unwrap();

    let err = match Game::from_config_file(dir.path().join("engine.toml")) {
        Ok(_) => panic!("broken script loaded"),
        Err(err) => err,
    };

    assert!(matches!(
        err,
        GameError::Script(ScriptError::UnknownAction { line: 2, .. })
    ));
    assert!(err.to_string().contains("body.txt:2"));
}
