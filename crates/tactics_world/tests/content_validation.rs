//! Validation tests for the shipped `content/*.json` game data.
//!
//! These load the real files and check that they deserialize, resolve their
//! cross references, and give a playable game.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::OnceLock;
use tactics_core::{
    test_fixtures::base_content, Command, EventLevel, GameContent, GameSession, PlayerActionKind,
    StructureEffect, Terrain,
};
use tactics_world::{build_initial_state, load_content};

/// Integration tests run from the crate directory, so go up two levels.
fn content_dir() -> String {
    let manifest = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    format!("{manifest}/../../content")
}

fn load_test_content() -> &'static GameContent {
    static CONTENT: OnceLock<GameContent> = OnceLock::new();
    CONTENT.get_or_init(|| {
        load_content(&content_dir()).expect("load_content should succeed for shipped content")
    })
}

// =========================================================================
// Schema
// =========================================================================

#[test]
fn content_loads_successfully() {
    let content = load_test_content();
    assert!(!content.content_version.is_empty());
}

#[test]
fn test_fixtures_mirror_shipped_content() {
    let shipped = load_test_content().clone();
    let mut fixture = base_content();
    fixture.content_version.clone_from(&shipped.content_version);

    let shipped = serde_json::to_value(&shipped).unwrap();
    let fixture = serde_json::to_value(&fixture).unwrap();
    assert_eq!(shipped, fixture);
}

#[test]
fn missing_file_reports_its_name() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_content(dir.path().to_str().unwrap()).unwrap_err();
    assert!(format!("{err:#}").contains("constants.json"));
}

// =========================================================================
// Ranges
// =========================================================================

#[test]
fn strike_actions_have_sane_numbers() {
    for action in &load_test_content().player_actions {
        if let PlayerActionKind::Strike {
            damage,
            accuracy,
            hits,
            ..
        } = action.kind
        {
            assert!(damage > 0.0, "action '{}' deals no damage", action.id);
            assert!(
                (0.0..=100.0).contains(&accuracy),
                "action '{}' accuracy {accuracy} out of range",
                action.id
            );
            assert!(hits >= 1, "action '{}' has zero hits", action.id);
        }
    }
}

#[test]
fn at_least_one_action_is_always_ready() {
    let content = load_test_content();
    assert!(
        content.player_actions.iter().any(|action| action.cooldown() == 0),
        "every action has a cooldown; the player could be left with nothing to do"
    );
}

#[test]
fn roster_threats_are_in_range() {
    for template in &load_test_content().enemy_roster {
        assert!(
            (1..=5).contains(&template.threat),
            "enemy '{}' threat {} outside 1..=5",
            template.name,
            template.threat
        );
    }
}

// =========================================================================
// Playability
// =========================================================================

#[test]
fn every_terrain_allows_some_structure() {
    let content = load_test_content();
    for terrain in [
        Terrain::Plains,
        Terrain::Hills,
        Terrain::Forest,
        Terrain::Ruins,
        Terrain::WarpstoneDeposit,
    ] {
        assert!(
            content
                .structures
                .iter()
                .any(|s| s.allowed_terrain.contains(&terrain)),
            "nothing can be built on {terrain:?}"
        );
    }
}

#[test]
fn outpost_restores_turns() {
    let content = load_test_content();
    let outpost = content
        .structures
        .iter()
        .find(|s| s.id.0 == "outpost")
        .expect("outpost defined");
    assert!(matches!(
        outpost.effect,
        StructureEffect::RestoreTurns { amount } if amount > 0
    ));
}

#[test]
fn a_fresh_game_from_shipped_content_is_playable() {
    let content = load_test_content().clone();
    let state = build_initial_state(&content, 42);
    let mut session = GameSession::new(
        state,
        content,
        ChaCha8Rng::seed_from_u64(42),
        EventLevel::Normal,
    );

    assert_eq!(session.state().enemies.len(), 8);
    let target = session.possible_moves()[0];
    session.submit(Command::MovePlayer { target }).unwrap();
    assert_eq!(session.state().grid.remaining_turns, 29);
}
