//! Progression regression tests.
//!
//! These play whole games with the autopilot against the fixture content and
//! check that a game always runs to completion, explores the grid and fights
//! what it finds. They catch balance regressions that leave a game stuck in
//! combat or stop the player from spending their turns.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tactics_control::{AutopilotController, CommandSource};
use tactics_core::test_fixtures::{base_content, base_state, place_enemy};
use tactics_core::*;

const MAX_STEPS: usize = 5_000;

/// Runs the autopilot until the game ends. Rejected commands are skipped the
/// same way the CLI skips them. Returns the number of steps taken.
fn play_out(
    session: &mut GameSession<ChaCha8Rng>,
    controller: &mut AutopilotController,
) -> usize {
    let mut next_id = 0;
    for step in 0..MAX_STEPS {
        if session.state().grid.is_game_over {
            return step;
        }
        let commands =
            controller.generate_commands(session.state(), session.content(), &mut next_id);
        assert!(!commands.is_empty(), "autopilot stalled at step {step}");
        for envelope in &commands {
            let _ = session.apply(envelope);
        }
    }
    panic!("game did not finish within {MAX_STEPS} steps");
}

fn seeded_session(seed: u64) -> GameSession<ChaCha8Rng> {
    let content = base_content();
    let state = base_state(&content);
    GameSession::new(state, content, ChaCha8Rng::seed_from_u64(seed), EventLevel::Normal)
}

#[test]
fn autopilot_finishes_every_game() {
    for seed in 0..8 {
        let mut session = seeded_session(seed);
        let mut controller = AutopilotController::new();

        play_out(&mut session, &mut controller);

        let state = session.state();
        assert!(state.grid.is_game_over, "seed {seed} did not end");
        assert!(state.combat.is_none(), "seed {seed} ended mid-combat");
        assert_eq!(state.grid.remaining_turns, 0);
        assert!(state.character.health >= 1);
    }
}

#[test]
fn autopilot_spends_turns_on_new_cells() {
    let mut session = seeded_session(3);
    let mut controller = AutopilotController::new();

    play_out(&mut session, &mut controller);

    // Defeats send the player home, so some moves retrace old ground.
    assert!(controller.visited_count() > 10);
}

#[test]
fn autopilot_fights_an_adjacent_enemy_to_the_end() {
    let content = base_content();
    let mut state = base_state(&content);
    for (index, target) in possible_moves(&state).into_iter().enumerate() {
        place_enemy(&mut state, &format!("enemy_{index}"), target, 1);
    }
    let mut session =
        GameSession::restore(state, content, ChaCha8Rng::seed_from_u64(9), EventLevel::Normal);
    let mut controller = AutopilotController::new();
    let mut next_id = 0;

    // First step walks into one of the enemies.
    for envelope in controller.generate_commands(session.state(), session.content(), &mut next_id) {
        let _ = session.apply(&envelope);
    }
    assert!(session.combat().is_some());

    for _ in 0..500 {
        if session.combat().is_none() {
            break;
        }
        let commands =
            controller.generate_commands(session.state(), session.content(), &mut next_id);
        for envelope in &commands {
            let _ = session.apply(envelope);
        }
    }

    let state = session.state();
    assert!(state.combat.is_none(), "fight never ended");
    assert!(state.enemies.iter().any(|enemy| enemy.discovered));
    assert!(state.enemies.iter().all(|enemy| !enemy.in_combat));
}

#[test]
fn autopilot_games_are_reproducible() {
    let run = |seed| {
        let mut session = seeded_session(seed);
        let mut controller = AutopilotController::new();
        let steps = play_out(&mut session, &mut controller);
        (steps, serde_json::to_string(session.state()).unwrap())
    };

    assert_eq!(run(21), run(21));
}

#[test]
fn autopilot_invests_rewards() {
    let mut session = seeded_session(5);
    let mut controller = AutopilotController::new();
    let mut next_id = 0;

    let mut state = session.state().clone();
    state.resources.scrap = 200;
    state.resources.warpstone = 200;
    state.resources.biomass = 200;
    session = GameSession::restore(
        state,
        session.content().clone(),
        ChaCha8Rng::seed_from_u64(5),
        EventLevel::Normal,
    );

    for envelope in controller.generate_commands(session.state(), session.content(), &mut next_id) {
        let _ = session.apply(&envelope);
    }

    assert!(!session.state().progression.purchased_upgrades.is_empty());
}
