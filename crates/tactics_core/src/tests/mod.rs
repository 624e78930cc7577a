use super::*;
use crate::test_fixtures::{base_content, base_state, make_rng, place_enemy, test_item};
use rand_chacha::ChaCha8Rng;

mod economy;
mod exploration;

// --- Shared test helpers ------------------------------------------------

fn envelope(state: &GameState, command: Command) -> CommandEnvelope {
    CommandEnvelope {
        id: CommandId(format!("cmd_{:06}", state.counters.next_command_id)),
        issued_turn: state.meta.turn,
        command,
    }
}

fn apply(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut ChaCha8Rng,
    command: Command,
) -> Result<Vec<EventEnvelope>, CommandError> {
    let cmd = envelope(state, command);
    apply_command(state, &cmd, content, rng, EventLevel::Normal)
}

fn move_to(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut ChaCha8Rng,
    x: i32,
    y: i32,
) -> Result<Vec<EventEnvelope>, CommandError> {
    apply(state, content, rng, Command::MovePlayer {
        target: GridPos::new(x, y),
    })
}

/// State with a single enemy one step east of the start cell.
fn state_with_enemy(content: &GameContent, threat: u32) -> GameState {
    let mut state = base_state(content);
    place_enemy(&mut state, "enemy_0", GridPos::new(6, 5), threat);
    state
}

/// Drives the active encounter to its end: the player uses `action` on each
/// of their turns and the enemy replies. Panics if the fight runs long.
fn fight_with(state: &mut GameState, content: &GameContent, rng: &mut ChaCha8Rng, action: &str) {
    for _ in 0..200 {
        let Some(combat) = state.combat.as_ref() else {
            return;
        };
        let command = match combat.phase {
            CombatPhase::PlayerTurn => Command::PerformCombatAction {
                action: ActionId(action.to_string()),
            },
            CombatPhase::EnemyTurn => Command::ResolveEnemyTurn,
            CombatPhase::Finished { .. } => panic!("finished combat left on state"),
        };
        apply(state, content, rng, command).unwrap();
    }
    panic!("combat did not finish within 200 steps");
}

fn has_event(events: &[EventEnvelope], predicate: impl Fn(&Event) -> bool) -> bool {
    events.iter().any(|envelope| predicate(&envelope.event))
}
