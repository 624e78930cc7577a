//! Exploration grid: king-move movement, the turn budget, hidden enemy
//! placement and discovery.

use rand::Rng;
use smallvec::SmallVec;

use crate::error::{CommandError, MoveRejection};
use crate::{
    EnemyId, Event, EventEnvelope, EventLevel, GameContent, GameState, GridPos, GridState,
    HiddenEnemy,
};

/// King-move offsets in highlight order: NW, N, NE, W, E, SW, S, SE.
pub const DIRECTIONS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// In-bounds neighbours of the player. Empty while movement is blocked.
pub fn possible_moves(state: &GameState) -> SmallVec<[GridPos; 8]> {
    if state.grid.is_game_over || state.in_combat() {
        return SmallVec::new();
    }
    neighbours(&state.grid, state.grid.player)
}

pub fn neighbours(grid: &GridState, pos: GridPos) -> SmallVec<[GridPos; 8]> {
    DIRECTIONS
        .iter()
        .map(|&(dx, dy)| pos.offset(dx, dy))
        .filter(|candidate| candidate.in_bounds(grid.size))
        .collect()
}

fn validate_move(state: &GameState, target: GridPos) -> Result<(), MoveRejection> {
    if state.grid.is_game_over {
        return Err(MoveRejection::GameOver);
    }
    if state.in_combat() {
        return Err(MoveRejection::InCombat);
    }
    if !target.in_bounds(state.grid.size) {
        return Err(MoveRejection::OutOfBounds { to: target });
    }
    if !state.grid.player.is_king_adjacent(target) {
        return Err(MoveRejection::NotAdjacent {
            from: state.grid.player,
            to: target,
        });
    }
    Ok(())
}

/// Resolves one exploration turn.
///
/// Order of operations:
/// 1. Move the token and spend one turn.
/// 2. If the budget is exhausted the game ends here.
/// 3. Discovery: an undefeated enemy on the cell is revealed and combat starts.
/// 4. Structures tick, then any plasma boost counts down.
pub(crate) fn handle_move(
    state: &mut GameState,
    content: &GameContent,
    target: GridPos,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if let Err(rejection) = validate_move(state, target) {
        tracing::debug!(%target, %rejection, "move rejected");
        return Err(rejection.into());
    }

    let from = state.grid.player;
    state.grid.player = target;
    state.grid.remaining_turns = state.grid.remaining_turns.saturating_sub(1);
    state.meta.turn += 1;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::PlayerMoved {
            from,
            to: target,
            remaining_turns: state.grid.remaining_turns,
        },
    ));

    if state.grid.remaining_turns == 0 {
        state.grid.is_game_over = true;
        tracing::info!(turn = state.meta.turn, "turn budget exhausted");
        events.push(crate::emit(
            &mut state.counters,
            state.meta.turn,
            Event::GameOver { position: target },
        ));
        return Ok(());
    }

    if let Some(index) = undefeated_enemy_at(state, target) {
        discover_enemy(state, index, events);
        crate::combat::start_combat(state, content, index, events);
    }

    crate::structures::process_turn_effects(state, content, event_level, events);
    crate::structures::tick_plasma_boost(state, events);
    Ok(())
}

fn undefeated_enemy_at(state: &GameState, pos: GridPos) -> Option<usize> {
    state
        .enemies
        .iter()
        .position(|enemy| enemy.position == pos && !enemy.defeated)
}

fn discover_enemy(state: &mut GameState, index: usize, events: &mut Vec<EventEnvelope>) {
    let enemy = &mut state.enemies[index];
    if enemy.discovered {
        return;
    }
    enemy.discovered = true;
    let event = Event::EnemyDiscovered {
        enemy_id: enemy.id.clone(),
        name: enemy.name.clone(),
        threat: enemy.threat,
    };
    events.push(crate::emit(&mut state.counters, state.meta.turn, event));
}

/// Replaces the enemy list with `content.constants.enemy_count` fresh enemies.
///
/// Placement is uniform over the grid, never on the start cell or an occupied
/// cell. Each slot gets a bounded number of attempts and is skipped when they
/// run out.
pub fn generate_enemies(state: &mut GameState, content: &GameContent, rng: &mut impl Rng) -> u32 {
    let constants = &content.constants;
    let start = state.grid.start_cell();
    let size = state.grid.size;
    let mut enemies: Vec<HiddenEnemy> = Vec::new();

    if content.enemy_roster.is_empty() {
        state.enemies = enemies;
        return 0;
    }

    for slot in 0..constants.enemy_count {
        let mut placed = None;
        for _ in 0..constants.enemy_placement_attempts {
            let candidate = GridPos::new(rng.gen_range(0..size), rng.gen_range(0..size));
            if candidate != start && !enemies.iter().any(|e| e.position == candidate) {
                placed = Some(candidate);
                break;
            }
        }
        let Some(position) = placed else {
            tracing::debug!(slot, "no free cell for enemy, slot skipped");
            continue;
        };

        let template = &content.enemy_roster[rng.gen_range(0..content.enemy_roster.len())];
        enemies.push(HiddenEnemy {
            id: EnemyId(format!("enemy_{slot}")),
            name: template.name.clone(),
            faction: template.faction,
            threat: template.threat.max(1),
            position,
            discovered: false,
            defeated: false,
            in_combat: false,
            stats: None,
        });
    }

    let count = enemies.len() as u32;
    state.enemies = enemies;
    count
}

/// Fresh grid: start cell, full turn budget, new enemies, no structures.
/// Character progression and the resource ledger are kept.
pub(crate) fn handle_reset(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    state.combat = None;
    state.grid.player = state.grid.start_cell();
    state.grid.remaining_turns = state.grid.max_turns;
    state.grid.is_game_over = false;
    state.structures.clear();
    if let Some(boost) = state.character.plasma_boost.take() {
        state.character.attack -= boost.attack_bonus;
        state.character.defense -= boost.defense_bonus;
    }
    let count = generate_enemies(state, content, rng);

    events.push(crate::emit(&mut state.counters, state.meta.turn, Event::GameReset));
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::EnemiesGenerated { count },
    ));
}

#[cfg(test)]
mod grid_tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state};

    #[test]
    fn corner_has_three_neighbours() {
        let content = base_content();
        let state = base_state(&content);
        assert_eq!(neighbours(&state.grid, GridPos::new(0, 0)).len(), 3);
        assert_eq!(neighbours(&state.grid, GridPos::new(9, 4)).len(), 5);
        assert_eq!(neighbours(&state.grid, GridPos::new(5, 5)).len(), 8);
    }

    #[test]
    fn neighbours_follow_direction_order() {
        let content = base_content();
        let state = base_state(&content);
        let moves = neighbours(&state.grid, GridPos::new(5, 5));
        assert_eq!(moves[0], GridPos::new(4, 4));
        assert_eq!(moves[1], GridPos::new(5, 4));
        assert_eq!(moves[7], GridPos::new(6, 6));
    }

    #[test]
    fn staying_put_is_not_a_move() {
        let content = base_content();
        let state = base_state(&content);
        assert!(matches!(
            validate_move(&state, GridPos::new(5, 5)),
            Err(MoveRejection::NotAdjacent { .. })
        ));
    }
}
