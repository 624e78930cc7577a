use ahash::{AHashMap, AHashSet};
use std::collections::VecDeque;
use tactics_core::{
    branch_upgrade_cost, neighbours, possible_moves, structure_at, structure_def, Command,
    CommandEnvelope, CommandId, CombatPhase, CombatState, GameContent, GameState, GridPos, ItemKind,
    StructureEffect,
};

pub trait CommandSource {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope>;
}

/// Plays the game automatically. Each call looks at the current state and
/// emits the commands for one step:
/// 1. In combat: enable autobattle, then take player or enemy turns. Retreat
///    when close to losing a fight the enemy is still winning.
/// 2. Use the structure on the player's cell if its effect would help.
/// 3. Equip loose gear into empty slots and drink a healing item when hurt.
/// 4. Spend resources on at most one purchase: hero upgrade, branch upgrade,
///    or a structure on the current cell.
/// 5. Step towards the nearest unvisited cell.
///
/// The autopilot plays the turn budget it was given: it never builds or uses
/// structures that restore turns.
#[derive(Debug, Default)]
pub struct AutopilotController {
    visited: AHashSet<GridPos>,
}

/// Player health fraction below which a losing fight is abandoned.
const RETREAT_PLAYER_HEALTH: f32 = 0.2;
/// Enemy health fraction above which the fight counts as losing.
const RETREAT_ENEMY_HEALTH: f32 = 0.5;
/// Health fraction below which a healing item is used between fights.
const HEAL_ITEM_THRESHOLD: f32 = 0.5;

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// Allocates a command ID and builds a `CommandEnvelope`.
fn make_cmd(turn: u64, next_id: &mut u64, command: Command) -> CommandEnvelope {
    let cmd_id = CommandId(format!("cmd_{:06}", *next_id));
    *next_id += 1;
    CommandEnvelope {
        id: cmd_id,
        issued_turn: turn,
        command,
    }
}

fn combat_commands(combat: &CombatState) -> Vec<Command> {
    match combat.phase {
        CombatPhase::Finished { .. } => Vec::new(),
        CombatPhase::EnemyTurn => vec![Command::ResolveEnemyTurn],
        CombatPhase::PlayerTurn => {
            if combat.player.health_fraction() < RETREAT_PLAYER_HEALTH
                && combat.enemy.health_fraction() > RETREAT_ENEMY_HEALTH
            {
                return vec![Command::RetreatFromCombat];
            }
            if combat.autobattle {
                vec![Command::AutobattleTurn]
            } else {
                vec![Command::ToggleAutobattle, Command::AutobattleTurn]
            }
        }
    }
}

fn health_fraction(state: &GameState) -> f32 {
    let character = &state.character;
    if character.max_health <= 0 {
        return 0.0;
    }
    character.health as f32 / character.max_health as f32
}

/// Whether the structure on the player's cell is ready and worth using now.
fn structure_worth_using(state: &GameState, content: &GameContent) -> bool {
    let Some(placed) = structure_at(state, state.grid.player) else {
        return false;
    };
    if placed.uses_remaining == 0 || placed.cooldown_remaining > 0 {
        return false;
    }
    let Some(def) = structure_def(content, &placed.kind) else {
        return false;
    };
    let character = &state.character;
    match def.effect {
        StructureEffect::RestoreShield => character.shield < character.max_shield,
        StructureEffect::RestoreHealth => character.health < character.max_health,
        StructureEffect::PlasmaBoost { .. } => character.plasma_boost.is_none(),
        StructureEffect::RestoreTurns { .. } | StructureEffect::Passive => false,
    }
}

/// Equip gear into empty slots and use a healing consumable when hurt.
fn upkeep_commands(state: &GameState) -> Vec<Command> {
    let character = &state.character;
    let mut commands = Vec::new();
    let mut filled = AHashSet::new();
    for item in &character.inventory {
        let Some(slot) = item.kind.slot() else {
            continue;
        };
        if character.equipment.slot(slot).is_none() && filled.insert(slot) {
            commands.push(Command::EquipItem {
                item_id: item.id.clone(),
            });
        }
    }

    if health_fraction(state) < HEAL_ITEM_THRESHOLD {
        let potion = character.inventory.iter().find(|item| {
            matches!(&item.kind, ItemKind::Consumable(effect) if effect.heal > 0)
        });
        if let Some(potion) = potion {
            commands.push(Command::UseItem {
                item_id: potion.id.clone(),
            });
        }
    }
    commands
}

/// The single most useful affordable purchase, if any.
fn purchase_command(state: &GameState, content: &GameContent) -> Option<Command> {
    let resources = &state.resources;

    if let Some(upgrade) = content.hero_upgrades.iter().find(|upgrade| {
        !state.progression.purchased_upgrades.contains(&upgrade.id)
            && resources.can_afford(&upgrade.cost)
    }) {
        return Some(Command::PurchaseHeroUpgrade {
            upgrade_id: upgrade.id.clone(),
        });
    }

    let cheapest_branch = content
        .branches
        .iter()
        .flat_map(|branch| branch.upgrades.iter().map(move |upgrade| (branch, upgrade)))
        .filter_map(|(branch, upgrade)| {
            let level = state
                .progression
                .branch_levels
                .get(&upgrade.id)
                .copied()
                .unwrap_or(0);
            let cost = branch_upgrade_cost(upgrade, level);
            (level < upgrade.max_level && resources.get(branch.resource) >= cost)
                .then_some((cost, upgrade))
        })
        .min_by_key(|(cost, _)| *cost);
    if let Some((_, upgrade)) = cheapest_branch {
        return Some(Command::PurchaseBranchUpgrade {
            upgrade_id: upgrade.id.clone(),
        });
    }

    if structure_at(state, state.grid.player).is_some() {
        return None;
    }
    tactics_core::available_buildings(state, content, state.grid.player)
        .into_iter()
        .filter(|option| option.affordable)
        .find(|option| {
            structure_def(content, &option.kind)
                .is_some_and(|def| !matches!(def.effect, StructureEffect::RestoreTurns { .. }))
        })
        .map(|option| Command::BuildStructure { kind: option.kind })
}

/// First step of a shortest path to the nearest unvisited cell. Falls back to
/// the first legal move once every cell has been visited.
fn next_step(state: &GameState, visited: &AHashSet<GridPos>) -> Option<GridPos> {
    let moves = possible_moves(state);
    let start = state.grid.player;

    let mut first_step: AHashMap<GridPos, GridPos> = AHashMap::new();
    let mut queue = VecDeque::new();
    for &step in &moves {
        first_step.insert(step, step);
        queue.push_back(step);
    }
    while let Some(pos) = queue.pop_front() {
        if !visited.contains(&pos) {
            return first_step.get(&pos).copied();
        }
        let via = first_step[&pos];
        for next in neighbours(&state.grid, pos) {
            if next != start && !first_step.contains_key(&next) {
                first_step.insert(next, via);
                queue.push_back(next);
            }
        }
    }
    moves.first().copied()
}

// ---------------------------------------------------------------------------
// AutopilotController
// ---------------------------------------------------------------------------

impl AutopilotController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}

impl CommandSource for AutopilotController {
    fn generate_commands(
        &mut self,
        state: &GameState,
        content: &GameContent,
        next_command_id: &mut u64,
    ) -> Vec<CommandEnvelope> {
        if state.grid.is_game_over {
            return Vec::new();
        }
        let turn = state.meta.turn;

        if let Some(combat) = &state.combat {
            return combat_commands(combat)
                .into_iter()
                .map(|command| make_cmd(turn, next_command_id, command))
                .collect();
        }

        self.visited.insert(state.grid.player);
        let mut planned = Vec::new();
        if structure_worth_using(state, content) {
            planned.push(Command::UseStructure);
        }
        planned.extend(upkeep_commands(state));
        planned.extend(purchase_command(state, content));
        if let Some(target) = next_step(state, &self.visited) {
            self.visited.insert(target);
            planned.push(Command::MovePlayer { target });
        }

        planned
            .into_iter()
            .map(|command| make_cmd(turn, next_command_id, command))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::test_fixtures::{base_content, base_state, combat_state, place_enemy};
    use tactics_core::{PlacedStructure, StructureKindId};

    fn commands(
        controller: &mut AutopilotController,
        state: &GameState,
        content: &GameContent,
    ) -> Vec<Command> {
        let mut next_id = 0;
        controller
            .generate_commands(state, content, &mut next_id)
            .into_iter()
            .map(|envelope| envelope.command)
            .collect()
    }

    #[test]
    fn command_ids_are_sequential() {
        let content = base_content();
        let state = base_state(&content);
        let mut controller = AutopilotController::new();
        let mut next_id = 7;

        let envelopes = controller.generate_commands(&state, &content, &mut next_id);

        assert_eq!(envelopes.len(), 1);
        assert_eq!(envelopes[0].id, CommandId("cmd_000007".to_string()));
        assert_eq!(next_id, 8);
    }

    #[test]
    fn explores_an_unvisited_neighbour() {
        let content = base_content();
        let state = base_state(&content);
        let mut controller = AutopilotController::new();

        let planned = commands(&mut controller, &state, &content);

        let [Command::MovePlayer { target }] = planned.as_slice() else {
            panic!("expected a single move, got {planned:?}");
        };
        assert!(possible_moves(&state).contains(target));
        assert_eq!(controller.visited_count(), 2);
    }

    #[test]
    fn game_over_yields_nothing() {
        let content = base_content();
        let mut state = base_state(&content);
        state.grid.is_game_over = true;
        let mut controller = AutopilotController::new();

        assert!(commands(&mut controller, &state, &content).is_empty());
    }

    #[test]
    fn enables_autobattle_before_fighting() {
        let content = base_content();
        let mut state = base_state(&content);
        state.combat = Some(combat_state(&content, 1));
        let mut controller = AutopilotController::new();

        let planned = commands(&mut controller, &state, &content);
        assert!(matches!(
            planned.as_slice(),
            [Command::ToggleAutobattle, Command::AutobattleTurn]
        ));

        state.combat.as_mut().unwrap().autobattle = true;
        let planned = commands(&mut controller, &state, &content);
        assert!(matches!(planned.as_slice(), [Command::AutobattleTurn]));
    }

    #[test]
    fn resolves_the_enemy_turn() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut combat = combat_state(&content, 1);
        combat.phase = CombatPhase::EnemyTurn;
        state.combat = Some(combat);
        let mut controller = AutopilotController::new();

        let planned = commands(&mut controller, &state, &content);
        assert!(matches!(planned.as_slice(), [Command::ResolveEnemyTurn]));
    }

    #[test]
    fn retreats_from_a_losing_fight() {
        let content = base_content();
        let mut state = base_state(&content);
        let mut combat = combat_state(&content, 5);
        combat.player.health = combat.player.max_health * 0.1;
        state.combat = Some(combat);
        let mut controller = AutopilotController::new();

        let planned = commands(&mut controller, &state, &content);
        assert!(matches!(planned.as_slice(), [Command::RetreatFromCombat]));
    }

    #[test]
    fn uses_a_ready_shield_generator_when_shield_is_down() {
        let content = base_content();
        let mut state = base_state(&content);
        state.character.shield = 10;
        state.structures.push(PlacedStructure {
            kind: StructureKindId("shield_generator".to_string()),
            position: state.grid.player,
            built_turn: 0,
            uses_remaining: 1,
            cooldown_remaining: 0,
        });
        let mut controller = AutopilotController::new();

        let planned = commands(&mut controller, &state, &content);
        assert!(matches!(planned.first(), Some(Command::UseStructure)));
    }

    #[test]
    fn never_builds_turn_restoring_structures() {
        let content = base_content();
        let mut state = base_state(&content);
        // Enough for an outpost but not for anything else on the start cell.
        state.resources.scrap = 35;
        state.resources.biomass = 15;
        let mut controller = AutopilotController::new();

        let planned = commands(&mut controller, &state, &content);
        assert!(planned
            .iter()
            .all(|command| !matches!(command, Command::BuildStructure { .. })));
    }

    #[test]
    fn buys_an_affordable_hero_upgrade() {
        let content = base_content();
        let mut state = base_state(&content);
        state.resources.scrap = 30;
        let mut controller = AutopilotController::new();

        let planned = commands(&mut controller, &state, &content);
        assert!(planned
            .iter()
            .any(|command| matches!(command, Command::PurchaseHeroUpgrade { .. })));
    }

    #[test]
    fn walks_into_a_neighbouring_enemy() {
        let content = base_content();
        let mut state = base_state(&content);
        for (index, target) in possible_moves(&state).into_iter().enumerate() {
            place_enemy(&mut state, &format!("enemy_{index}"), target, 1);
        }
        let mut controller = AutopilotController::new();

        let planned = commands(&mut controller, &state, &content);
        let Some(Command::MovePlayer { target }) = planned.last() else {
            panic!("expected a move, got {planned:?}");
        };
        assert!(state.enemies.iter().any(|enemy| enemy.position == *target));
    }
}
