//! Read-only view of the game for renderers.
//!
//! Hidden enemies are counted but never located: a renderer can only draw
//! what the player has discovered.

use serde::Serialize;

use crate::structures::{structure_def, terrain_at};
use crate::{
    ActionId, CombatPhase, EnemyId, Faction, GameContent, GameState, GridPos, ResourceLedger,
    StatusKind, StructureKindId, Terrain,
};

#[derive(Debug, Clone, Serialize)]
pub struct RenderSnapshot {
    pub turn: u64,
    pub grid_size: i32,
    pub player: GridPos,
    pub player_terrain: Terrain,
    pub remaining_turns: u32,
    pub max_turns: u32,
    pub is_game_over: bool,
    pub possible_moves: Vec<GridPos>,
    pub hidden_enemy_count: u32,
    pub enemies: Vec<EnemyMarker>,
    pub structures: Vec<StructureMarker>,
    pub character: CharacterView,
    pub resources: ResourceLedger,
    pub combat: Option<CombatView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnemyMarker {
    pub id: EnemyId,
    pub name: String,
    pub faction: Faction,
    pub threat: u32,
    pub position: GridPos,
    pub defeated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructureMarker {
    pub kind: StructureKindId,
    pub icon: String,
    pub position: GridPos,
    pub uses_remaining: u32,
    pub cooldown_remaining: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CharacterView {
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub shield: i32,
    pub max_shield: i32,
    pub plasma_boost_turns: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CombatView {
    pub enemy_name: String,
    pub faction: Faction,
    pub threat: u32,
    pub phase: CombatPhase,
    pub turn_number: u32,
    pub player_health: f32,
    pub player_max_health: f32,
    pub player_shield: f32,
    pub player_effects: Vec<StatusKind>,
    pub player_stunned: bool,
    pub enemy_health: f32,
    pub enemy_max_health: f32,
    pub enemy_effects: Vec<StatusKind>,
    pub autobattle: bool,
    pub actions: Vec<ActionView>,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionView {
    pub id: ActionId,
    pub name: String,
    /// 0 when the action is ready.
    pub cooldown_remaining: u32,
}

pub fn build_snapshot(state: &GameState, content: &GameContent) -> RenderSnapshot {
    let hidden_enemy_count = state
        .enemies
        .iter()
        .filter(|enemy| !enemy.discovered && !enemy.defeated)
        .count() as u32;
    let enemies = state
        .enemies
        .iter()
        .filter(|enemy| enemy.discovered || enemy.defeated)
        .map(|enemy| EnemyMarker {
            id: enemy.id.clone(),
            name: enemy.name.clone(),
            faction: enemy.faction,
            threat: enemy.threat,
            position: enemy.position,
            defeated: enemy.defeated,
        })
        .collect();

    let structures = state
        .structures
        .iter()
        .map(|placed| StructureMarker {
            kind: placed.kind.clone(),
            icon: structure_def(content, &placed.kind)
                .map(|def| def.icon.clone())
                .unwrap_or_default(),
            position: placed.position,
            uses_remaining: placed.uses_remaining,
            cooldown_remaining: placed.cooldown_remaining,
        })
        .collect();

    let character = &state.character;
    let progression = &state.progression;
    RenderSnapshot {
        turn: state.meta.turn,
        grid_size: state.grid.size,
        player: state.grid.player,
        player_terrain: terrain_at(&state.grid, state.grid.player),
        remaining_turns: state.grid.remaining_turns,
        max_turns: state.grid.max_turns,
        is_game_over: state.grid.is_game_over,
        possible_moves: crate::grid::possible_moves(state).into_vec(),
        hidden_enemy_count,
        enemies,
        structures,
        character: CharacterView {
            level: progression.level,
            experience: progression.experience,
            experience_to_next: progression.experience_to_next,
            health: character.health,
            max_health: character.max_health,
            attack: character.attack,
            defense: character.defense,
            speed: character.speed,
            shield: character.shield,
            max_shield: character.max_shield,
            plasma_boost_turns: character.plasma_boost.map_or(0, |boost| boost.turns_remaining),
        },
        resources: state.resources.clone(),
        combat: combat_view(state, content),
    }
}

fn combat_view(state: &GameState, content: &GameContent) -> Option<CombatView> {
    let combat = state.combat.as_ref()?;
    let actions = content
        .player_actions
        .iter()
        .map(|action| ActionView {
            id: action.id.clone(),
            name: action.name.clone(),
            cooldown_remaining: combat.cooldowns.get(&action.id).copied().unwrap_or(0),
        })
        .collect();
    Some(CombatView {
        enemy_name: combat.enemy.name.clone(),
        faction: combat.faction,
        threat: combat.threat,
        phase: combat.phase,
        turn_number: combat.turn_number,
        player_health: combat.player.health,
        player_max_health: combat.player.max_health,
        player_shield: combat.player.shield,
        player_effects: combat.player.effects.iter().map(|e| e.kind).collect(),
        player_stunned: combat.player.stunned,
        enemy_health: combat.enemy.health,
        enemy_max_health: combat.enemy.max_health,
        enemy_effects: combat.enemy.effects.iter().map(|e| e.kind).collect(),
        autobattle: combat.autobattle,
        actions,
        log: combat.log.iter().cloned().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state, place_enemy};

    #[test]
    fn hidden_enemies_are_counted_but_not_located() {
        let content = base_content();
        let mut state = base_state(&content);
        place_enemy(&mut state, "enemy_0", GridPos::new(1, 1), 1);
        place_enemy(&mut state, "enemy_1", GridPos::new(8, 8), 2);
        state.enemies[1].discovered = true;

        let snapshot = build_snapshot(&state, &content);
        assert_eq!(snapshot.hidden_enemy_count, 1);
        assert_eq!(snapshot.enemies.len(), 1);
        assert_eq!(snapshot.enemies[0].position, GridPos::new(8, 8));

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(!json.contains("enemy_0"));
    }

    #[test]
    fn start_cell_offers_eight_moves() {
        let content = base_content();
        let state = base_state(&content);
        let snapshot = build_snapshot(&state, &content);
        assert_eq!(snapshot.possible_moves.len(), 8);
        assert_eq!(snapshot.player_terrain, Terrain::Plains);
        assert!(snapshot.combat.is_none());
    }
}
