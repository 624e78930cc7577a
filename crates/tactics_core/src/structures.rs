//! Battlefield structures: one building per grid cell, terrain gated, with a
//! single use per cooldown window.
//!
//! Uses reset eagerly: the turn tick that brings `cooldown_remaining` to 0
//! also restores `uses_remaining` to the type's configured uses.

use crate::error::{CommandError, StructureError};
use crate::{
    EventEnvelope, EventLevel, GameContent, GameState, GridPos, GridState, PlacedStructure,
    PlasmaBoost, ResourceBundle, StructureDef, StructureEffect, StructureKindId, Terrain,
};

/// Terrain bands by squared distance from the start cell.
pub fn terrain_at(grid: &GridState, pos: GridPos) -> Terrain {
    match pos.distance_squared(grid.start_cell()) {
        d if d < 4 => Terrain::Plains,
        d if d < 9 => Terrain::Hills,
        d if d < 16 => Terrain::Forest,
        d if d < 25 => Terrain::Ruins,
        _ => Terrain::WarpstoneDeposit,
    }
}

pub fn structure_at(state: &GameState, pos: GridPos) -> Option<&PlacedStructure> {
    state.structures.iter().find(|s| s.position == pos)
}

pub fn structure_def<'a>(
    content: &'a GameContent,
    kind: &StructureKindId,
) -> Option<&'a StructureDef> {
    content.structures.iter().find(|def| &def.id == kind)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOption {
    pub kind: StructureKindId,
    pub name: String,
    pub cost: ResourceBundle,
    pub affordable: bool,
}

/// Structure types whose terrain allowlist admits `pos`, with affordability.
pub fn available_buildings(
    state: &GameState,
    content: &GameContent,
    pos: GridPos,
) -> Vec<BuildOption> {
    let terrain = terrain_at(&state.grid, pos);
    content
        .structures
        .iter()
        .filter(|def| def.allowed_terrain.contains(&terrain))
        .map(|def| BuildOption {
            kind: def.id.clone(),
            name: def.name.clone(),
            cost: def.cost.clone(),
            affordable: state.resources.can_afford(&def.cost),
        })
        .collect()
}

fn ensure_free_to_act(state: &GameState) -> Result<(), StructureError> {
    if state.grid.is_game_over {
        return Err(StructureError::GameOver);
    }
    if state.in_combat() {
        return Err(StructureError::InCombat);
    }
    Ok(())
}

/// Builds at the player's cell. Checks terrain, then occupancy, then cost.
pub(crate) fn handle_build(
    state: &mut GameState,
    content: &GameContent,
    kind: &StructureKindId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    ensure_free_to_act(state)?;
    let def = structure_def(content, kind)
        .ok_or_else(|| StructureError::UnknownKind(kind.clone()))?;
    let pos = state.grid.player;

    let terrain = terrain_at(&state.grid, pos);
    if !def.allowed_terrain.contains(&terrain) {
        return Err(StructureError::InvalidTerrain {
            kind: kind.clone(),
            terrain,
        }
        .into());
    }
    if structure_at(state, pos).is_some() {
        return Err(StructureError::Occupied(pos).into());
    }
    if state.resources.spend(&def.cost).is_err() {
        return Err(StructureError::CannotAfford(kind.clone()).into());
    }

    state.structures.push(PlacedStructure {
        kind: kind.clone(),
        position: pos,
        built_turn: state.meta.turn,
        uses_remaining: def.uses,
        cooldown_remaining: 0,
    });
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::StructureBuilt {
            kind: kind.clone(),
            position: pos,
        },
    ));
    Ok(())
}

/// Uses the structure at the player's cell and returns the result message.
pub(crate) fn handle_use(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<String, CommandError> {
    ensure_free_to_act(state)?;
    let pos = state.grid.player;
    let index = state
        .structures
        .iter()
        .position(|s| s.position == pos)
        .ok_or(StructureError::NoStructure)?;
    let structure = &state.structures[index];
    let def = structure_def(content, &structure.kind)
        .ok_or_else(|| StructureError::UnknownKind(structure.kind.clone()))?;

    if matches!(def.effect, StructureEffect::Passive) {
        return Err(StructureError::NoUsableEffect.into());
    }
    if structure.uses_remaining == 0 {
        return Err(StructureError::NoUsesRemaining.into());
    }
    if structure.cooldown_remaining > 0 {
        return Err(StructureError::OnCooldown(structure.cooldown_remaining).into());
    }

    let message = apply_structure_effect(state, def.effect);
    let structure = &mut state.structures[index];
    structure.uses_remaining = 0;
    structure.cooldown_remaining = def.cooldown;

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::StructureUsed {
            kind: def.id.clone(),
            position: pos,
            message: message.clone(),
        },
    ));
    Ok(message)
}

fn apply_structure_effect(state: &mut GameState, effect: StructureEffect) -> String {
    let character = &mut state.character;
    match effect {
        StructureEffect::RestoreShield => {
            character.shield = character.max_shield;
            "Shield restored to maximum!".to_string()
        }
        StructureEffect::RestoreHealth => {
            character.health = character.max_health;
            "Health restored to maximum!".to_string()
        }
        StructureEffect::RestoreTurns { amount } => {
            let grid = &mut state.grid;
            let before = grid.remaining_turns;
            grid.remaining_turns = (grid.remaining_turns + amount).min(grid.max_turns);
            format!("Gained {} turns!", grid.remaining_turns - before)
        }
        StructureEffect::PlasmaBoost {
            attack_multiplier,
            defense_multiplier,
            turns,
        } => {
            // A fresh boost replaces any boost still running.
            if let Some(previous) = character.plasma_boost.take() {
                character.attack -= previous.attack_bonus;
                character.defense -= previous.defense_bonus;
            }
            let attack_bonus =
                (character.attack as f32 * attack_multiplier).floor() as i32 - character.attack;
            let defense_bonus =
                (character.defense as f32 * defense_multiplier).floor() as i32 - character.defense;
            character.attack += attack_bonus;
            character.defense += defense_bonus;
            character.plasma_boost = Some(PlasmaBoost {
                attack_bonus,
                defense_bonus,
                turns_remaining: turns,
            });
            format!("Plasma boost active for {turns} turns!")
        }
        StructureEffect::Passive => String::new(),
    }
}

/// Removes the structure at the player's cell. Costs are not refunded.
pub(crate) fn handle_remove(
    state: &mut GameState,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    ensure_free_to_act(state)?;
    let pos = state.grid.player;
    let index = state
        .structures
        .iter()
        .position(|s| s.position == pos)
        .ok_or(StructureError::NoStructure)?;
    let removed = state.structures.remove(index);
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::StructureRemoved {
            kind: removed.kind,
            position: pos,
        },
    ));
    Ok(())
}

/// Once per resolved exploration turn: cooldowns count down, structures that
/// come off cooldown regain their uses, and producers add their output.
pub(crate) fn process_turn_effects(
    state: &mut GameState,
    content: &GameContent,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    let mut produced = ResourceBundle::new();
    let mut ready = Vec::new();

    for structure in &mut state.structures {
        let Some(def) = structure_def(content, &structure.kind) else {
            continue;
        };
        if structure.cooldown_remaining > 0 {
            structure.cooldown_remaining -= 1;
            if structure.cooldown_remaining == 0 {
                structure.uses_remaining = def.uses;
                ready.push(structure.position);
            }
        }
        for (&kind, &amount) in &def.production {
            *produced.entry(kind).or_insert(0) += amount;
        }
    }

    if event_level == EventLevel::Debug {
        for position in ready {
            events.push(crate::emit(
                &mut state.counters,
                state.meta.turn,
                crate::Event::StructureReady { position },
            ));
        }
    }
    if !produced.is_empty() {
        state.resources.add(&produced);
        events.push(crate::emit(
            &mut state.counters,
            state.meta.turn,
            crate::Event::ResourcesProduced {
                resources: produced,
            },
        ));
    }
}

/// Counts down an active plasma boost and removes its exact bonus on expiry.
pub(crate) fn tick_plasma_boost(state: &mut GameState, events: &mut Vec<EventEnvelope>) {
    let character = &mut state.character;
    let Some(boost) = character.plasma_boost.as_mut() else {
        return;
    };
    boost.turns_remaining = boost.turns_remaining.saturating_sub(1);
    if boost.turns_remaining > 0 {
        return;
    }
    let attack_bonus = boost.attack_bonus;
    let defense_bonus = boost.defense_bonus;
    character.plasma_boost = None;
    character.attack -= attack_bonus;
    character.defense -= defense_bonus;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::PlasmaBoostExpired,
    ));
}

#[cfg(test)]
mod structure_tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state};

    #[test]
    fn terrain_bands_grow_outward_from_start() {
        let content = base_content();
        let state = base_state(&content);
        let grid = &state.grid;
        assert_eq!(terrain_at(grid, GridPos::new(5, 5)), Terrain::Plains);
        assert_eq!(terrain_at(grid, GridPos::new(6, 6)), Terrain::Plains);
        assert_eq!(terrain_at(grid, GridPos::new(7, 5)), Terrain::Hills);
        assert_eq!(terrain_at(grid, GridPos::new(8, 5)), Terrain::Forest);
        assert_eq!(terrain_at(grid, GridPos::new(9, 5)), Terrain::Ruins);
        assert_eq!(terrain_at(grid, GridPos::new(0, 0)), Terrain::WarpstoneDeposit);
    }

    #[test]
    fn available_buildings_filter_by_terrain() {
        let content = base_content();
        let state = base_state(&content);
        let at_start: Vec<_> = available_buildings(&state, &content, GridPos::new(5, 5))
            .into_iter()
            .map(|option| option.kind.0)
            .collect();
        assert!(at_start.contains(&"shield_generator".to_string()));
        assert!(!at_start.contains(&"plasma_reactor".to_string()));

        let corner: Vec<_> = available_buildings(&state, &content, GridPos::new(0, 0))
            .into_iter()
            .map(|option| option.kind.0)
            .collect();
        assert!(corner.contains(&"plasma_reactor".to_string()));
        assert!(!corner.contains(&"medical_hospital".to_string()));
    }

    #[test]
    fn plasma_boost_expiry_restores_exact_stats() {
        let content = base_content();
        let mut state = base_state(&content);
        let attack = state.character.attack;
        let defense = state.character.defense;
        apply_structure_effect(
            &mut state,
            StructureEffect::PlasmaBoost {
                attack_multiplier: 1.5,
                defense_multiplier: 1.3,
                turns: 2,
            },
        );
        assert_eq!(state.character.attack, 15);
        assert_eq!(state.character.defense, 6);

        let mut events = Vec::new();
        tick_plasma_boost(&mut state, &mut events);
        assert!(state.character.plasma_boost.is_some());
        tick_plasma_boost(&mut state, &mut events);
        assert!(state.character.plasma_boost.is_none());
        assert_eq!(state.character.attack, attack);
        assert_eq!(state.character.defense, defense);
        assert!(matches!(events[0].event, crate::Event::PlasmaBoostExpired));
    }
}
