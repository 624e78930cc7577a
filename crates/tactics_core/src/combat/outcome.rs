//! Applies a finished or abandoned encounter back onto the game state.

use rand::Rng;

use crate::error::CombatError;
use crate::inventory::{add_item, expire_combat_buffs, roll_loot};
use crate::progression::{
    check_achievements, grant_reward, roll_relic_discovery, victory_rewards, wear_equipped_relics,
};
use crate::{
    CombatOutcome, CombatPhase, CombatSide, CombatState, Event, EventEnvelope, GameContent,
    GameState,
};

/// Resolves the active encounter if it has a winner. Returns the outcome
/// applied, or `None` while the fight is still running.
pub(crate) fn conclude_if_finished(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> Option<CombatOutcome> {
    let winner = match state.combat.as_ref()?.phase {
        CombatPhase::Finished { winner } => winner,
        CombatPhase::PlayerTurn | CombatPhase::EnemyTurn => return None,
    };
    let combat = state.combat.take()?;
    let outcome = match winner {
        CombatSide::Player => CombatOutcome::Victory,
        CombatSide::Enemy => CombatOutcome::Defeat,
    };
    finish(state, content, combat, outcome, rng, events);
    Some(outcome)
}

/// Abandons the encounter. The enemy keeps its stats and stays on the grid.
pub(crate) fn retreat(
    state: &mut GameState,
    content: &GameContent,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CombatError> {
    let combat = state.combat.take().ok_or(CombatError::NoActiveCombat)?;
    finish(state, content, combat, CombatOutcome::Retreat, rng, events);
    Ok(())
}

fn finish(
    state: &mut GameState,
    content: &GameContent,
    combat: CombatState,
    outcome: CombatOutcome,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let stats = &mut state.progression.stats;
    stats.total_damage_dealt += combat.damage_dealt.max(0.0).round() as u64;
    stats.total_damage_taken += combat.damage_taken.max(0.0).round() as u64;
    match outcome {
        CombatOutcome::Victory => {
            stats.enemies_defeated += 1;
            stats.battles_won += 1;
        }
        CombatOutcome::Defeat => stats.battles_lost += 1,
        CombatOutcome::Retreat => stats.retreats += 1,
    }

    let character = &mut state.character;
    character.shield = (combat.player.shield.ceil() as i32).clamp(0, character.max_shield);
    if outcome == CombatOutcome::Defeat {
        let fraction = content.constants.defeat_health_fraction;
        let recovered = (character.max_health as f32 * fraction).floor() as i32;
        character.health = recovered.max(1);
    } else {
        character.health = (combat.player.health.ceil() as i32).clamp(1, character.max_health);
    }
    if outcome != CombatOutcome::Victory {
        state.grid.player = state.grid.start_cell();
    }

    if let Some(enemy) = state.enemies.iter_mut().find(|e| e.id == combat.enemy_id) {
        enemy.in_combat = false;
        enemy.discovered = true;
        if let Some(cached) = enemy.stats.as_mut() {
            cached.health = if outcome == CombatOutcome::Victory {
                0
            } else {
                cached.max_health
            };
        }
        enemy.defeated = outcome == CombatOutcome::Victory;
    }

    expire_combat_buffs(&mut state.character);
    tracing::info!(
        enemy = %combat.enemy.name,
        ?outcome,
        rounds = combat.turn_number,
        "combat ended"
    );
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::CombatEnded {
            enemy_id: combat.enemy_id.clone(),
            outcome,
        },
    ));
    wear_equipped_relics(state, content, events);

    if outcome == CombatOutcome::Victory {
        award_victory(state, content, combat.threat, rng, events);
    }
    if outcome != CombatOutcome::Retreat {
        check_achievements(state, content, events);
    }
}

fn award_victory(
    state: &mut GameState,
    content: &GameContent,
    threat: u32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    let reward = victory_rewards(threat, rng);
    grant_reward(state, content, &reward, events);

    if let Some(item) = roll_loot(content, rng) {
        let (name, rarity) = (item.name.clone(), item.rarity);
        match add_item(&mut state.character, item) {
            Ok(item_id) => events.push(crate::emit(
                &mut state.counters,
                state.meta.turn,
                Event::ItemDropped { item_id, name, rarity },
            )),
            Err(err) => tracing::debug!(%name, %err, "loot dropped on the floor"),
        }
    }

    roll_relic_discovery(state, content, threat, rng, events);
}
