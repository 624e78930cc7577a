//! Turn-based combat between the player and a single enemy.
//!
//! A round is: player action, then an explicit enemy step
//! (`Command::ResolveEnemyTurn`), then the round-end tick. At round end both
//! sides' status effects tick, player cooldowns count down and the turn number
//! advances. Either side reaching 0 health finishes the encounter at once.
//!
//! Functions here work on `CombatState` alone and report raw `Event`s; the
//! engine wraps them into envelopes and applies outcome side effects.

mod autobattle;
mod enemy_ai;
pub(crate) mod outcome;

use rand::Rng;
use smallvec::SmallVec;

pub use autobattle::{choose_player_action, score_action};
pub use enemy_ai::choose_enemy_action;

use crate::error::CombatError;
use crate::progression::equipped_relic_effects;
use crate::{
    ActionId, ActiveEffect, CombatPhase, CombatSide, CombatState, CombatantState,
    ConsumableEffect, EnemyActionDef, EnemyActionEffect, EnemyStats, Event, EventEnvelope,
    GameContent, GameState, PlayerActionDef, PlayerActionKind, RelicEffect, Stance, StatusKind,
};

const MIN_ACCURACY: f32 = 10.0;
const MAX_ACCURACY: f32 = 95.0;
const BERSERK_ACCURACY_FACTOR: f32 = 0.8;
const PLAYER_ATTACK_SCALE: f32 = 0.5;
const ENEMY_ATTACK_SCALE: f32 = 0.3;
const BRUTAL_STRIKE_CHANCE: f32 = 0.2;
const BRUTAL_STRIKE_MULTIPLIER: f32 = 1.5;
const ENERGY_DRAIN_FRACTION: f32 = 0.1;

/// Stats derived from threat on first encounter.
pub fn enemy_stats_for_threat(threat: u32) -> EnemyStats {
    let threat = threat as i32;
    let health = threat * 25 + 50;
    EnemyStats {
        max_health: health,
        health,
        attack: threat * 3 + 8,
        defense: threat * 2 + 3,
    }
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Opens an encounter with the enemy at `enemy_index`. Cached stats are reused
/// and the enemy always starts at full health.
pub(crate) fn start_combat(
    state: &mut GameState,
    content: &GameContent,
    enemy_index: usize,
    events: &mut Vec<EventEnvelope>,
) {
    let relic_effects = equipped_relic_effects(state, content);
    let character = &state.character;
    let buff_attack: i32 = character.combat_buffs.iter().map(|b| b.attack).sum();
    let buff_defense: i32 = character.combat_buffs.iter().map(|b| b.defense).sum();

    let enemy = &mut state.enemies[enemy_index];
    let threat = enemy.threat;
    let stats = *enemy.stats.get_or_insert_with(|| enemy_stats_for_threat(threat));
    enemy.in_combat = true;

    let player = CombatantState {
        name: "You".to_string(),
        health: character.health as f32,
        max_health: character.max_health as f32,
        attack: (character.attack + buff_attack) as f32,
        defense: (character.defense + buff_defense) as f32,
        shield: character.shield as f32,
        effects: SmallVec::new(),
        stance: None,
        stunned: false,
    };
    let opponent = CombatantState {
        name: enemy.name.clone(),
        health: stats.max_health as f32,
        max_health: stats.max_health as f32,
        attack: stats.attack as f32,
        defense: stats.defense as f32,
        shield: 0.0,
        effects: SmallVec::new(),
        stance: None,
        stunned: false,
    };

    let mut combat = CombatState {
        enemy_id: enemy.id.clone(),
        faction: enemy.faction,
        threat,
        phase: CombatPhase::PlayerTurn,
        turn_number: 1,
        player,
        enemy: opponent,
        cooldowns: std::collections::BTreeMap::new(),
        autobattle: false,
        autobattle_executing: false,
        relic_effects,
        log: std::collections::VecDeque::new(),
        damage_dealt: 0.0,
        damage_taken: 0.0,
    };
    let capacity = content.constants.combat_log_capacity;
    combat.push_log(capacity, format!("Combat begins against {}!", combat.enemy.name));

    let event = Event::CombatStarted {
        enemy_id: combat.enemy_id.clone(),
        enemy_health: combat.enemy.health,
        enemy_attack: combat.enemy.attack,
    };
    tracing::info!(enemy = %combat.enemy.name, threat, "combat started");
    state.combat = Some(combat);
    events.push(crate::emit(&mut state.counters, state.meta.turn, event));
}

impl CombatState {
    /// Appends to the bounded combat log, dropping the oldest line when full.
    pub(crate) fn push_log(&mut self, capacity: usize, line: String) {
        self.log.push_back(line);
        while self.log.len() > capacity {
            self.log.pop_front();
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, CombatPhase::Finished { .. })
    }

    fn has_relic(&self, wanted: RelicEffect) -> bool {
        self.relic_effects
            .iter()
            .any(|effect| std::mem::discriminant(effect) == std::mem::discriminant(&wanted))
    }

    fn poison_on_hit(&self) -> Option<f32> {
        self.relic_effects.iter().find_map(|effect| match effect {
            RelicEffect::PoisonOnHit { damage_per_turn } => Some(*damage_per_turn),
            _ => None,
        })
    }

    /// Ends the encounter if either side is down. Player death takes priority.
    fn check_termination(&mut self) -> bool {
        let winner = if self.player.health <= 0.0 {
            self.player.health = 0.0;
            CombatSide::Enemy
        } else if self.enemy.health <= 0.0 {
            self.enemy.health = 0.0;
            CombatSide::Player
        } else {
            return false;
        };
        self.phase = CombatPhase::Finished { winner };
        true
    }
}

/// Player actions not currently on cooldown, in content order.
pub fn available_actions<'a>(
    combat: &CombatState,
    content: &'a GameContent,
) -> Vec<&'a PlayerActionDef> {
    content
        .player_actions
        .iter()
        .filter(|action| !combat.cooldowns.contains_key(&action.id))
        .collect()
}

/// Character-facing intents outside the fight are refused while an encounter
/// is active: the encounter's copy of the player overwrites health and shield
/// when it ends.
pub(crate) fn ensure_out_of_combat(state: &GameState) -> Result<(), CombatError> {
    if state.in_combat() {
        return Err(CombatError::AlreadyInCombat);
    }
    Ok(())
}

pub(crate) fn ensure_player_can_act(combat: &CombatState) -> Result<(), CombatError> {
    match combat.phase {
        CombatPhase::Finished { .. } => Err(CombatError::Finished),
        CombatPhase::EnemyTurn => Err(CombatError::NotPlayerTurn),
        CombatPhase::PlayerTurn if combat.player.stunned => Err(CombatError::Stunned),
        CombatPhase::PlayerTurn => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Shared resolution helpers
// ---------------------------------------------------------------------------

fn effective_accuracy(base: f32, actor: &CombatantState) -> f32 {
    let mut accuracy = base;
    if actor.has_effect(StatusKind::Berserk) {
        accuracy *= BERSERK_ACCURACY_FACTOR;
    }
    accuracy.clamp(MIN_ACCURACY, MAX_ACCURACY)
}

fn berserk_multiplier(actor: &CombatantState) -> f32 {
    actor
        .effects
        .iter()
        .filter(|effect| effect.kind == StatusKind::Berserk)
        .map(|effect| effect.value)
        .product()
}

fn roll_hit(rng: &mut impl Rng, accuracy: f32) -> bool {
    rng.gen::<f32>() * 100.0 < accuracy
}

/// Resolves the defender's stance against incoming damage. A successful block
/// never reduces a hit below 1; a successful evade negates it.
fn apply_stance(
    defender: &CombatantState,
    damage: f32,
    rng: &mut impl Rng,
) -> (f32, Option<&'static str>) {
    match defender.stance {
        Some(Stance::Block { chance, amount }) if rng.gen::<f32>() * 100.0 < chance => {
            ((damage - amount).max(1.0), Some("blocked some of the damage"))
        }
        Some(Stance::Evade { chance }) if rng.gen::<f32>() * 100.0 < chance => {
            (0.0, Some("dodged the attack"))
        }
        _ => (damage, None),
    }
}

/// Shield absorbs first; the remainder comes off health.
fn absorb_damage(target: &mut CombatantState, damage: f32) {
    let absorbed = damage.min(target.shield);
    target.shield -= absorbed;
    target.health -= damage - absorbed;
}

fn apply_status(
    target: &mut CombatantState,
    side: CombatSide,
    kind: StatusKind,
    content: &GameContent,
    damage_override: Option<f32>,
    out: &mut Vec<Event>,
) {
    let Some(def) = content.status_effects.iter().find(|def| def.kind == kind) else {
        return;
    };
    if kind == StatusKind::Stun {
        target.stunned = true;
    } else {
        // Reapplying refreshes rather than stacks.
        target.effects.retain(|effect| effect.kind != kind);
        target.effects.push(ActiveEffect {
            kind,
            turns_remaining: def.duration,
            damage_per_turn: damage_override.unwrap_or(def.damage_per_turn),
            value: def.value,
        });
    }
    out.push(Event::StatusApplied {
        target: side,
        kind,
        turns: def.duration,
    });
}

// ---------------------------------------------------------------------------
// Player turn
// ---------------------------------------------------------------------------

pub(crate) fn perform_player_action(
    combat: &mut CombatState,
    content: &GameContent,
    action_id: &ActionId,
    rng: &mut impl Rng,
    out: &mut Vec<Event>,
) -> Result<(), CombatError> {
    ensure_player_can_act(combat)?;
    let action = content
        .player_actions
        .iter()
        .find(|action| &action.id == action_id)
        .ok_or_else(|| CombatError::UnknownAction(action_id.clone()))?;
    if let Some(&turns) = combat.cooldowns.get(action_id) {
        return Err(CombatError::OnCooldown {
            action: action_id.clone(),
            turns,
        });
    }

    let capacity = content.constants.combat_log_capacity;
    match action.kind {
        PlayerActionKind::Strike {
            damage,
            accuracy,
            hits,
            ..
        } => player_strike(combat, content, &action.name, damage, accuracy, hits, rng, out),
        PlayerActionKind::Defend {
            block_chance,
            block_amount,
        } => {
            combat.player.stance = Some(Stance::Block {
                chance: block_chance,
                amount: block_amount,
            });
            combat.push_log(capacity, "You take a defensive stance!".to_string());
        }
        PlayerActionKind::Dodge { chance } => {
            combat.player.stance = Some(Stance::Evade { chance });
            combat.push_log(capacity, "You prepare to dodge!".to_string());
        }
    }

    if action.cooldown() > 0 {
        combat.cooldowns.insert(action.id.clone(), action.cooldown());
    }
    end_player_turn(combat);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn player_strike(
    combat: &mut CombatState,
    content: &GameContent,
    name: &str,
    base_damage: f32,
    base_accuracy: f32,
    hits: u32,
    rng: &mut impl Rng,
    out: &mut Vec<Event>,
) {
    let capacity = content.constants.combat_log_capacity;
    let accuracy = effective_accuracy(base_accuracy, &combat.player);
    if !roll_hit(rng, accuracy) {
        combat.push_log(capacity, format!("Your {name} missed!"));
        out.push(Event::CombatActionResolved {
            side: CombatSide::Player,
            action: name.to_string(),
            hit: false,
            damage: 0.0,
        });
        return;
    }

    let attack_term = if combat.has_relic(RelicEffect::DoubleAttack) {
        combat.player.attack * 2.0
    } else {
        combat.player.attack
    };
    let per_hit = ((base_damage + PLAYER_ATTACK_SCALE * attack_term)
        * berserk_multiplier(&combat.player))
    .max(1.0);
    let mut damage = per_hit * hits.max(1) as f32;
    if combat.has_relic(RelicEffect::BrutalStrike) && rng.gen::<f32>() < BRUTAL_STRIKE_CHANCE {
        damage *= BRUTAL_STRIKE_MULTIPLIER;
        combat.push_log(capacity, "Brutal strike!".to_string());
    }

    let (damage, stance_note) = apply_stance(&combat.enemy, damage, rng);
    if let Some(note) = stance_note {
        combat.push_log(capacity, format!("{} {note}!", combat.enemy.name));
    }
    absorb_damage(&mut combat.enemy, damage);
    combat.damage_dealt += damage;
    if hits > 1 {
        combat.push_log(capacity, format!("Your {name} hits {hits} times!"));
    }
    combat.push_log(capacity, format!("Your {name} deals {} damage!", damage.round()));
    out.push(Event::CombatActionResolved {
        side: CombatSide::Player,
        action: name.to_string(),
        hit: true,
        damage,
    });

    if damage > 0.0 {
        if let Some(per_turn) = combat.poison_on_hit() {
            apply_status(
                &mut combat.enemy,
                CombatSide::Enemy,
                StatusKind::Poison,
                content,
                Some(per_turn),
                out,
            );
        }
        if combat.has_relic(RelicEffect::EnergyDrain) {
            let player = &mut combat.player;
            player.health = (player.health + damage * ENERGY_DRAIN_FRACTION).min(player.max_health);
        }
    }
    if combat.check_termination() {
        combat.push_log(capacity, format!("{} has been defeated!", combat.enemy.name));
    }
}

/// Uses a consumable as the player's action for this turn.
pub(crate) fn use_consumable(
    combat: &mut CombatState,
    content: &GameContent,
    item_name: &str,
    effect: &ConsumableEffect,
    out: &mut Vec<Event>,
) {
    let capacity = content.constants.combat_log_capacity;
    let player = &mut combat.player;
    if effect.heal > 0 {
        player.health = (player.health + effect.heal as f32).min(player.max_health);
    }
    if let Some(buff) = effect.buff {
        player.attack += buff.attack as f32;
        player.defense += buff.defense as f32;
    }
    if effect.damage > 0 {
        absorb_damage(&mut combat.enemy, effect.damage as f32);
        combat.damage_dealt += effect.damage as f32;
    }
    combat.push_log(capacity, format!("You use {item_name}!"));
    out.push(Event::CombatActionResolved {
        side: CombatSide::Player,
        action: item_name.to_string(),
        hit: true,
        damage: effect.damage.max(0) as f32,
    });
    if combat.check_termination() {
        combat.push_log(capacity, format!("{} has been defeated!", combat.enemy.name));
        return;
    }
    end_player_turn(combat);
}

fn end_player_turn(combat: &mut CombatState) {
    if combat.is_finished() {
        return;
    }
    // An enemy evade stance only covers the player's next action.
    combat.enemy.stance = None;
    combat.phase = CombatPhase::EnemyTurn;
}

// ---------------------------------------------------------------------------
// Enemy turn
// ---------------------------------------------------------------------------

/// The enemy's reply, followed by the round-end tick.
pub(crate) fn resolve_enemy_turn(
    combat: &mut CombatState,
    content: &GameContent,
    rng: &mut impl Rng,
    out: &mut Vec<Event>,
) -> Result<(), CombatError> {
    match combat.phase {
        CombatPhase::Finished { .. } => return Err(CombatError::Finished),
        CombatPhase::PlayerTurn => return Err(CombatError::NotEnemyTurn),
        CombatPhase::EnemyTurn => {}
    }
    let capacity = content.constants.combat_log_capacity;

    let actions = content
        .enemy_archetypes
        .iter()
        .find(|archetype| archetype.faction == combat.faction)
        .or_else(|| content.enemy_archetypes.first())
        .map(|archetype| archetype.actions.as_slice())
        .unwrap_or_default();
    let heal_threshold = content.constants.enemy_heal_threshold;
    if let Some(action) = choose_enemy_action(&combat.enemy, actions, heal_threshold, rng) {
        enemy_act(combat, content, action, rng, out);
    }

    if combat.check_termination() {
        combat.push_log(capacity, "You have been defeated!".to_string());
        return Ok(());
    }
    end_round(combat, content, out);
    Ok(())
}

fn enemy_act(
    combat: &mut CombatState,
    content: &GameContent,
    action: &EnemyActionDef,
    rng: &mut impl Rng,
    out: &mut Vec<Event>,
) {
    let capacity = content.constants.combat_log_capacity;
    let name = combat.enemy.name.clone();

    // Self-targeted effects resolve regardless of the hit roll.
    match action.effect {
        Some(EnemyActionEffect::Heal) => {
            let enemy = &mut combat.enemy;
            let amount = enemy.max_health * content.constants.enemy_heal_fraction;
            enemy.health = (enemy.health + amount).min(enemy.max_health);
            combat.push_log(
                capacity,
                format!("{name} uses {} and recovers {}!", action.name, amount.round()),
            );
        }
        Some(EnemyActionEffect::Phase) => {
            combat.enemy.stance = Some(Stance::Evade {
                chance: content.constants.enemy_phase_evade_chance,
            });
            combat.push_log(capacity, format!("{name} phases out of reality!"));
        }
        Some(EnemyActionEffect::Berserk) => {
            apply_status(
                &mut combat.enemy,
                CombatSide::Enemy,
                StatusKind::Berserk,
                content,
                None,
                out,
            );
            combat.push_log(capacity, format!("{name} goes berserk!"));
        }
        Some(EnemyActionEffect::Inflict(_)) | None => {}
    }

    // Utility actions deal no damage.
    if action.damage <= 0.0 {
        out.push(Event::CombatActionResolved {
            side: CombatSide::Enemy,
            action: action.name.clone(),
            hit: true,
            damage: 0.0,
        });
        return;
    }

    let accuracy = effective_accuracy(action.accuracy, &combat.enemy);
    if !roll_hit(rng, accuracy) {
        combat.push_log(capacity, format!("{name}'s {} missed!", action.name));
        out.push(Event::CombatActionResolved {
            side: CombatSide::Enemy,
            action: action.name.clone(),
            hit: false,
            damage: 0.0,
        });
        return;
    }

    let raw = ((action.damage + ENEMY_ATTACK_SCALE * combat.enemy.attack)
        * berserk_multiplier(&combat.enemy))
    .max(1.0);
    let (damage, stance_note) = apply_stance(&combat.player, raw, rng);
    if let Some(note) = stance_note {
        combat.push_log(capacity, format!("You {note}!"));
    }
    absorb_damage(&mut combat.player, damage);
    combat.damage_taken += damage;
    combat.push_log(capacity, format!("{name}'s {} deals {} damage!", action.name, damage.round()));
    out.push(Event::CombatActionResolved {
        side: CombatSide::Enemy,
        action: action.name.clone(),
        hit: true,
        damage,
    });

    if let Some(EnemyActionEffect::Inflict(kind)) = action.effect {
        let resisted = kind == StatusKind::Burn && combat.has_relic(RelicEffect::WarpResistance);
        if resisted {
            combat.push_log(capacity, "Your relic shields you from the flames!".to_string());
        } else {
            apply_status(&mut combat.player, CombatSide::Player, kind, content, None, out);
        }
    }
}

fn tick_effects(target: &mut CombatantState, side: CombatSide, out: &mut Vec<Event>) {
    for effect in &mut target.effects {
        effect.turns_remaining = effect.turns_remaining.saturating_sub(1);
        if effect.damage_per_turn > 0.0 {
            target.health -= effect.damage_per_turn;
            out.push(Event::StatusTicked {
                target: side,
                kind: effect.kind,
                damage: effect.damage_per_turn,
            });
        }
    }
    target.effects.retain(|effect| effect.turns_remaining > 0);
}

/// Round end: stances drop, effects tick on both sides, cooldowns count
/// down and the turn number advances. A stunned player loses the next turn.
fn end_round(combat: &mut CombatState, content: &GameContent, out: &mut Vec<Event>) {
    let capacity = content.constants.combat_log_capacity;
    combat.player.stance = None;

    tick_effects(&mut combat.player, CombatSide::Player, out);
    tick_effects(&mut combat.enemy, CombatSide::Enemy, out);
    if combat.check_termination() {
        let line = match combat.phase {
            CombatPhase::Finished {
                winner: CombatSide::Player,
            } => format!("{} succumbs to its wounds!", combat.enemy.name),
            _ => "You succumb to your wounds!".to_string(),
        };
        combat.push_log(capacity, line);
        return;
    }

    for turns in combat.cooldowns.values_mut() {
        *turns = turns.saturating_sub(1);
    }
    combat.cooldowns.retain(|_, turns| *turns > 0);
    combat.turn_number += 1;
    combat.autobattle_executing = false;

    if combat.player.stunned {
        combat.player.stunned = false;
        combat.push_log(capacity, "You are stunned and lose your turn!".to_string());
        out.push(Event::TurnForfeited {
            side: CombatSide::Player,
        });
        combat.phase = CombatPhase::EnemyTurn;
    } else {
        combat.phase = CombatPhase::PlayerTurn;
    }
}

// ---------------------------------------------------------------------------
// Autobattle
// ---------------------------------------------------------------------------

/// Fills the player's turn with the best-scoring available action.
/// Returns `Ok(false)` when a previous autobattle action is still resolving.
pub(crate) fn autobattle_turn(
    combat: &mut CombatState,
    content: &GameContent,
    rng: &mut impl Rng,
    out: &mut Vec<Event>,
) -> Result<bool, CombatError> {
    if !combat.autobattle {
        return Err(CombatError::AutobattleDisabled);
    }
    if combat.autobattle_executing {
        tracing::debug!("autobattle already executing, trigger skipped");
        return Ok(false);
    }
    ensure_player_can_act(combat)?;

    let Some(action) = choose_player_action(combat, content) else {
        return Ok(false);
    };
    let action_id = action.id.clone();
    combat.push_log(content.constants.combat_log_capacity, format!("AI chooses: {}", action.name));
    combat.autobattle_executing = true;
    if let Err(err) = perform_player_action(combat, content, &action_id, rng, out) {
        combat.autobattle_executing = false;
        return Err(err);
    }
    Ok(true)
}

#[cfg(test)]
mod combat_tests {
    use super::*;
    use crate::test_fixtures::{base_content, combat_state};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn threat_three_enemy_stats() {
        let stats = enemy_stats_for_threat(3);
        assert_eq!(stats.max_health, 125);
        assert_eq!(stats.attack, 17);
        assert_eq!(stats.defense, 9);
    }

    #[test]
    fn accuracy_is_clamped_and_berserk_lowers_it() {
        let content = base_content();
        let mut combat = combat_state(&content, 3);
        assert!((effective_accuracy(120.0, &combat.player) - 95.0).abs() < f32::EPSILON);
        assert!((effective_accuracy(2.0, &combat.player) - 10.0).abs() < f32::EPSILON);
        combat.player.effects.push(ActiveEffect {
            kind: StatusKind::Berserk,
            turns_remaining: 2,
            damage_per_turn: 0.0,
            value: 1.5,
        });
        assert!((effective_accuracy(85.0, &combat.player) - 68.0).abs() < 1e-4);
        assert!((berserk_multiplier(&combat.player) - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn block_never_reduces_hit_below_one() {
        let content = base_content();
        let mut combat = combat_state(&content, 3);
        combat.player.stance = Some(Stance::Block {
            chance: 100.0,
            amount: 50.0,
        });
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (damage, note) = apply_stance(&combat.player, 20.0, &mut rng);
        assert!((damage - 1.0).abs() < f32::EPSILON);
        assert!(note.is_some());
    }

    #[test]
    fn shield_absorbs_before_health() {
        let content = base_content();
        let mut combat = combat_state(&content, 1);
        combat.player.shield = 10.0;
        let health = combat.player.health;
        absorb_damage(&mut combat.player, 15.0);
        assert!(combat.player.shield.abs() < f32::EPSILON);
        assert!((combat.player.health - (health - 5.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn log_keeps_only_the_newest_lines() {
        let content = base_content();
        let mut combat = combat_state(&content, 1);
        for i in 0..25 {
            combat.push_log(10, format!("line {i}"));
        }
        assert_eq!(combat.log.len(), 10);
        assert_eq!(combat.log.front().map(String::as_str), Some("line 15"));
    }

    #[test]
    fn damage_over_time_applies_before_expiry() {
        let content = base_content();
        let mut combat = combat_state(&content, 1);
        let mut out = Vec::new();
        apply_status(
            &mut combat.player,
            CombatSide::Player,
            StatusKind::Poison,
            &content,
            None,
            &mut out,
        );
        let start = combat.player.health;
        for _ in 0..3 {
            tick_effects(&mut combat.player, CombatSide::Player, &mut out);
        }
        assert!((start - combat.player.health - 15.0).abs() < f32::EPSILON);
        assert!(combat.player.effects.is_empty());
    }
}
