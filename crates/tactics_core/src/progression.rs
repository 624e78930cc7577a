//! Experience curve, victory rewards, achievements and relics.

use rand::Rng;
use smallvec::SmallVec;

use crate::economy::bundle;
use crate::error::{CommandError, RelicError};
use crate::inventory::{apply_stat_delta, remove_stat_delta};
use crate::{
    AchievementTrigger, Constants, Counters, Event, EventEnvelope, GameContent, GameState,
    ProgressionState, Rarity, RelicEffect, RelicId, RelicState, ResourceKind, RewardBundle,
};

// ---------------------------------------------------------------------------
// Level curve
// ---------------------------------------------------------------------------

/// Adds experience and resolves any level-ups it causes. Experience stops
/// accumulating toward the next level once the level cap is reached.
pub(crate) fn grant_experience(
    progression: &mut ProgressionState,
    amount: u32,
    constants: &Constants,
    counters: &mut Counters,
    turn: u64,
    events: &mut Vec<EventEnvelope>,
) {
    if progression.level >= constants.max_level {
        return;
    }
    progression.experience = progression.experience.saturating_add(amount);
    while progression.level < constants.max_level
        && progression.experience >= progression.experience_to_next
    {
        progression.experience -= progression.experience_to_next;
        progression.level += 1;
        progression.skill_points += constants.skill_points_per_level;
        let grown = f64::from(progression.experience_to_next) * constants.experience_growth;
        progression.experience_to_next = grown.floor() as u32;
        events.push(crate::emit(
            counters,
            turn,
            Event::LevelUp {
                level: progression.level,
                skill_points: progression.skill_points,
            },
        ));
    }
    if progression.level >= constants.max_level {
        progression.experience = 0;
    }
}

// ---------------------------------------------------------------------------
// Rewards
// ---------------------------------------------------------------------------

const EXPERIENCE_PER_THREAT: u32 = 15;
const BIOMASS_PER_THREAT: u32 = 3;
const SCRAP_PER_THREAT: u32 = 2;
const COMBAT_POINTS_PER_THREAT: u32 = 5;

/// Threat-scaled victory rewards, with flat bonuses for threat 4 and 5 enemies.
pub fn victory_rewards(threat: u32, rng: &mut impl Rng) -> RewardBundle {
    let mut experience = threat * EXPERIENCE_PER_THREAT;
    let mut biomass = threat * BIOMASS_PER_THREAT + rng.gen_range(0..5);
    let mut scrap = threat * SCRAP_PER_THREAT + rng.gen_range(0..3);
    let mut warpstone = rng.gen_range(0..threat.max(1));
    let mut combat_points = threat * COMBAT_POINTS_PER_THREAT + rng.gen_range(0..10);

    if threat >= 4 {
        experience += 20;
        biomass += 5;
        scrap += 3;
        combat_points += 15;
    }
    if threat >= 5 {
        experience += 30;
        warpstone += 2;
        combat_points += 25;
    }

    RewardBundle {
        experience,
        combat_points,
        resources: bundle(&[
            (ResourceKind::Biomass, biomass),
            (ResourceKind::Scrap, scrap),
            (ResourceKind::Warpstone, warpstone),
        ]),
    }
}

pub(crate) fn grant_reward(
    state: &mut GameState,
    content: &GameContent,
    reward: &RewardBundle,
    events: &mut Vec<EventEnvelope>,
) {
    state.resources.add(&reward.resources);
    state.progression.combat_points = state
        .progression
        .combat_points
        .saturating_add(reward.combat_points);
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::RewardsGranted {
            experience: reward.experience,
            combat_points: reward.combat_points,
            resources: reward.resources.clone(),
        },
    ));
    grant_experience(
        &mut state.progression,
        reward.experience,
        &content.constants,
        &mut state.counters,
        state.meta.turn,
        events,
    );
}

// ---------------------------------------------------------------------------
// Achievements
// ---------------------------------------------------------------------------

/// Unlocks every achievement whose threshold has been crossed. Already
/// unlocked achievements are skipped, so repeated checks grant nothing.
pub(crate) fn check_achievements(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    for achievement in &content.achievements {
        if state.progression.achievements.contains(&achievement.id) {
            continue;
        }
        let stats = &state.progression.stats;
        let reached = match achievement.trigger {
            AchievementTrigger::EnemiesDefeated(count) => stats.enemies_defeated >= count,
            AchievementTrigger::BattlesLost(count) => stats.battles_lost >= count,
        };
        if !reached {
            continue;
        }
        state
            .progression
            .achievements
            .insert(achievement.id.clone());
        events.push(crate::emit(
            &mut state.counters,
            state.meta.turn,
            Event::AchievementUnlocked {
                achievement_id: achievement.id.clone(),
            },
        ));
        grant_reward(state, content, &achievement.reward, events);
    }
}

// ---------------------------------------------------------------------------
// Relics
// ---------------------------------------------------------------------------

pub fn relic_discovery_chance(threat: u32, constants: &Constants) -> f32 {
    let mut chance = constants.relic_base_chance;
    if threat >= 4 {
        chance += constants.relic_bonus_chance_threat4;
    }
    if threat >= 5 {
        chance += constants.relic_bonus_chance_threat5;
    }
    chance
}

fn roll_relic_rarity(rng: &mut impl Rng) -> Rarity {
    let roll: f32 = rng.gen();
    if roll < 0.5 {
        Rarity::Common
    } else if roll < 0.75 {
        Rarity::Uncommon
    } else if roll < 0.9 {
        Rarity::Rare
    } else if roll < 0.98 {
        Rarity::Epic
    } else {
        Rarity::Legendary
    }
}

/// Rolls for a relic after a victory. The collection is capped.
pub(crate) fn roll_relic_discovery(
    state: &mut GameState,
    content: &GameContent,
    threat: u32,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) {
    if content.relics.is_empty() || state.progression.relics.len() >= content.constants.max_relics {
        return;
    }
    if rng.gen::<f32>() >= relic_discovery_chance(threat, &content.constants) {
        return;
    }
    let def = &content.relics[rng.gen_range(0..content.relics.len())];
    let rarity = roll_relic_rarity(rng);

    let id = RelicId(format!("relic_{:04}", state.counters.next_relic_id));
    state.counters.next_relic_id += 1;
    state.progression.relics.push(RelicState {
        id: id.clone(),
        kind: def.id.clone(),
        rarity,
        equipped: false,
        durability: content.constants.relic_durability,
        max_durability: content.constants.relic_durability,
    });
    tracing::info!(relic = %def.name, ?rarity, "relic discovered");
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::RelicDiscovered {
            relic_id: id,
            kind: def.id.clone(),
            rarity,
        },
    ));
}

fn relic_index(state: &GameState, relic_id: &RelicId) -> Result<usize, RelicError> {
    state
        .progression
        .relics
        .iter()
        .position(|relic| &relic.id == relic_id)
        .ok_or_else(|| RelicError::NotFound(relic_id.clone()))
}

pub(crate) fn handle_toggle_relic(
    state: &mut GameState,
    content: &GameContent,
    relic_id: &RelicId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if state.in_combat() {
        return Err(RelicError::InCombat.into());
    }
    let index = relic_index(state, relic_id)?;
    let relic = &state.progression.relics[index];
    if !relic.equipped && relic.durability == 0 {
        return Err(RelicError::Broken(relic_id.clone()).into());
    }
    let delta = content
        .relics
        .iter()
        .find(|def| def.id == relic.kind)
        .map(|def| def.delta)
        .unwrap_or_default();

    let relic = &mut state.progression.relics[index];
    relic.equipped = !relic.equipped;
    let equipped = relic.equipped;
    if equipped {
        apply_stat_delta(&mut state.character, &delta);
    } else {
        remove_stat_delta(&mut state.character, &delta);
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::RelicToggled {
            relic_id: relic_id.clone(),
            equipped,
        },
    ));
    Ok(())
}

pub(crate) fn handle_repair_relic(
    state: &mut GameState,
    content: &GameContent,
    relic_id: &RelicId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let index = relic_index(state, relic_id)?;
    let relic = &mut state.progression.relics[index];
    if relic.durability >= relic.max_durability {
        return Err(RelicError::FullDurability(relic_id.clone()).into());
    }
    relic.durability =
        (relic.durability + content.constants.relic_repair_amount).min(relic.max_durability);
    let durability = relic.durability;

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::RelicRepaired {
            relic_id: relic_id.clone(),
            durability,
        },
    ));
    Ok(())
}

/// Effects of every equipped relic, in collection order.
pub fn equipped_relic_effects(
    state: &GameState,
    content: &GameContent,
) -> SmallVec<[RelicEffect; 4]> {
    state
        .progression
        .relics
        .iter()
        .filter(|relic| relic.equipped)
        .filter_map(|relic| content.relics.iter().find(|def| def.id == relic.kind))
        .filter_map(|def| def.effect)
        .collect()
}

/// Each combat fought wears equipped relics. A relic at zero durability is
/// unequipped and its stats removed.
pub(crate) fn wear_equipped_relics(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) {
    let wear = content.constants.relic_wear_per_combat;
    for index in 0..state.progression.relics.len() {
        let relic = &mut state.progression.relics[index];
        if !relic.equipped {
            continue;
        }
        relic.durability = relic.durability.saturating_sub(wear);
        let relic_id = relic.id.clone();
        let durability = relic.durability;
        let kind = relic.kind.clone();

        if durability > 0 {
            events.push(crate::emit(
                &mut state.counters,
                state.meta.turn,
                Event::RelicWorn {
                    relic_id,
                    durability,
                },
            ));
            continue;
        }

        state.progression.relics[index].equipped = false;
        if let Some(def) = content.relics.iter().find(|def| def.id == kind) {
            remove_stat_delta(&mut state.character, &def.delta);
        }
        events.push(crate::emit(
            &mut state.counters,
            state.meta.turn,
            Event::RelicBroken { relic_id },
        ));
    }
}
