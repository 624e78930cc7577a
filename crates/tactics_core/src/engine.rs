use rand::Rng;

use crate::combat::{self, outcome};
use crate::error::{CombatError, CommandError};
use crate::{
    economy, grid, inventory, progression, structures, CombatPhase, CombatState, Command,
    CommandEnvelope, Event, EventEnvelope, EventLevel, GameContent, GameState,
};

/// Apply one player intent.
///
/// Order of operations:
/// 1. Validate and resolve the command against the current state.
/// 2. If a combat encounter finished as a result, apply its outcome
///    (rewards, defeat penalties, relic wear, achievements).
///
/// A rejected command returns the error and leaves `state` unchanged.
/// Returns all events produced by the command.
pub fn apply_command(
    state: &mut GameState,
    envelope: &CommandEnvelope,
    content: &GameContent,
    rng: &mut impl Rng,
    event_level: EventLevel,
) -> Result<Vec<EventEnvelope>, CommandError> {
    let mut events = Vec::new();
    if let Err(err) = dispatch(state, &envelope.command, content, rng, event_level, &mut events) {
        tracing::debug!(command_id = %envelope.id, %err, "command rejected");
        return Err(err);
    }
    outcome::conclude_if_finished(state, content, rng, &mut events);
    Ok(events)
}

fn dispatch(
    state: &mut GameState,
    command: &Command,
    content: &GameContent,
    rng: &mut impl Rng,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    match command {
        Command::MovePlayer { target } => {
            grid::handle_move(state, content, *target, event_level, events)
        }
        Command::PerformCombatAction { action } => {
            with_combat(state, event_level, events, |combat, out| {
                combat::perform_player_action(combat, content, action, rng, out)
            })
        }
        Command::UseCombatItem { item_id } => {
            use_combat_item(state, content, item_id, event_level, events)
        }
        Command::ResolveEnemyTurn => with_combat(state, event_level, events, |combat, out| {
            combat::resolve_enemy_turn(combat, content, rng, out)
        }),
        Command::ToggleAutobattle => toggle_autobattle(state, events),
        Command::AutobattleTurn => with_combat(state, event_level, events, |combat, out| {
            combat::autobattle_turn(combat, content, rng, out).map(|_| ())
        }),
        Command::RetreatFromCombat => Ok(outcome::retreat(state, content, rng, events)?),
        Command::BuildStructure { kind } => structures::handle_build(state, content, kind, events),
        Command::UseStructure => structures::handle_use(state, content, events).map(|_| ()),
        Command::RemoveStructure => structures::handle_remove(state, events),
        Command::PurchaseHeroUpgrade { upgrade_id } => {
            economy::handle_purchase_hero_upgrade(state, content, upgrade_id, events)
        }
        Command::PurchaseBranchUpgrade { upgrade_id } => {
            economy::handle_purchase_branch_upgrade(state, content, upgrade_id, events)
        }
        Command::CraftItem { recipe_id } => {
            economy::handle_craft_item(state, content, recipe_id, rng, events)
        }
        Command::DisassembleItem { item_id } => {
            economy::handle_disassemble_item(state, content, item_id, events)
        }
        Command::UpgradeCrafting => economy::handle_upgrade_crafting(state, content, events),
        Command::UpgradeBase => economy::handle_upgrade_base(state, content, events),
        Command::RepairBase => economy::handle_repair_base(state, content, events),
        Command::EquipItem { item_id } => inventory::handle_equip(state, item_id, events),
        Command::UnequipItem { slot } => inventory::handle_unequip(state, *slot, events),
        Command::UseItem { item_id } => inventory::handle_use_item(state, item_id, events),
        Command::ToggleRelic { relic_id } => {
            progression::handle_toggle_relic(state, content, relic_id, events)
        }
        Command::RepairRelic { relic_id } => {
            progression::handle_repair_relic(state, content, relic_id, events)
        }
        Command::ResetGame => {
            grid::handle_reset(state, content, rng, events);
            Ok(())
        }
    }
}

/// Runs a combat step against the active encounter and wraps the raw events
/// it reports. Status ticks are debug-level.
fn with_combat<F>(
    state: &mut GameState,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
    step: F,
) -> Result<(), CommandError>
where
    F: FnOnce(&mut CombatState, &mut Vec<Event>) -> Result<(), CombatError>,
{
    let combat = state.combat.as_mut().ok_or(CombatError::NoActiveCombat)?;
    let mut raw = Vec::new();
    step(combat, &mut raw)?;
    push_combat_events(state, raw, event_level, events);
    Ok(())
}

fn push_combat_events(
    state: &mut GameState,
    raw: Vec<Event>,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) {
    for event in raw {
        if event_level == EventLevel::Normal && matches!(event, Event::StatusTicked { .. }) {
            continue;
        }
        events.push(crate::emit(&mut state.counters, state.meta.turn, event));
    }
}

fn use_combat_item(
    state: &mut GameState,
    content: &GameContent,
    item_id: &crate::ItemId,
    event_level: EventLevel,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let combat = state.combat.as_ref().ok_or(CombatError::NoActiveCombat)?;
    combat::ensure_player_can_act(combat)?;
    let effect = inventory::consumable_effect(&state.character, item_id)?.clone();

    let item = inventory::take_one(&mut state.character, item_id)?;
    let mut raw = Vec::new();
    if let Some(combat) = state.combat.as_mut() {
        combat::use_consumable(combat, content, &item.name, &effect, &mut raw);
    }
    // The buff counts this encounter as its first.
    inventory::register_buff(&mut state.character, &effect);
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::ItemUsed {
            item_id: item.id,
            name: item.name,
        },
    ));
    push_combat_events(state, raw, event_level, events);
    Ok(())
}

fn toggle_autobattle(
    state: &mut GameState,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let combat = state.combat.as_mut().ok_or(CombatError::NoActiveCombat)?;
    if matches!(combat.phase, CombatPhase::Finished { .. }) {
        return Err(CombatError::Finished.into());
    }
    combat.autobattle = !combat.autobattle;
    combat.autobattle_executing = false;
    let enabled = combat.autobattle;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        Event::AutobattleToggled { enabled },
    ));
    Ok(())
}
