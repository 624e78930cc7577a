//! Character inventory, equipment slots and consumables.
//!
//! Equip and unequip are exact inverses: both go through `apply_stat_delta`
//! and `remove_stat_delta` with the same stored delta.

use rand::Rng;

use crate::combat::ensure_out_of_combat;
use crate::error::{CommandError, InventoryError};
use crate::{
    ActiveBuff, CharacterState, ConsumableEffect, EquipSlot, EventEnvelope, GameContent,
    GameState, Item, ItemId, ItemKind, Rarity, StatDelta,
};

// ---------------------------------------------------------------------------
// Stat application
// ---------------------------------------------------------------------------

pub(crate) fn apply_stat_delta(character: &mut CharacterState, delta: &StatDelta) {
    character.max_health += delta.max_health;
    character.attack += delta.attack;
    character.defense += delta.defense;
    character.speed += delta.speed;
    character.health = character.health.min(character.max_health);
}

pub(crate) fn remove_stat_delta(character: &mut CharacterState, delta: &StatDelta) {
    character.max_health -= delta.max_health;
    character.attack -= delta.attack;
    character.defense -= delta.defense;
    character.speed -= delta.speed;
    character.health = character.health.min(character.max_health);
}

// ---------------------------------------------------------------------------
// Inventory slots
// ---------------------------------------------------------------------------

fn stacks_with(existing: &Item, incoming: &Item) -> bool {
    existing.stackable
        && incoming.stackable
        && existing.name == incoming.name
        && existing.rarity == incoming.rarity
        && existing.kind == incoming.kind
}

pub fn can_accept(character: &CharacterState, item: &Item) -> bool {
    character
        .inventory
        .iter()
        .any(|existing| stacks_with(existing, item))
        || character.inventory.len() < character.inventory_capacity as usize
}

/// Adds an item, merging into an existing stack when possible.
/// Returns the id under which the item is now stored.
pub fn add_item(character: &mut CharacterState, item: Item) -> Result<ItemId, InventoryError> {
    if let Some(existing) = character
        .inventory
        .iter_mut()
        .find(|existing| stacks_with(existing, &item))
    {
        existing.quantity += item.quantity;
        return Ok(existing.id.clone());
    }
    if character.inventory.len() >= character.inventory_capacity as usize {
        return Err(InventoryError::Full);
    }
    let id = item.id.clone();
    character.inventory.push(item);
    Ok(id)
}

/// Removes one unit of an item and returns it.
pub(crate) fn take_one(
    character: &mut CharacterState,
    item_id: &ItemId,
) -> Result<Item, InventoryError> {
    let index = character
        .inventory
        .iter()
        .position(|item| &item.id == item_id)
        .ok_or_else(|| InventoryError::NotFound(item_id.clone()))?;

    if character.inventory[index].quantity > 1 {
        let stack = &mut character.inventory[index];
        stack.quantity -= 1;
        let mut unit = stack.clone();
        unit.quantity = 1;
        Ok(unit)
    } else {
        Ok(character.inventory.remove(index))
    }
}

pub(crate) fn consumable_effect<'a>(
    character: &'a CharacterState,
    item_id: &ItemId,
) -> Result<&'a ConsumableEffect, InventoryError> {
    let item = character
        .inventory
        .iter()
        .find(|item| &item.id == item_id)
        .ok_or_else(|| InventoryError::NotFound(item_id.clone()))?;
    match &item.kind {
        ItemKind::Consumable(effect) => Ok(effect),
        _ => Err(InventoryError::NotUsable(item_id.clone())),
    }
}

// ---------------------------------------------------------------------------
// Equipment
// ---------------------------------------------------------------------------

pub fn equip(
    character: &mut CharacterState,
    item_id: &ItemId,
) -> Result<EquipSlot, InventoryError> {
    let index = character
        .inventory
        .iter()
        .position(|item| &item.id == item_id)
        .ok_or_else(|| InventoryError::NotFound(item_id.clone()))?;
    let slot = character.inventory[index]
        .kind
        .slot()
        .ok_or_else(|| InventoryError::NotEquippable(item_id.clone()))?;

    let item = character.inventory.remove(index);
    if let Some(previous) = character.equipment.slot_mut(slot).take() {
        if let Some(delta) = previous.kind.stat_delta() {
            remove_stat_delta(character, delta);
        }
        // The slot freed by `item` guarantees room for the previous piece.
        character.inventory.push(previous);
    }
    if let Some(delta) = item.kind.stat_delta() {
        apply_stat_delta(character, delta);
    }
    *character.equipment.slot_mut(slot) = Some(item);
    Ok(slot)
}

pub fn unequip(character: &mut CharacterState, slot: EquipSlot) -> Result<ItemId, InventoryError> {
    if character.equipment.slot(slot).is_none() {
        return Err(InventoryError::SlotEmpty(slot));
    }
    if character.inventory.len() >= character.inventory_capacity as usize {
        return Err(InventoryError::Full);
    }
    let Some(item) = character.equipment.slot_mut(slot).take() else {
        return Err(InventoryError::SlotEmpty(slot));
    };
    if let Some(delta) = item.kind.stat_delta() {
        remove_stat_delta(character, delta);
    }
    let id = item.id.clone();
    character.inventory.push(item);
    Ok(id)
}

pub(crate) fn handle_equip(
    state: &mut GameState,
    item_id: &ItemId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    ensure_out_of_combat(state)?;
    let slot = equip(&mut state.character, item_id)?;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::ItemEquipped {
            item_id: item_id.clone(),
            slot,
        },
    ));
    Ok(())
}

pub(crate) fn handle_unequip(
    state: &mut GameState,
    slot: EquipSlot,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    ensure_out_of_combat(state)?;
    let item_id = unequip(&mut state.character, slot)?;
    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::ItemUnequipped { item_id, slot },
    ));
    Ok(())
}

// ---------------------------------------------------------------------------
// Consumables outside combat
// ---------------------------------------------------------------------------

pub(crate) fn register_buff(character: &mut CharacterState, effect: &ConsumableEffect) {
    if let Some(buff) = effect.buff {
        character.combat_buffs.push(ActiveBuff {
            attack: buff.attack,
            defense: buff.defense,
            combats_remaining: buff.combats,
        });
    }
}

pub(crate) fn handle_use_item(
    state: &mut GameState,
    item_id: &ItemId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    ensure_out_of_combat(state)?;
    let effect = consumable_effect(&state.character, item_id)?.clone();
    // Damage-only consumables need a target.
    if effect.heal <= 0 && effect.buff.is_none() {
        return Err(InventoryError::NotUsable(item_id.clone()).into());
    }

    let item = take_one(&mut state.character, item_id)?;
    let character = &mut state.character;
    if effect.heal > 0 {
        character.health = (character.health + effect.heal).min(character.max_health);
    }
    register_buff(character, &effect);

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::ItemUsed {
            item_id: item.id,
            name: item.name,
        },
    ));
    Ok(())
}

/// Counts down temporary combat buffs after an encounter ends.
pub(crate) fn expire_combat_buffs(character: &mut CharacterState) {
    for buff in &mut character.combat_buffs {
        buff.combats_remaining = buff.combats_remaining.saturating_sub(1);
    }
    character.combat_buffs.retain(|buff| buff.combats_remaining > 0);
}

// ---------------------------------------------------------------------------
// Loot
// ---------------------------------------------------------------------------

fn roll_loot_rarity(rng: &mut impl Rng) -> Rarity {
    let roll: f32 = rng.gen();
    if roll < 0.01 {
        Rarity::Legendary
    } else if roll < 0.05 {
        Rarity::Epic
    } else if roll < 0.15 {
        Rarity::Rare
    } else if roll < 0.40 {
        Rarity::Uncommon
    } else {
        Rarity::Common
    }
}

/// Rolls the post-victory item drop. Falls back to the next lower rarity tier
/// when no template exists at the rolled one.
pub(crate) fn roll_loot(content: &GameContent, rng: &mut impl Rng) -> Option<Item> {
    if content.item_templates.is_empty() || rng.gen::<f32>() >= content.constants.loot_drop_chance {
        return None;
    }
    let rolled = roll_loot_rarity(rng);
    let rarity = content
        .item_templates
        .iter()
        .map(|template| template.rarity)
        .filter(|rarity| *rarity <= rolled)
        .max()?;
    let candidates: Vec<_> = content
        .item_templates
        .iter()
        .filter(|template| template.rarity == rarity)
        .collect();
    let template = candidates[rng.gen_range(0..candidates.len())];

    Some(Item {
        id: crate::id::new_item_id(rng),
        name: template.name.clone(),
        rarity: template.rarity,
        quantity: 1,
        stackable: template.stackable,
        kind: template.kind.clone(),
        recipe: None,
    })
}
