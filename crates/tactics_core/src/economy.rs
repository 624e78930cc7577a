//! Resource ledger and everything that spends from it: crafting, hero
//! upgrades, branch upgrades and the base.
//!
//! All purchases check affordability before touching any state, so a rejected
//! purchase leaves the ledger exactly as it was.

use rand::Rng;

use crate::combat::ensure_out_of_combat;
use crate::error::{CommandError, EconomyError};
use crate::inventory::{add_item, apply_stat_delta, can_accept, take_one};
use crate::{
    BranchDef, BranchStat, BranchUpgradeDef, CharacterState, EventEnvelope, GameContent,
    GameState, Item, ItemId, ItemKind, Rarity, RecipeId, ResourceBundle, ResourceKind,
    ResourceLedger, StatDelta, UpgradeId,
};

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

impl ResourceLedger {
    pub fn get(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Biomass => self.biomass,
            ResourceKind::Scrap => self.scrap,
            ResourceKind::Warpstone => self.warpstone,
        }
    }

    fn slot_mut(&mut self, kind: ResourceKind) -> &mut u32 {
        match kind {
            ResourceKind::Biomass => &mut self.biomass,
            ResourceKind::Scrap => &mut self.scrap,
            ResourceKind::Warpstone => &mut self.warpstone,
        }
    }

    pub fn can_afford(&self, cost: &ResourceBundle) -> bool {
        cost.iter().all(|(&kind, &amount)| self.get(kind) >= amount)
    }

    /// Deducts `cost` atomically. Nothing is deducted when any amount is short.
    pub fn spend(&mut self, cost: &ResourceBundle) -> Result<(), EconomyError> {
        if !self.can_afford(cost) {
            return Err(EconomyError::CannotAfford);
        }
        for (&kind, &amount) in cost {
            let slot = self.slot_mut(kind);
            *slot = slot.saturating_sub(amount);
        }
        Ok(())
    }

    pub fn add(&mut self, bundle: &ResourceBundle) {
        for (&kind, &amount) in bundle {
            let slot = self.slot_mut(kind);
            *slot = slot.saturating_add(amount);
        }
    }

    pub fn add_one(&mut self, kind: ResourceKind, amount: u32) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(amount);
    }

    pub fn total(&self) -> u32 {
        self.biomass + self.scrap + self.warpstone
    }
}

/// Convenience constructor for cost tables built in code.
pub fn bundle(entries: &[(ResourceKind, u32)]) -> ResourceBundle {
    entries
        .iter()
        .filter(|(_, amount)| *amount > 0)
        .copied()
        .collect()
}

// ---------------------------------------------------------------------------
// Crafting
// ---------------------------------------------------------------------------

const CRAFTING_SCRAP_PER_LEVEL: u32 = 50;
const CRAFTING_WARPSTONE_PER_LEVEL: u32 = 25;

pub fn crafting_upgrade_cost(level: u32) -> ResourceBundle {
    bundle(&[
        (ResourceKind::Scrap, level * CRAFTING_SCRAP_PER_LEVEL),
        (ResourceKind::Warpstone, level * CRAFTING_WARPSTONE_PER_LEVEL),
    ])
}

fn disassembly_multiplier(rarity: Rarity) -> f64 {
    match rarity {
        Rarity::Common => 0.5,
        Rarity::Uncommon => 0.6,
        Rarity::Rare => 0.7,
        Rarity::Epic => 0.8,
        Rarity::Legendary => 0.9,
    }
}

/// Scales the positive stats of crafted equipment by the crafting level bonus.
fn apply_crafting_bonus(delta: StatDelta, level: u32, bonus_per_level: f64) -> StatDelta {
    let factor = 1.0 + bonus_per_level * f64::from(level.saturating_sub(1));
    let scale = |value: i32| {
        if value > 0 {
            (f64::from(value) * factor).floor() as i32
        } else {
            value
        }
    };
    StatDelta {
        max_health: scale(delta.max_health),
        attack: scale(delta.attack),
        defense: scale(delta.defense),
        speed: scale(delta.speed),
    }
}

fn crafted_kind(kind: &ItemKind, level: u32, bonus_per_level: f64) -> ItemKind {
    match kind {
        ItemKind::Weapon(delta) => {
            ItemKind::Weapon(apply_crafting_bonus(*delta, level, bonus_per_level))
        }
        ItemKind::Armor(delta) => {
            ItemKind::Armor(apply_crafting_bonus(*delta, level, bonus_per_level))
        }
        ItemKind::Accessory(delta) => {
            ItemKind::Accessory(apply_crafting_bonus(*delta, level, bonus_per_level))
        }
        other => other.clone(),
    }
}

pub(crate) fn handle_craft_item(
    state: &mut GameState,
    content: &GameContent,
    recipe_id: &RecipeId,
    rng: &mut impl Rng,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let recipe = content
        .recipes
        .iter()
        .find(|recipe| &recipe.id == recipe_id)
        .ok_or_else(|| EconomyError::UnknownRecipe(recipe_id.clone()))?;

    if !state.resources.can_afford(&recipe.cost) {
        return Err(EconomyError::CannotAfford.into());
    }

    let item = Item {
        id: crate::id::new_item_id(rng),
        name: recipe.name.clone(),
        rarity: recipe.rarity,
        quantity: 1,
        stackable: recipe.stackable,
        kind: crafted_kind(
            &recipe.kind,
            state.crafting.level,
            content.constants.crafting_bonus_per_level,
        ),
        recipe: Some(recipe.id.clone()),
    };
    if !can_accept(&state.character, &item) {
        return Err(EconomyError::InventoryFull.into());
    }

    state.resources.spend(&recipe.cost)?;
    let item_id = add_item(&mut state.character, item)?;

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::ItemCrafted {
            item_id,
            recipe_id: recipe.id.clone(),
        },
    ));
    Ok(())
}

pub(crate) fn handle_disassemble_item(
    state: &mut GameState,
    content: &GameContent,
    item_id: &ItemId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    let item = state
        .character
        .inventory
        .iter()
        .find(|item| &item.id == item_id)
        .ok_or_else(|| crate::error::InventoryError::NotFound(item_id.clone()))?;
    let recipe = item
        .recipe
        .as_ref()
        .and_then(|recipe_id| content.recipes.iter().find(|r| &r.id == recipe_id))
        .ok_or_else(|| EconomyError::NotDisassemblable(item_id.clone()))?;

    let multiplier = disassembly_multiplier(item.rarity);
    let refunded: ResourceBundle = recipe
        .cost
        .iter()
        .map(|(&kind, &amount)| (kind, (f64::from(amount) * multiplier).floor() as u32))
        .filter(|(_, amount)| *amount > 0)
        .collect();

    take_one(&mut state.character, item_id)?;
    state.resources.add(&refunded);

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::ItemDisassembled {
            item_id: item_id.clone(),
            refunded,
        },
    ));
    Ok(())
}

pub(crate) fn handle_upgrade_crafting(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if state.crafting.level >= content.constants.max_crafting_level {
        return Err(EconomyError::MaxLevel("crafting".to_string()).into());
    }
    state
        .resources
        .spend(&crafting_upgrade_cost(state.crafting.level))?;
    state.crafting.level += 1;

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::CraftingUpgraded {
            level: state.crafting.level,
        },
    ));
    Ok(())
}

// ---------------------------------------------------------------------------
// Hero upgrades (one-time purchases)
// ---------------------------------------------------------------------------

/// Applies a permanent stat gain. Max health gains also heal by the same amount.
fn apply_permanent_gain(character: &mut CharacterState, delta: &StatDelta) {
    apply_stat_delta(character, delta);
    if delta.max_health > 0 {
        character.health = (character.health + delta.max_health).min(character.max_health);
    }
}

pub(crate) fn handle_purchase_hero_upgrade(
    state: &mut GameState,
    content: &GameContent,
    upgrade_id: &UpgradeId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    ensure_out_of_combat(state)?;
    let upgrade = content
        .hero_upgrades
        .iter()
        .find(|upgrade| &upgrade.id == upgrade_id)
        .ok_or_else(|| EconomyError::UnknownUpgrade(upgrade_id.clone()))?;

    if state.progression.purchased_upgrades.contains(upgrade_id) {
        return Err(EconomyError::AlreadyPurchased(upgrade_id.clone()).into());
    }
    state.resources.spend(&upgrade.cost)?;
    state
        .progression
        .purchased_upgrades
        .insert(upgrade_id.clone());
    apply_permanent_gain(&mut state.character, &upgrade.delta);

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::HeroUpgradePurchased {
            upgrade_id: upgrade_id.clone(),
        },
    ));
    Ok(())
}

// ---------------------------------------------------------------------------
// Branch upgrades (levelled, geometric cost)
// ---------------------------------------------------------------------------

/// `floor(base_cost × cost_multiplier^level)`.
pub fn branch_upgrade_cost(upgrade: &BranchUpgradeDef, level: u32) -> u32 {
    let exponent = i32::try_from(level).unwrap_or(i32::MAX);
    (f64::from(upgrade.base_cost) * upgrade.cost_multiplier.powi(exponent)).floor() as u32
}

pub fn find_branch_upgrade<'a>(
    content: &'a GameContent,
    upgrade_id: &UpgradeId,
) -> Option<(&'a BranchDef, &'a BranchUpgradeDef)> {
    content.branches.iter().find_map(|branch| {
        branch
            .upgrades
            .iter()
            .find(|upgrade| &upgrade.id == upgrade_id)
            .map(|upgrade| (branch, upgrade))
    })
}

fn branch_stat_delta(stat: BranchStat, amount: i32) -> StatDelta {
    match stat {
        BranchStat::MaxHealth => StatDelta {
            max_health: amount,
            ..StatDelta::default()
        },
        BranchStat::Attack => StatDelta {
            attack: amount,
            ..StatDelta::default()
        },
        BranchStat::Defense => StatDelta {
            defense: amount,
            ..StatDelta::default()
        },
        BranchStat::Speed => StatDelta {
            speed: amount,
            ..StatDelta::default()
        },
        BranchStat::InventorySize => StatDelta::default(),
    }
}

pub(crate) fn handle_purchase_branch_upgrade(
    state: &mut GameState,
    content: &GameContent,
    upgrade_id: &UpgradeId,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    ensure_out_of_combat(state)?;
    let (branch, upgrade) = find_branch_upgrade(content, upgrade_id)
        .ok_or_else(|| EconomyError::UnknownUpgrade(upgrade_id.clone()))?;

    let level = state
        .progression
        .branch_levels
        .get(upgrade_id)
        .copied()
        .unwrap_or(0);
    if level >= upgrade.max_level {
        return Err(EconomyError::MaxLevel(upgrade.name.clone()).into());
    }

    let cost = bundle(&[(branch.resource, branch_upgrade_cost(upgrade, level))]);
    state.resources.spend(&cost)?;

    let new_level = level + 1;
    state
        .progression
        .branch_levels
        .insert(upgrade_id.clone(), new_level);
    if upgrade.stat == BranchStat::InventorySize {
        state.character.inventory_capacity = state
            .character
            .inventory_capacity
            .saturating_add_signed(upgrade.per_level);
    } else {
        apply_permanent_gain(
            &mut state.character,
            &branch_stat_delta(upgrade.stat, upgrade.per_level),
        );
    }

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::BranchUpgradePurchased {
            upgrade_id: upgrade_id.clone(),
            level: new_level,
        },
    ));
    Ok(())
}

// ---------------------------------------------------------------------------
// Base
// ---------------------------------------------------------------------------

const BASE_SCRAP_PER_LEVEL: u32 = 100;
const BASE_WARPSTONE_PER_LEVEL: u32 = 50;
const BASE_POPULATION_PER_LEVEL: u32 = 2;
const BASE_DEFENSE_PER_LEVEL: u32 = 10;

pub fn base_upgrade_cost(level: u32) -> ResourceBundle {
    bundle(&[
        (ResourceKind::Scrap, level * BASE_SCRAP_PER_LEVEL),
        (ResourceKind::Warpstone, level * BASE_WARPSTONE_PER_LEVEL),
    ])
}

pub(crate) fn handle_upgrade_base(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if state.base.level >= content.constants.max_base_level {
        return Err(EconomyError::MaxLevel("base".to_string()).into());
    }
    state.resources.spend(&base_upgrade_cost(state.base.level))?;
    state.base.level += 1;
    state.base.max_population += BASE_POPULATION_PER_LEVEL;
    state.base.max_defense += BASE_DEFENSE_PER_LEVEL;

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::BaseUpgraded {
            level: state.base.level,
        },
    ));
    Ok(())
}

pub(crate) fn handle_repair_base(
    state: &mut GameState,
    content: &GameContent,
    events: &mut Vec<EventEnvelope>,
) -> Result<(), CommandError> {
    if state.base.defense >= state.base.max_defense {
        return Err(EconomyError::NothingToRepair.into());
    }
    state.base.defense =
        (state.base.defense + content.constants.base_repair_amount).min(state.base.max_defense);

    events.push(crate::emit(
        &mut state.counters,
        state.meta.turn,
        crate::Event::BaseRepaired {
            defense: state.base.defense,
        },
    ));
    Ok(())
}
