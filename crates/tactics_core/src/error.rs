//! Rejection reasons for player intents.
//!
//! Every rejected command leaves `GameState` untouched. The `Display` text is
//! the message a UI layer would surface.

use thiserror::Error;

use crate::{
    ActionId, EquipSlot, GridPos, ItemId, RecipeId, RelicId, StructureKindId, Terrain, UpgradeId,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("move rejected: {0}")]
    Move(#[from] MoveRejection),
    #[error("combat: {0}")]
    Combat(#[from] CombatError),
    #[error("{0}")]
    Structure(#[from] StructureError),
    #[error("{0}")]
    Economy(#[from] EconomyError),
    #[error("{0}")]
    Inventory(#[from] InventoryError),
    #[error("{0}")]
    Relic(#[from] RelicError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoveRejection {
    #[error("{to} is not adjacent to {from}")]
    NotAdjacent { from: GridPos, to: GridPos },
    #[error("{to} is outside the grid")]
    OutOfBounds { to: GridPos },
    #[error("player is in combat")]
    InCombat,
    #[error("game is over")]
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CombatError {
    #[error("no active combat")]
    NoActiveCombat,
    #[error("combat already in progress")]
    AlreadyInCombat,
    #[error("combat has finished")]
    Finished,
    #[error("it is not the player's turn")]
    NotPlayerTurn,
    #[error("it is not the enemy's turn")]
    NotEnemyTurn,
    #[error("you are stunned and cannot act")]
    Stunned,
    #[error("unknown action '{0}'")]
    UnknownAction(ActionId),
    #[error("{action} is on cooldown for {turns} turns")]
    OnCooldown { action: ActionId, turns: u32 },
    #[error("autobattle is disabled")]
    AutobattleDisabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("unknown structure type '{0}'")]
    UnknownKind(StructureKindId),
    #[error("cannot build {kind} on {terrain:?} terrain")]
    InvalidTerrain { kind: StructureKindId, terrain: Terrain },
    #[error("a structure already exists at {0}")]
    Occupied(GridPos),
    #[error("not enough resources to build {0}")]
    CannotAfford(StructureKindId),
    #[error("No active structure at this position")]
    NoStructure,
    #[error("Structure has no uses remaining")]
    NoUsesRemaining,
    #[error("Structure on cooldown for {0} turns")]
    OnCooldown(u32),
    #[error("Structure has no usable effect")]
    NoUsableEffect,
    #[error("structures cannot be managed during combat")]
    InCombat,
    #[error("game is over")]
    GameOver,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EconomyError {
    #[error("not enough resources")]
    CannotAfford,
    #[error("unknown recipe '{0}'")]
    UnknownRecipe(RecipeId),
    #[error("unknown upgrade '{0}'")]
    UnknownUpgrade(UpgradeId),
    #[error("upgrade '{0}' already purchased")]
    AlreadyPurchased(UpgradeId),
    #[error("'{0}' is at max level")]
    MaxLevel(String),
    #[error("item {0} was not crafted and cannot be disassembled")]
    NotDisassemblable(ItemId),
    #[error("base is already at full defense")]
    NothingToRepair,
    #[error("inventory is full")]
    InventoryFull,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("item {0} not found")]
    NotFound(ItemId),
    #[error("item {0} cannot be equipped")]
    NotEquippable(ItemId),
    #[error("nothing equipped in the {0:?} slot")]
    SlotEmpty(EquipSlot),
    #[error("item {0} cannot be used here")]
    NotUsable(ItemId),
    #[error("inventory is full")]
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelicError {
    #[error("relic {0} not found")]
    NotFound(RelicId),
    #[error("relic {0} is broken")]
    Broken(RelicId),
    #[error("relic {0} is already at full durability")]
    FullDurability(RelicId),
    #[error("relics cannot be changed during combat")]
    InCombat,
}
