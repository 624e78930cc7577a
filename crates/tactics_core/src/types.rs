//! Type definitions for `tactics_core`.
//!
//! All public state, content, command and event types used by the engine.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(EnemyId);
string_id!(ItemId);
string_id!(RelicId);
string_id!(RelicKindId);
string_id!(StructureKindId);
string_id!(RecipeId);
string_id!(UpgradeId);
string_id!(BranchId);
string_id!(AchievementId);
string_id!(ActionId);
string_id!(CommandId);
string_id!(EventId);

// ---------------------------------------------------------------------------
// Core enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventLevel {
    Normal,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Biomass,
    Scrap,
    Warpstone,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [Self::Biomass, Self::Scrap, Self::Warpstone];
}

/// Ordering affects drop weighting and display tier only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terrain {
    Plains,
    Hills,
    Forest,
    Ruins,
    WarpstoneDeposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Tyranids,
    Orks,
    Necrons,
    Chaos,
}

impl std::fmt::Display for Faction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Faction::Tyranids => "Tyranids",
            Faction::Orks => "Orks",
            Faction::Necrons => "Necrons",
            Faction::Chaos => "Chaos",
        })
    }
}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn in_bounds(self, grid_size: i32) -> bool {
        (0..grid_size).contains(&self.x) && (0..grid_size).contains(&self.y)
    }

    /// True for the 8 surrounding cells; a cell is not adjacent to itself.
    pub fn is_king_adjacent(self, other: GridPos) -> bool {
        let dx = (self.x - other.x).abs();
        let dy = (self.y - other.y).abs();
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }

    pub fn offset(self, dx: i32, dy: i32) -> GridPos {
        GridPos::new(self.x + dx, self.y + dy)
    }

    pub fn distance_squared(self, other: GridPos) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl std::fmt::Display for GridPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// Resource amounts keyed by kind. Used for costs, rewards and production.
pub type ResourceBundle = BTreeMap<ResourceKind, u32>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceLedger {
    pub biomass: u32,
    pub scrap: u32,
    pub warpstone: u32,
}

// ---------------------------------------------------------------------------
// Stats and items
// ---------------------------------------------------------------------------

/// Flat additive stat modifiers. Speed is in hundredths (100 = 1.0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatDelta {
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatBuffDef {
    pub attack: i32,
    pub defense: i32,
    pub combats: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsumableEffect {
    pub heal: i32,
    pub damage: i32,
    pub buff: Option<CombatBuffDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    Weapon,
    Armor,
    Accessory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Weapon(StatDelta),
    Armor(StatDelta),
    Accessory(StatDelta),
    Consumable(ConsumableEffect),
    Misc,
}

impl ItemKind {
    pub fn slot(&self) -> Option<EquipSlot> {
        match self {
            ItemKind::Weapon(_) => Some(EquipSlot::Weapon),
            ItemKind::Armor(_) => Some(EquipSlot::Armor),
            ItemKind::Accessory(_) => Some(EquipSlot::Accessory),
            ItemKind::Consumable(_) | ItemKind::Misc => None,
        }
    }

    pub fn stat_delta(&self) -> Option<&StatDelta> {
        match self {
            ItemKind::Weapon(delta) | ItemKind::Armor(delta) | ItemKind::Accessory(delta) => {
                Some(delta)
            }
            ItemKind::Consumable(_) | ItemKind::Misc => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub rarity: Rarity,
    pub quantity: u32,
    pub stackable: bool,
    pub kind: ItemKind,
    /// Recipe the item was crafted from; only crafted items can be disassembled.
    #[serde(default)]
    pub recipe: Option<RecipeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub weapon: Option<Item>,
    pub armor: Option<Item>,
    pub accessory: Option<Item>,
}

impl Equipment {
    pub fn slot(&self, slot: EquipSlot) -> Option<&Item> {
        match slot {
            EquipSlot::Weapon => self.weapon.as_ref(),
            EquipSlot::Armor => self.armor.as_ref(),
            EquipSlot::Accessory => self.accessory.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, slot: EquipSlot) -> &mut Option<Item> {
        match slot {
            EquipSlot::Weapon => &mut self.weapon,
            EquipSlot::Armor => &mut self.armor,
            EquipSlot::Accessory => &mut self.accessory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveBuff {
    pub attack: i32,
    pub defense: i32,
    pub combats_remaining: u32,
}

/// Exact deltas added by a Plasma Reactor; subtracted again on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlasmaBoost {
    pub attack_bonus: i32,
    pub defense_bonus: i32,
    pub turns_remaining: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterState {
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    /// Hundredths: 100 = 1.0.
    pub speed: i32,
    pub shield: i32,
    pub max_shield: i32,
    pub equipment: Equipment,
    pub inventory: Vec<Item>,
    pub inventory_capacity: u32,
    pub plasma_boost: Option<PlasmaBoost>,
    pub combat_buffs: Vec<ActiveBuff>,
}

// ---------------------------------------------------------------------------
// Exploration state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridState {
    pub size: i32,
    pub player: GridPos,
    pub remaining_turns: u32,
    pub max_turns: u32,
    pub is_game_over: bool,
}

impl GridState {
    pub fn start_cell(&self) -> GridPos {
        GridPos::new(self.size / 2, self.size / 2)
    }
}

/// Combat stats rolled on first encounter and preserved afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub max_health: i32,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyLifecycle {
    Hidden,
    Discovered,
    Defeated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiddenEnemy {
    pub id: EnemyId,
    pub name: String,
    pub faction: Faction,
    pub threat: u32,
    pub position: GridPos,
    pub discovered: bool,
    pub defeated: bool,
    pub in_combat: bool,
    pub stats: Option<EnemyStats>,
}

impl HiddenEnemy {
    pub fn lifecycle(&self) -> EnemyLifecycle {
        if self.defeated {
            EnemyLifecycle::Defeated
        } else if self.discovered {
            EnemyLifecycle::Discovered
        } else {
            EnemyLifecycle::Hidden
        }
    }
}

// ---------------------------------------------------------------------------
// Combat state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatSide {
    Player,
    Enemy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    PlayerTurn,
    EnemyTurn,
    Finished { winner: CombatSide },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatOutcome {
    Victory,
    Defeat,
    Retreat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Poison,
    Burn,
    Stun,
    Berserk,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: StatusKind,
    pub turns_remaining: u32,
    pub damage_per_turn: f32,
    pub value: f32,
}

/// Defensive posture lasting until the end of the opponent's next action.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Stance {
    Block { chance: f32, amount: f32 },
    Evade { chance: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantState {
    pub name: String,
    pub health: f32,
    pub max_health: f32,
    pub attack: f32,
    pub defense: f32,
    pub shield: f32,
    pub effects: SmallVec<[ActiveEffect; 4]>,
    pub stance: Option<Stance>,
    pub stunned: bool,
}

impl CombatantState {
    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    pub fn has_effect(&self, kind: StatusKind) -> bool {
        self.effects.iter().any(|effect| effect.kind == kind)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatState {
    pub enemy_id: EnemyId,
    pub faction: Faction,
    pub threat: u32,
    pub phase: CombatPhase,
    pub turn_number: u32,
    pub player: CombatantState,
    pub enemy: CombatantState,
    /// Remaining cooldown rounds per player action; absent means ready.
    pub cooldowns: BTreeMap<ActionId, u32>,
    pub autobattle: bool,
    pub autobattle_executing: bool,
    /// Relic effects active for this encounter, captured at combat start.
    pub relic_effects: SmallVec<[RelicEffect; 4]>,
    pub log: VecDeque<String>,
    pub damage_dealt: f32,
    pub damage_taken: f32,
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedStructure {
    pub kind: StructureKindId,
    pub position: GridPos,
    pub built_turn: u64,
    pub uses_remaining: u32,
    pub cooldown_remaining: u32,
}

// ---------------------------------------------------------------------------
// Progression and economy state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatStats {
    pub enemies_defeated: u32,
    pub battles_won: u32,
    pub battles_lost: u32,
    pub retreats: u32,
    pub total_damage_dealt: u64,
    pub total_damage_taken: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelicState {
    pub id: RelicId,
    pub kind: RelicKindId,
    pub rarity: Rarity,
    pub equipped: bool,
    pub durability: u32,
    pub max_durability: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionState {
    pub level: u32,
    pub experience: u32,
    pub experience_to_next: u32,
    pub skill_points: u32,
    pub combat_points: u32,
    pub stats: CombatStats,
    pub achievements: BTreeSet<AchievementId>,
    pub relics: Vec<RelicState>,
    pub purchased_upgrades: BTreeSet<UpgradeId>,
    pub branch_levels: BTreeMap<UpgradeId, u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CraftingState {
    pub level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseState {
    pub level: u32,
    pub defense: u32,
    pub max_defense: u32,
    pub population: u32,
    pub max_population: u32,
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub meta: MetaState,
    pub grid: GridState,
    pub enemies: Vec<HiddenEnemy>,
    pub character: CharacterState,
    pub resources: ResourceLedger,
    pub structures: Vec<PlacedStructure>,
    pub combat: Option<CombatState>,
    pub progression: ProgressionState,
    pub crafting: CraftingState,
    pub base: BaseState,
    pub counters: Counters,
}

impl GameState {
    pub fn in_combat(&self) -> bool {
        self.combat.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaState {
    /// Exploration turns resolved so far (accepted moves).
    pub turn: u64,
    pub seed: u64,
    pub schema_version: u32,
    pub content_version: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_event_id: u64,
    pub next_command_id: u64,
    pub next_relic_id: u64,
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandEnvelope {
    pub id: CommandId,
    pub issued_turn: u64,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    MovePlayer { target: GridPos },
    PerformCombatAction { action: ActionId },
    UseCombatItem { item_id: ItemId },
    ResolveEnemyTurn,
    ToggleAutobattle,
    AutobattleTurn,
    RetreatFromCombat,
    BuildStructure { kind: StructureKindId },
    UseStructure,
    RemoveStructure,
    PurchaseHeroUpgrade { upgrade_id: UpgradeId },
    PurchaseBranchUpgrade { upgrade_id: UpgradeId },
    CraftItem { recipe_id: RecipeId },
    DisassembleItem { item_id: ItemId },
    UpgradeCrafting,
    UpgradeBase,
    RepairBase,
    EquipItem { item_id: ItemId },
    UnequipItem { slot: EquipSlot },
    UseItem { item_id: ItemId },
    ToggleRelic { relic_id: RelicId },
    RepairRelic { relic_id: RelicId },
    ResetGame,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: EventId,
    pub turn: u64,
    pub event: Event,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    PlayerMoved {
        from: GridPos,
        to: GridPos,
        remaining_turns: u32,
    },
    GameOver {
        position: GridPos,
    },
    EnemiesGenerated {
        count: u32,
    },
    EnemyDiscovered {
        enemy_id: EnemyId,
        name: String,
        threat: u32,
    },
    CombatStarted {
        enemy_id: EnemyId,
        enemy_health: f32,
        enemy_attack: f32,
    },
    CombatActionResolved {
        side: CombatSide,
        action: String,
        hit: bool,
        damage: f32,
    },
    StatusApplied {
        target: CombatSide,
        kind: StatusKind,
        turns: u32,
    },
    StatusTicked {
        target: CombatSide,
        kind: StatusKind,
        damage: f32,
    },
    TurnForfeited {
        side: CombatSide,
    },
    AutobattleToggled {
        enabled: bool,
    },
    CombatEnded {
        enemy_id: EnemyId,
        outcome: CombatOutcome,
    },
    RewardsGranted {
        experience: u32,
        combat_points: u32,
        resources: ResourceBundle,
    },
    LevelUp {
        level: u32,
        skill_points: u32,
    },
    AchievementUnlocked {
        achievement_id: AchievementId,
    },
    RelicDiscovered {
        relic_id: RelicId,
        kind: RelicKindId,
        rarity: Rarity,
    },
    RelicToggled {
        relic_id: RelicId,
        equipped: bool,
    },
    RelicWorn {
        relic_id: RelicId,
        durability: u32,
    },
    RelicBroken {
        relic_id: RelicId,
    },
    RelicRepaired {
        relic_id: RelicId,
        durability: u32,
    },
    ItemDropped {
        item_id: ItemId,
        name: String,
        rarity: Rarity,
    },
    ItemEquipped {
        item_id: ItemId,
        slot: EquipSlot,
    },
    ItemUnequipped {
        item_id: ItemId,
        slot: EquipSlot,
    },
    ItemUsed {
        item_id: ItemId,
        name: String,
    },
    ItemCrafted {
        item_id: ItemId,
        recipe_id: RecipeId,
    },
    ItemDisassembled {
        item_id: ItemId,
        refunded: ResourceBundle,
    },
    CraftingUpgraded {
        level: u32,
    },
    HeroUpgradePurchased {
        upgrade_id: UpgradeId,
    },
    BranchUpgradePurchased {
        upgrade_id: UpgradeId,
        level: u32,
    },
    BaseUpgraded {
        level: u32,
    },
    BaseRepaired {
        defense: u32,
    },
    StructureBuilt {
        kind: StructureKindId,
        position: GridPos,
    },
    StructureUsed {
        kind: StructureKindId,
        position: GridPos,
        message: String,
    },
    StructureRemoved {
        kind: StructureKindId,
        position: GridPos,
    },
    StructureReady {
        position: GridPos,
    },
    ResourcesProduced {
        resources: ResourceBundle,
    },
    PlasmaBoostExpired,
    GameReset,
}

// ---------------------------------------------------------------------------
// Content types (static, loaded once)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameContent {
    pub content_version: String,
    pub constants: Constants,
    pub player_actions: Vec<PlayerActionDef>,
    pub enemy_archetypes: Vec<EnemyArchetypeDef>,
    pub status_effects: Vec<StatusEffectDef>,
    pub enemy_roster: Vec<EnemyTemplateDef>,
    pub structures: Vec<StructureDef>,
    pub recipes: Vec<RecipeDef>,
    pub item_templates: Vec<ItemTemplateDef>,
    pub hero_upgrades: Vec<HeroUpgradeDef>,
    pub branches: Vec<BranchDef>,
    pub relics: Vec<RelicDef>,
    pub achievements: Vec<AchievementDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    pub grid_size: i32,
    pub max_turns: u32,
    pub enemy_count: u32,
    pub enemy_placement_attempts: u32,
    pub starting_health: i32,
    pub starting_attack: i32,
    pub starting_defense: i32,
    pub starting_speed: i32,
    pub starting_shield: i32,
    pub inventory_capacity: u32,
    pub combat_log_capacity: usize,
    /// Defeat restores this fraction of max health.
    pub defeat_health_fraction: f32,
    /// Enemy AI prefers healing below this health fraction.
    pub enemy_heal_threshold: f32,
    /// Fraction of max health restored by an enemy heal action.
    pub enemy_heal_fraction: f32,
    pub enemy_phase_evade_chance: f32,
    pub loot_drop_chance: f32,
    pub relic_base_chance: f32,
    pub relic_bonus_chance_threat4: f32,
    pub relic_bonus_chance_threat5: f32,
    pub max_relics: usize,
    pub relic_durability: u32,
    pub relic_wear_per_combat: u32,
    pub relic_repair_amount: u32,
    pub max_level: u32,
    pub base_experience_to_next: u32,
    pub experience_growth: f64,
    pub skill_points_per_level: u32,
    pub max_crafting_level: u32,
    pub crafting_bonus_per_level: f64,
    pub max_base_level: u32,
    pub base_repair_amount: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutobattleRole {
    Basic,
    Heavy,
    Special,
    #[default]
    Standard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerActionKind {
    Strike {
        damage: f32,
        accuracy: f32,
        #[serde(default = "one")]
        hits: u32,
        #[serde(default)]
        cooldown: u32,
        #[serde(default)]
        role: AutobattleRole,
    },
    Defend {
        block_chance: f32,
        block_amount: f32,
    },
    Dodge {
        chance: f32,
    },
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerActionDef {
    pub id: ActionId,
    pub name: String,
    pub kind: PlayerActionKind,
}

impl PlayerActionDef {
    pub fn cooldown(&self) -> u32 {
        match self.kind {
            PlayerActionKind::Strike { cooldown, .. } => cooldown,
            PlayerActionKind::Defend { .. } | PlayerActionKind::Dodge { .. } => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyActionEffect {
    Inflict(StatusKind),
    Berserk,
    Heal,
    Phase,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyActionDef {
    pub name: String,
    pub damage: f32,
    pub accuracy: f32,
    #[serde(default)]
    pub effect: Option<EnemyActionEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyArchetypeDef {
    pub id: String,
    pub faction: Faction,
    pub actions: Vec<EnemyActionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEffectDef {
    pub kind: StatusKind,
    pub name: String,
    pub duration: u32,
    #[serde(default)]
    pub damage_per_turn: f32,
    #[serde(default)]
    pub value: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyTemplateDef {
    pub name: String,
    pub faction: Faction,
    pub threat: u32,
}

/// Closed set of structure utility effects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureEffect {
    RestoreShield,
    RestoreHealth,
    RestoreTurns {
        amount: u32,
    },
    PlasmaBoost {
        attack_multiplier: f32,
        defense_multiplier: f32,
        turns: u32,
    },
    Passive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructureDef {
    pub id: StructureKindId,
    pub name: String,
    pub icon: String,
    pub cost: ResourceBundle,
    pub allowed_terrain: Vec<Terrain>,
    pub uses: u32,
    pub cooldown: u32,
    pub effect: StructureEffect,
    #[serde(default)]
    pub production: ResourceBundle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDef {
    pub id: RecipeId,
    pub name: String,
    pub rarity: Rarity,
    pub cost: ResourceBundle,
    #[serde(default)]
    pub stackable: bool,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemTemplateDef {
    pub name: String,
    pub rarity: Rarity,
    #[serde(default)]
    pub stackable: bool,
    pub kind: ItemKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroUpgradeDef {
    pub id: UpgradeId,
    pub name: String,
    pub cost: ResourceBundle,
    pub delta: StatDelta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchStat {
    MaxHealth,
    Attack,
    Defense,
    Speed,
    InventorySize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchUpgradeDef {
    pub id: UpgradeId,
    pub name: String,
    pub base_cost: u32,
    pub cost_multiplier: f64,
    pub stat: BranchStat,
    pub per_level: i32,
    pub max_level: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BranchDef {
    pub id: BranchId,
    pub name: String,
    pub resource: ResourceKind,
    pub upgrades: Vec<BranchUpgradeDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelicEffect {
    DoubleAttack,
    PoisonOnHit { damage_per_turn: f32 },
    BrutalStrike,
    EnergyDrain,
    WarpResistance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelicDef {
    pub id: RelicKindId,
    pub name: String,
    pub rarity: Rarity,
    pub delta: StatDelta,
    #[serde(default)]
    pub effect: Option<RelicEffect>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementTrigger {
    EnemiesDefeated(u32),
    BattlesLost(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardBundle {
    pub experience: u32,
    pub combat_points: u32,
    pub resources: ResourceBundle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementDef {
    pub id: AchievementId,
    pub name: String,
    pub trigger: AchievementTrigger,
    pub reward: RewardBundle,
}
