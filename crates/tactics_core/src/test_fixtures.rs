//! Shared test fixtures for tactics_core and downstream crates.
//!
//! `base_content()` mirrors the shipped content tables so scenario tests run
//! against realistic numbers. `base_state()` is a fresh game with no enemies
//! placed; tests add the enemies they need with `place_enemy()`.

use crate::{
    AchievementDef, AchievementId, AchievementTrigger, ActionId, AutobattleRole, BaseState,
    BranchDef, BranchId, BranchStat, BranchUpgradeDef, CharacterState, CombatBuffDef, CombatPhase,
    CombatState, CombatantState, ConsumableEffect, Constants, Counters, CraftingState,
    EnemyActionDef, EnemyActionEffect, EnemyArchetypeDef, EnemyId, EnemyTemplateDef, Equipment,
    Faction, GameContent, GameState, GridPos, GridState, HeroUpgradeDef, HiddenEnemy, Item,
    ItemId, ItemKind, ItemTemplateDef, MetaState, PlayerActionDef, PlayerActionKind,
    ProgressionState, Rarity, RecipeDef, RecipeId, RelicDef, RelicEffect, RelicKindId,
    ResourceKind, ResourceLedger, RewardBundle, StatDelta, StatusEffectDef, StatusKind,
    StructureDef, StructureEffect, StructureKindId, Terrain, UpgradeId,
};
use crate::economy::bundle;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;

pub fn make_rng() -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(42)
}

pub fn test_constants() -> Constants {
    Constants {
        grid_size: 10,
        max_turns: 30,
        enemy_count: 8,
        enemy_placement_attempts: 100,
        starting_health: 100,
        starting_attack: 10,
        starting_defense: 5,
        starting_speed: 100,
        starting_shield: 50,
        inventory_capacity: 12,
        combat_log_capacity: 10,
        defeat_health_fraction: 0.5,
        enemy_heal_threshold: 0.3,
        enemy_heal_fraction: 0.2,
        enemy_phase_evade_chance: 50.0,
        loot_drop_chance: 0.3,
        relic_base_chance: 0.15,
        relic_bonus_chance_threat4: 0.10,
        relic_bonus_chance_threat5: 0.15,
        max_relics: 5,
        relic_durability: 100,
        relic_wear_per_combat: 10,
        relic_repair_amount: 25,
        max_level: 10,
        base_experience_to_next: 100,
        experience_growth: 1.5,
        skill_points_per_level: 2,
        max_crafting_level: 5,
        crafting_bonus_per_level: 0.1,
        max_base_level: 5,
        base_repair_amount: 10,
    }
}

// ---------------------------------------------------------------------------
// Combat tables
// ---------------------------------------------------------------------------

fn strike(
    id: &str,
    name: &str,
    damage: f32,
    accuracy: f32,
    hits: u32,
    cooldown: u32,
    role: AutobattleRole,
) -> PlayerActionDef {
    PlayerActionDef {
        id: ActionId(id.to_string()),
        name: name.to_string(),
        kind: PlayerActionKind::Strike {
            damage,
            accuracy,
            hits,
            cooldown,
            role,
        },
    }
}

fn player_actions() -> Vec<PlayerActionDef> {
    vec![
        strike("attack", "Attack", 15.0, 85.0, 1, 0, AutobattleRole::Basic),
        PlayerActionDef {
            id: ActionId("defend".to_string()),
            name: "Defend".to_string(),
            kind: PlayerActionKind::Defend {
                block_chance: 60.0,
                block_amount: 50.0,
            },
        },
        PlayerActionDef {
            id: ActionId("dodge".to_string()),
            name: "Dodge".to_string(),
            kind: PlayerActionKind::Dodge { chance: 40.0 },
        },
        strike("heavy_attack", "Heavy Attack", 25.0, 70.0, 1, 2, AutobattleRole::Heavy),
        strike("rapid_fire", "Rapid Fire", 8.0, 90.0, 3, 0, AutobattleRole::Standard),
        strike("special_ability", "Special Ability", 30.0, 80.0, 1, 3, AutobattleRole::Special),
    ]
}

fn enemy_action(
    name: &str,
    damage: f32,
    accuracy: f32,
    effect: Option<EnemyActionEffect>,
) -> EnemyActionDef {
    EnemyActionDef {
        name: name.to_string(),
        damage,
        accuracy,
        effect,
    }
}

fn enemy_archetypes() -> Vec<EnemyArchetypeDef> {
    use EnemyActionEffect::{Berserk, Heal, Inflict, Phase};
    vec![
        EnemyArchetypeDef {
            id: "tyranid_warrior".to_string(),
            faction: Faction::Tyranids,
            actions: vec![
                enemy_action("Slash", 12.0, 80.0, None),
                enemy_action("Poison Strike", 8.0, 75.0, Some(Inflict(StatusKind::Poison))),
                enemy_action("Screech", 5.0, 90.0, Some(Inflict(StatusKind::Stun))),
            ],
        },
        EnemyArchetypeDef {
            id: "ork_boy".to_string(),
            faction: Faction::Orks,
            actions: vec![
                enemy_action("Chop", 15.0, 75.0, None),
                enemy_action("Headbutt", 10.0, 85.0, Some(Inflict(StatusKind::Stun))),
                enemy_action("WAAAGH!", 20.0, 60.0, Some(Berserk)),
            ],
        },
        EnemyArchetypeDef {
            id: "necron_warrior".to_string(),
            faction: Faction::Necrons,
            actions: vec![
                enemy_action("Gauss Blast", 18.0, 85.0, None),
                enemy_action("Phase Shift", 0.0, 100.0, Some(Phase)),
                enemy_action("Reconstruct", 0.0, 100.0, Some(Heal)),
            ],
        },
        EnemyArchetypeDef {
            id: "chaos_marine".to_string(),
            faction: Faction::Chaos,
            actions: vec![
                enemy_action("Bolter Shot", 16.0, 80.0, None),
                enemy_action("Chaos Blast", 25.0, 70.0, Some(Inflict(StatusKind::Burn))),
                enemy_action("Demonic Strength", 30.0, 65.0, Some(Berserk)),
            ],
        },
    ]
}

fn status_effects() -> Vec<StatusEffectDef> {
    let def = |kind, name: &str, duration, damage_per_turn, value| StatusEffectDef {
        kind,
        name: name.to_string(),
        duration,
        damage_per_turn,
        value,
    };
    vec![
        def(StatusKind::Poison, "Poison", 3, 5.0, 0.0),
        def(StatusKind::Burn, "Burn", 2, 8.0, 0.0),
        def(StatusKind::Stun, "Stunned", 1, 0.0, 0.0),
        def(StatusKind::Berserk, "Berserk", 2, 0.0, 1.5),
    ]
}

fn enemy_roster() -> Vec<EnemyTemplateDef> {
    [
        ("Tyranid Warrior", Faction::Tyranids, 3),
        ("Ork Boy", Faction::Orks, 2),
        ("Necron Warrior", Faction::Necrons, 4),
        ("Chaos Cultist", Faction::Chaos, 1),
        ("Genestealer", Faction::Tyranids, 3),
        ("Ork Nob", Faction::Orks, 4),
        ("Chaos Marine", Faction::Chaos, 5),
        ("Necron Immortal", Faction::Necrons, 5),
    ]
    .into_iter()
    .map(|(name, faction, threat)| EnemyTemplateDef {
        name: name.to_string(),
        faction,
        threat,
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

fn structures() -> Vec<StructureDef> {
    use ResourceKind::{Biomass, Scrap, Warpstone};
    let def = |id: &str, name: &str, icon: &str, cost, allowed_terrain, effect| StructureDef {
        id: StructureKindId(id.to_string()),
        name: name.to_string(),
        icon: icon.to_string(),
        cost,
        allowed_terrain,
        uses: 1,
        cooldown: 5,
        effect,
        production: Default::default(),
    };
    vec![
        def(
            "shield_generator",
            "Shield Generator",
            "🛡️",
            bundle(&[(Warpstone, 25), (Scrap, 15)]),
            vec![Terrain::Plains, Terrain::Hills, Terrain::WarpstoneDeposit],
            StructureEffect::RestoreShield,
        ),
        def(
            "medical_hospital",
            "Medical Hospital",
            "🏥",
            bundle(&[(Biomass, 30), (Scrap, 20)]),
            vec![Terrain::Plains, Terrain::Forest, Terrain::Ruins],
            StructureEffect::RestoreHealth,
        ),
        def(
            "outpost",
            "Outpost",
            "🏛️",
            bundle(&[(Scrap, 35), (Biomass, 15)]),
            vec![Terrain::Plains, Terrain::Hills, Terrain::Ruins],
            StructureEffect::RestoreTurns { amount: 10 },
        ),
        def(
            "plasma_reactor",
            "Plasma Reactor",
            "⚡",
            bundle(&[(Warpstone, 40), (Scrap, 30)]),
            vec![Terrain::WarpstoneDeposit, Terrain::Ruins],
            StructureEffect::PlasmaBoost {
                attack_multiplier: 1.5,
                defense_multiplier: 1.3,
                turns: 3,
            },
        ),
        StructureDef {
            uses: 0,
            cooldown: 0,
            production: bundle(&[(Scrap, 2)]),
            ..def(
                "scrap_forge",
                "Scrap Forge",
                "⚒️",
                bundle(&[(Scrap, 20), (Biomass, 10)]),
                vec![Terrain::Hills, Terrain::Forest, Terrain::Ruins],
                StructureEffect::Passive,
            )
        },
    ]
}

// ---------------------------------------------------------------------------
// Items and economy
// ---------------------------------------------------------------------------

fn gear(attack: i32, defense: i32, max_health: i32, speed: i32) -> StatDelta {
    StatDelta {
        max_health,
        attack,
        defense,
        speed,
    }
}

fn recipes() -> Vec<RecipeDef> {
    use ResourceKind::{Biomass, Scrap, Warpstone};
    let recipe = |id: &str, name: &str, rarity, cost, stackable, kind| RecipeDef {
        id: RecipeId(id.to_string()),
        name: name.to_string(),
        rarity,
        cost,
        stackable,
        kind,
    };
    vec![
        recipe(
            "power_sword",
            "Power Sword",
            Rarity::Rare,
            bundle(&[(Scrap, 25), (Warpstone, 10)]),
            false,
            ItemKind::Weapon(gear(15, 3, 0, 0)),
        ),
        recipe(
            "plasma_rifle",
            "Plasma Rifle",
            Rarity::Epic,
            bundle(&[(Scrap, 40), (Warpstone, 20)]),
            false,
            ItemKind::Weapon(gear(25, 0, 0, -10)),
        ),
        recipe(
            "terminator_armor",
            "Terminator Armor",
            Rarity::Legendary,
            bundle(&[(Scrap, 80), (Warpstone, 40), (Biomass, 20)]),
            false,
            ItemKind::Armor(gear(0, 20, 100, -30)),
        ),
        recipe(
            "healing_potion",
            "Healing Potion",
            Rarity::Common,
            bundle(&[(Biomass, 15)]),
            true,
            ItemKind::Consumable(ConsumableEffect {
                heal: 50,
                ..ConsumableEffect::default()
            }),
        ),
        recipe(
            "warp_bomb",
            "Warp Bomb",
            Rarity::Rare,
            bundle(&[(Warpstone, 25), (Scrap, 15)]),
            false,
            ItemKind::Consumable(ConsumableEffect {
                damage: 100,
                ..ConsumableEffect::default()
            }),
        ),
    ]
}

fn item_templates() -> Vec<ItemTemplateDef> {
    let template = |name: &str, rarity, stackable, kind| ItemTemplateDef {
        name: name.to_string(),
        rarity,
        stackable,
        kind,
    };
    vec![
        template("Bolt Pistol", Rarity::Common, false, ItemKind::Weapon(gear(2, 0, 0, 0))),
        template("Chainsword", Rarity::Common, false, ItemKind::Weapon(gear(3, 0, 0, 0))),
        template("Power Sword", Rarity::Uncommon, false, ItemKind::Weapon(gear(5, 0, 0, 0))),
        template("Plasma Gun", Rarity::Rare, false, ItemKind::Weapon(gear(8, 0, 0, 0))),
        template("Flak Armor", Rarity::Common, false, ItemKind::Armor(gear(0, 1, 10, 0))),
        template("Carapace Armor", Rarity::Uncommon, false, ItemKind::Armor(gear(0, 3, 20, -10))),
        template("Power Armor", Rarity::Rare, false, ItemKind::Armor(gear(1, 5, 50, 0))),
        template("Combat Stimms", Rarity::Common, false, ItemKind::Accessory(gear(0, 0, 0, 20))),
        template("Refractor Field", Rarity::Uncommon, false, ItemKind::Accessory(gear(0, 2, 0, 0))),
        template("Iron Halo", Rarity::Rare, false, ItemKind::Accessory(gear(1, 2, 25, 0))),
        template(
            "Medi-Kit",
            Rarity::Common,
            true,
            ItemKind::Consumable(ConsumableEffect {
                heal: 30,
                ..ConsumableEffect::default()
            }),
        ),
        template(
            "Combat Drugs",
            Rarity::Uncommon,
            true,
            ItemKind::Consumable(ConsumableEffect {
                buff: Some(CombatBuffDef {
                    attack: 5,
                    defense: 0,
                    combats: 3,
                }),
                ..ConsumableEffect::default()
            }),
        ),
        template(
            "Holy Unguent",
            Rarity::Rare,
            false,
            ItemKind::Consumable(ConsumableEffect {
                heal: 50,
                damage: 0,
                buff: Some(CombatBuffDef {
                    attack: 0,
                    defense: 3,
                    combats: 2,
                }),
            }),
        ),
    ]
}

fn hero_upgrades() -> Vec<HeroUpgradeDef> {
    use ResourceKind::{Biomass, Scrap, Warpstone};
    let upgrade = |id: &str, name: &str, cost, delta| HeroUpgradeDef {
        id: UpgradeId(id.to_string()),
        name: name.to_string(),
        cost,
        delta,
    };
    vec![
        upgrade("weapon_mastery", "Weapon Mastery", bundle(&[(Scrap, 30)]), gear(5, 0, 0, 0)),
        upgrade("armor_training", "Armor Training", bundle(&[(Scrap, 25)]), gear(0, 3, 0, 0)),
        upgrade("warrior_spirit", "Warrior Spirit", bundle(&[(Biomass, 20)]), gear(0, 0, 25, 0)),
        upgrade(
            "lightning_reflexes",
            "Lightning Reflexes",
            bundle(&[(Warpstone, 15)]),
            gear(0, 0, 0, 20),
        ),
        upgrade(
            "warrior_legacy",
            "Warrior Legacy",
            bundle(&[(Warpstone, 50), (Scrap, 30)]),
            gear(2, 2, 20, 20),
        ),
    ]
}

fn branch_upgrade(
    id: &str,
    name: &str,
    base_cost: u32,
    cost_multiplier: f64,
    stat: BranchStat,
    per_level: i32,
    max_level: u32,
) -> BranchUpgradeDef {
    BranchUpgradeDef {
        id: UpgradeId(id.to_string()),
        name: name.to_string(),
        base_cost,
        cost_multiplier,
        stat,
        per_level,
        max_level,
    }
}

fn branches() -> Vec<BranchDef> {
    use BranchStat::{Attack, Defense, InventorySize, MaxHealth, Speed};
    vec![
        BranchDef {
            id: BranchId("biological".to_string()),
            name: "Biological Enhancements".to_string(),
            resource: ResourceKind::Biomass,
            upgrades: vec![
                branch_upgrade(
                    "enhanced_physiology",
                    "Enhanced Physiology",
                    8,
                    1.4,
                    MaxHealth,
                    15,
                    8,
                ),
                branch_upgrade("adrenal_glands", "Adrenal Glands", 12, 1.5, Speed, 15, 6),
                branch_upgrade(
                    "regenerative_tissue",
                    "Regenerative Tissue",
                    15,
                    1.6,
                    Defense,
                    2,
                    10,
                ),
                branch_upgrade(
                    "expanded_neural_capacity",
                    "Expanded Neural Capacity",
                    20,
                    2.0,
                    InventorySize,
                    3,
                    4,
                ),
            ],
        },
        BranchDef {
            id: BranchId("technical".to_string()),
            name: "Mechanicus Augmentations".to_string(),
            resource: ResourceKind::Scrap,
            upgrades: vec![
                branch_upgrade("bionic_limbs", "Bionic Limbs", 10, 1.3, Attack, 3, 12),
                branch_upgrade(
                    "servo_skull_companion",
                    "Servo-Skull Companion",
                    15,
                    1.4,
                    Attack,
                    2,
                    8,
                ),
                branch_upgrade(
                    "reinforced_skeleton",
                    "Reinforced Skeleton",
                    18,
                    1.5,
                    MaxHealth,
                    20,
                    6,
                ),
                branch_upgrade("cogitator_implant", "Cogitator Implant", 25, 1.8, Speed, 20, 5),
            ],
        },
        BranchDef {
            id: BranchId("psionic".to_string()),
            name: "Psychic Disciplines".to_string(),
            resource: ResourceKind::Warpstone,
            upgrades: vec![
                branch_upgrade("minor_telepathy", "Minor Telepathy", 3, 1.6, Speed, 10, 8),
                branch_upgrade("psychic_ward", "Psychic Ward", 5, 1.7, Defense, 3, 6),
                branch_upgrade("force_projection", "Force Projection", 8, 1.8, Attack, 4, 7),
                branch_upgrade("battle_prescience", "Battle Prescience", 12, 2.0, MaxHealth, 25, 4),
            ],
        },
    ]
}

fn relics() -> Vec<RelicDef> {
    let relic = |id: &str, name: &str, rarity, delta, effect| RelicDef {
        id: RelicKindId(id.to_string()),
        name: name.to_string(),
        rarity,
        delta,
        effect: Some(effect),
    };
    vec![
        relic(
            "emperor_sword",
            "Emperor's Sword",
            Rarity::Legendary,
            gear(20, 5, 0, 0),
            RelicEffect::DoubleAttack,
        ),
        relic(
            "chaos_amulet",
            "Chaos Amulet",
            Rarity::Epic,
            gear(0, 10, 50, 0),
            RelicEffect::WarpResistance,
        ),
        relic(
            "necron_staff",
            "Necron Staff",
            Rarity::Rare,
            gear(15, 0, 0, 20),
            RelicEffect::EnergyDrain,
        ),
        relic(
            "ork_choppa",
            "Ork Choppa",
            Rarity::Common,
            gear(8, 0, 0, 0),
            RelicEffect::BrutalStrike,
        ),
        relic(
            "tyranid_fang",
            "Tyranid Fang",
            Rarity::Uncommon,
            gear(6, 0, 0, 0),
            RelicEffect::PoisonOnHit { damage_per_turn: 3.0 },
        ),
    ]
}

fn achievements() -> Vec<AchievementDef> {
    use ResourceKind::{Biomass, Scrap, Warpstone};
    let achievement =
        |id: &str, name: &str, trigger, combat_points, experience, resources| AchievementDef {
        id: AchievementId(id.to_string()),
        name: name.to_string(),
        trigger,
        reward: RewardBundle {
            experience,
            combat_points,
            resources,
        },
    };
    vec![
        achievement(
            "first_blood",
            "First Blood",
            AchievementTrigger::EnemiesDefeated(1),
            50,
            100,
            bundle(&[]),
        ),
        achievement(
            "veteran",
            "Veteran",
            AchievementTrigger::EnemiesDefeated(5),
            100,
            200,
            bundle(&[(Biomass, 10)]),
        ),
        achievement(
            "elite",
            "Elite",
            AchievementTrigger::EnemiesDefeated(10),
            200,
            400,
            bundle(&[(Scrap, 15)]),
        ),
        achievement(
            "legendary",
            "Legendary",
            AchievementTrigger::EnemiesDefeated(20),
            500,
            1000,
            bundle(&[(Warpstone, 10)]),
        ),
        achievement(
            "survivor",
            "Survivor",
            AchievementTrigger::BattlesLost(3),
            150,
            300,
            bundle(&[]),
        ),
    ]
}

/// Full content matching the shipped tables.
pub fn base_content() -> GameContent {
    GameContent {
        content_version: "test".to_string(),
        constants: test_constants(),
        player_actions: player_actions(),
        enemy_archetypes: enemy_archetypes(),
        status_effects: status_effects(),
        enemy_roster: enemy_roster(),
        structures: structures(),
        recipes: recipes(),
        item_templates: item_templates(),
        hero_upgrades: hero_upgrades(),
        branches: branches(),
        relics: relics(),
        achievements: achievements(),
    }
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Fresh game at the start cell with an empty ledger and no enemies.
pub fn base_state(content: &GameContent) -> GameState {
    let c = &content.constants;
    let grid = GridState {
        size: c.grid_size,
        player: GridPos::new(c.grid_size / 2, c.grid_size / 2),
        remaining_turns: c.max_turns,
        max_turns: c.max_turns,
        is_game_over: false,
    };
    GameState {
        meta: MetaState {
            turn: 0,
            seed: 42,
            schema_version: 1,
            content_version: content.content_version.clone(),
        },
        grid,
        enemies: Vec::new(),
        character: CharacterState {
            health: c.starting_health,
            max_health: c.starting_health,
            attack: c.starting_attack,
            defense: c.starting_defense,
            speed: c.starting_speed,
            shield: c.starting_shield,
            max_shield: c.starting_shield,
            equipment: Equipment::default(),
            inventory: Vec::new(),
            inventory_capacity: c.inventory_capacity,
            plasma_boost: None,
            combat_buffs: Vec::new(),
        },
        resources: ResourceLedger::default(),
        structures: Vec::new(),
        combat: None,
        progression: ProgressionState {
            level: 1,
            experience: 0,
            experience_to_next: c.base_experience_to_next,
            skill_points: 0,
            combat_points: 0,
            stats: Default::default(),
            achievements: Default::default(),
            relics: Vec::new(),
            purchased_upgrades: Default::default(),
            branch_levels: Default::default(),
        },
        crafting: CraftingState { level: 1 },
        base: BaseState {
            level: 1,
            defense: 10,
            max_defense: 50,
            population: 0,
            max_population: 10,
        },
        counters: Counters::default(),
    }
}

/// Adds an undiscovered Ork enemy at `position`.
pub fn place_enemy(state: &mut GameState, id: &str, position: GridPos, threat: u32) {
    state.enemies.push(HiddenEnemy {
        id: EnemyId(id.to_string()),
        name: "Ork Boy".to_string(),
        faction: Faction::Orks,
        threat,
        position,
        discovered: false,
        defeated: false,
        in_combat: false,
        stats: None,
    });
}

pub fn test_item(id: &str, name: &str, stackable: bool, kind: ItemKind) -> Item {
    Item {
        id: ItemId(id.to_string()),
        name: name.to_string(),
        rarity: Rarity::Common,
        quantity: 1,
        stackable,
        kind,
        recipe: None,
    }
}

/// A fresh encounter against a Necron of the given threat. The player has the
/// base character's stats and no shield.
pub fn combat_state(content: &GameContent, threat: u32) -> CombatState {
    let c = &content.constants;
    let stats = crate::enemy_stats_for_threat(threat);
    let side = |name: &str, health: f32, attack: f32, defense: f32| CombatantState {
        name: name.to_string(),
        health,
        max_health: health,
        attack,
        defense,
        shield: 0.0,
        effects: SmallVec::new(),
        stance: None,
        stunned: false,
    };
    CombatState {
        enemy_id: EnemyId("enemy_0".to_string()),
        faction: Faction::Necrons,
        threat,
        phase: CombatPhase::PlayerTurn,
        turn_number: 1,
        player: side(
            "You",
            c.starting_health as f32,
            c.starting_attack as f32,
            c.starting_defense as f32,
        ),
        enemy: side(
            "Necron Warrior",
            stats.max_health as f32,
            stats.attack as f32,
            stats.defense as f32,
        ),
        cooldowns: Default::default(),
        autobattle: false,
        autobattle_executing: false,
        relic_effects: SmallVec::new(),
        log: Default::default(),
        damage_dealt: 0.0,
        damage_taken: 0.0,
    }
}
