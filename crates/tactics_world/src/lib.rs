//! Content loading and world setup shared by the CLI and the tests.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tactics_core::{
    AchievementDef, BaseState, BranchDef, CharacterState, Constants, Counters, CraftingState,
    EnemyActionEffect, EnemyArchetypeDef, EnemyTemplateDef, Equipment, GameContent, GameState,
    GridPos, GridState, HeroUpgradeDef, ItemTemplateDef, MetaState, PlayerActionDef,
    ProgressionState, RecipeDef, RelicDef, ResourceLedger, StatusEffectDef, StructureDef,
    StructureEffect,
};

const SCHEMA_VERSION: u32 = 1;

#[derive(Deserialize)]
struct CombatFile {
    content_version: String,
    player_actions: Vec<PlayerActionDef>,
    status_effects: Vec<StatusEffectDef>,
    enemy_archetypes: Vec<EnemyArchetypeDef>,
}

#[derive(Deserialize)]
struct EnemiesFile {
    roster: Vec<EnemyTemplateDef>,
}

#[derive(Deserialize)]
struct StructuresFile {
    structures: Vec<StructureDef>,
}

#[derive(Deserialize)]
struct ItemsFile {
    item_templates: Vec<ItemTemplateDef>,
    recipes: Vec<RecipeDef>,
}

#[derive(Deserialize)]
struct UpgradesFile {
    hero_upgrades: Vec<HeroUpgradeDef>,
    branches: Vec<BranchDef>,
}

#[derive(Deserialize)]
struct ProgressionFile {
    relics: Vec<RelicDef>,
    achievements: Vec<AchievementDef>,
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &str) -> Result<T> {
    let text = std::fs::read_to_string(dir.join(file)).with_context(|| format!("reading {file}"))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {file}"))
}

fn assert_unique<'a>(kind: &str, ids: impl IntoIterator<Item = &'a str>) {
    let mut seen = HashSet::new();
    for id in ids {
        assert!(!id.is_empty(), "{kind} has an empty id");
        assert!(seen.insert(id), "duplicate {kind} id '{id}'");
    }
}

/// Validates loaded content, panicking on any authoring error.
///
/// Catches mistakes like a roster entry for a faction with no archetype, an
/// enemy action inflicting a status with no definition, or a structure that
/// can be built nowhere.
pub fn validate_content(content: &GameContent) {
    let c = &content.constants;
    assert!(c.grid_size > 0, "grid_size must be positive");
    assert!(c.max_turns > 0, "max_turns must be positive");
    assert!(
        c.enemy_count < (c.grid_size * c.grid_size) as u32,
        "enemy_count {} does not fit on a {}x{} grid",
        c.enemy_count,
        c.grid_size,
        c.grid_size,
    );
    assert!(
        c.defeat_health_fraction > 0.0 && c.defeat_health_fraction <= 1.0,
        "defeat_health_fraction must be in (0, 1]",
    );
    assert!(c.combat_log_capacity > 0, "combat_log_capacity must be positive");
    assert!(c.experience_growth >= 1.0, "experience_growth must be at least 1");

    assert_unique("player action", content.player_actions.iter().map(|a| a.id.0.as_str()));
    assert_unique("structure", content.structures.iter().map(|s| s.id.0.as_str()));
    assert_unique("recipe", content.recipes.iter().map(|r| r.id.0.as_str()));
    assert_unique("relic", content.relics.iter().map(|r| r.id.0.as_str()));
    assert_unique("achievement", content.achievements.iter().map(|a| a.id.0.as_str()));
    // Hero and branch upgrades share one purchase namespace.
    assert_unique(
        "upgrade",
        content
            .hero_upgrades
            .iter()
            .map(|u| u.id.0.as_str())
            .chain(
                content
                    .branches
                    .iter()
                    .flat_map(|b| b.upgrades.iter().map(|u| u.id.0.as_str())),
            ),
    );

    for template in &content.enemy_roster {
        assert!(
            content
                .enemy_archetypes
                .iter()
                .any(|archetype| archetype.faction == template.faction),
            "roster enemy '{}' has faction {} with no archetype",
            template.name,
            template.faction,
        );
        assert!(template.threat >= 1, "roster enemy '{}' has threat 0", template.name);
    }

    for archetype in &content.enemy_archetypes {
        assert!(
            !archetype.actions.is_empty(),
            "archetype '{}' has no actions",
            archetype.id,
        );
        for action in &archetype.actions {
            if let Some(EnemyActionEffect::Inflict(kind)) = action.effect {
                assert!(
                    content.status_effects.iter().any(|def| def.kind == kind),
                    "archetype '{}' action '{}' inflicts {kind:?} with no status definition",
                    archetype.id,
                    action.name,
                );
            }
        }
    }

    for structure in &content.structures {
        assert!(
            !structure.allowed_terrain.is_empty(),
            "structure '{}' has no allowed terrain",
            structure.id,
        );
        if matches!(structure.effect, StructureEffect::Passive) {
            assert!(
                !structure.production.is_empty(),
                "passive structure '{}' produces nothing",
                structure.id,
            );
        } else {
            assert!(
                structure.uses > 0,
                "structure '{}' has an effect but no uses",
                structure.id,
            );
        }
    }

    for branch in &content.branches {
        for upgrade in &branch.upgrades {
            assert!(
                upgrade.base_cost > 0 && upgrade.max_level > 0,
                "branch upgrade '{}' needs a positive cost and max level",
                upgrade.id,
            );
        }
    }
}

pub fn load_content(content_dir: &str) -> Result<GameContent> {
    let dir = Path::new(content_dir);
    let constants: Constants = read_json(dir, "constants.json")?;
    let combat: CombatFile = read_json(dir, "combat.json")?;
    let enemies: EnemiesFile = read_json(dir, "enemies.json")?;
    let structures: StructuresFile = read_json(dir, "structures.json")?;
    let items: ItemsFile = read_json(dir, "items.json")?;
    let upgrades: UpgradesFile = read_json(dir, "upgrades.json")?;
    let progression: ProgressionFile = read_json(dir, "progression.json")?;

    let content = GameContent {
        content_version: combat.content_version,
        constants,
        player_actions: combat.player_actions,
        enemy_archetypes: combat.enemy_archetypes,
        status_effects: combat.status_effects,
        enemy_roster: enemies.roster,
        structures: structures.structures,
        recipes: items.recipes,
        item_templates: items.item_templates,
        hero_upgrades: upgrades.hero_upgrades,
        branches: upgrades.branches,
        relics: progression.relics,
        achievements: progression.achievements,
    };
    validate_content(&content);
    Ok(content)
}

/// Fresh game state: the player on the centre cell with the starting stats,
/// an empty ledger and no enemies. `GameSession::new` places the enemies.
pub fn build_initial_state(content: &GameContent, seed: u64) -> GameState {
    let c = &content.constants;
    let centre = c.grid_size / 2;
    GameState {
        meta: MetaState {
            turn: 0,
            seed,
            schema_version: SCHEMA_VERSION,
            content_version: content.content_version.clone(),
        },
        grid: GridState {
            size: c.grid_size,
            player: GridPos::new(centre, centre),
            remaining_turns: c.max_turns,
            max_turns: c.max_turns,
            is_game_over: false,
        },
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

/// `YYYYMMDD_HHMMSS_seed<N>` in UTC.
pub fn generate_run_id(seed: u64) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    format!("{timestamp}_seed{seed}")
}

/// Reads a saved `GameState` from JSON.
pub fn load_state(path: &Path) -> Result<GameState> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading state file: {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("parsing state file: {}", path.display()))
}

pub fn save_state(path: &Path, state: &GameState) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, state)
        .with_context(|| format!("writing {}", path.display()))
}
