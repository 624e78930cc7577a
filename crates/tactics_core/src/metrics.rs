//! Snapshot metrics computed from `GameState`.
//!
//! `compute_metrics(&GameState) -> MetricsSnapshot` samples the current state
//! for time-series analysis. No state mutation; IO only through the writers
//! at the bottom of this file.

use crate::{EnemyLifecycle, GameState};
use serde::Serialize;
use std::io::Write;

/// Current schema version. Bump when fields are added, removed or reordered.
const METRICS_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub turn: u64,
    pub metrics_version: u32,

    // Exploration
    pub remaining_turns: u32,
    pub enemies_total: u32,
    pub enemies_hidden: u32,
    pub enemies_discovered: u32,
    pub enemies_defeated: u32,
    pub in_combat: bool,

    // Character
    pub level: u32,
    pub experience: u32,
    pub health: i32,
    pub max_health: i32,
    pub attack: i32,
    pub defense: i32,
    pub shield: i32,

    // Combat record
    pub battles_won: u32,
    pub battles_lost: u32,
    pub retreats: u32,
    pub total_damage_dealt: u64,
    pub total_damage_taken: u64,

    // Economy
    pub biomass: u32,
    pub scrap: u32,
    pub warpstone: u32,
    pub combat_points: u32,
    pub skill_points: u32,
    pub inventory_items: u32,
    pub crafting_level: u32,
    pub base_level: u32,

    // Structures and collection
    pub structures_built: u32,
    pub relics_owned: u32,
    pub relics_equipped: u32,
    pub achievements_unlocked: u32,
}

pub fn compute_metrics(state: &GameState) -> MetricsSnapshot {
    let mut enemies_hidden = 0;
    let mut enemies_discovered = 0;
    let mut enemies_defeated = 0;
    for enemy in &state.enemies {
        match enemy.lifecycle() {
            EnemyLifecycle::Hidden => enemies_hidden += 1,
            EnemyLifecycle::Discovered => enemies_discovered += 1,
            EnemyLifecycle::Defeated => enemies_defeated += 1,
        }
    }

    let character = &state.character;
    let progression = &state.progression;
    MetricsSnapshot {
        turn: state.meta.turn,
        metrics_version: METRICS_VERSION,
        remaining_turns: state.grid.remaining_turns,
        enemies_total: state.enemies.len() as u32,
        enemies_hidden,
        enemies_discovered,
        enemies_defeated,
        in_combat: state.in_combat(),
        level: progression.level,
        experience: progression.experience,
        health: character.health,
        max_health: character.max_health,
        attack: character.attack,
        defense: character.defense,
        shield: character.shield,
        battles_won: progression.stats.battles_won,
        battles_lost: progression.stats.battles_lost,
        retreats: progression.stats.retreats,
        total_damage_dealt: progression.stats.total_damage_dealt,
        total_damage_taken: progression.stats.total_damage_taken,
        biomass: state.resources.biomass,
        scrap: state.resources.scrap,
        warpstone: state.resources.warpstone,
        combat_points: progression.combat_points,
        skill_points: progression.skill_points,
        inventory_items: character.inventory.iter().map(|item| item.quantity).sum(),
        crafting_level: state.crafting.level,
        base_level: state.base.level,
        structures_built: state.structures.len() as u32,
        relics_owned: progression.relics.len() as u32,
        relics_equipped: progression.relics.iter().filter(|r| r.equipped).count() as u32,
        achievements_unlocked: progression.achievements.len() as u32,
    }
}

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

pub fn write_metrics_header(writer: &mut impl std::io::Write) -> std::io::Result<()> {
    writeln!(
        writer,
        "turn,metrics_version,\
         remaining_turns,enemies_total,enemies_hidden,enemies_discovered,enemies_defeated,\
         in_combat,level,experience,health,max_health,attack,defense,shield,\
         battles_won,battles_lost,retreats,total_damage_dealt,total_damage_taken,\
         biomass,scrap,warpstone,combat_points,skill_points,inventory_items,crafting_level,\
         base_level,structures_built,relics_owned,relics_equipped,achievements_unlocked"
    )
}

/// Append a single metrics snapshot as a CSV row.
pub fn append_metrics_row(
    writer: &mut impl std::io::Write,
    snapshot: &MetricsSnapshot,
) -> std::io::Result<()> {
    writeln!(
        writer,
        "{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{},\
         {},{},{},{},{},{},{},{},{},{},{},{},{},{},{},{}",
        snapshot.turn,
        snapshot.metrics_version,
        snapshot.remaining_turns,
        snapshot.enemies_total,
        snapshot.enemies_hidden,
        snapshot.enemies_discovered,
        snapshot.enemies_defeated,
        u8::from(snapshot.in_combat),
        snapshot.level,
        snapshot.experience,
        snapshot.health,
        snapshot.max_health,
        snapshot.attack,
        snapshot.defense,
        snapshot.shield,
        snapshot.battles_won,
        snapshot.battles_lost,
        snapshot.retreats,
        snapshot.total_damage_dealt,
        snapshot.total_damage_taken,
        snapshot.biomass,
        snapshot.scrap,
        snapshot.warpstone,
        snapshot.combat_points,
        snapshot.skill_points,
        snapshot.inventory_items,
        snapshot.crafting_level,
        snapshot.base_level,
        snapshot.structures_built,
        snapshot.relics_owned,
        snapshot.relics_equipped,
        snapshot.achievements_unlocked,
    )
}

/// Maximum data rows per CSV file before rotating to a new file.
const MAX_ROWS_PER_FILE: usize = 50_000;

/// Rotating metrics CSV writer. Splits into numbered files
/// (`metrics_000.csv`, `metrics_001.csv`, ...) after [`MAX_ROWS_PER_FILE`] rows each.
pub struct MetricsFileWriter {
    run_dir: std::path::PathBuf,
    file_index: u32,
    rows_in_current_file: usize,
    writer: std::io::BufWriter<std::fs::File>,
}

impl MetricsFileWriter {
    pub fn new(run_dir: std::path::PathBuf) -> std::io::Result<Self> {
        let writer = open_csv_file(&run_dir, 0)?;
        Ok(Self {
            run_dir,
            file_index: 0,
            rows_in_current_file: 0,
            writer,
        })
    }

    pub fn write_row(&mut self, snapshot: &MetricsSnapshot) -> std::io::Result<()> {
        if self.rows_in_current_file >= MAX_ROWS_PER_FILE {
            self.writer.flush()?;
            self.file_index += 1;
            self.writer = open_csv_file(&self.run_dir, self.file_index)?;
            self.rows_in_current_file = 0;
        }
        append_metrics_row(&mut self.writer, snapshot)?;
        self.rows_in_current_file += 1;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn open_csv_file(
    run_dir: &std::path::Path,
    index: u32,
) -> std::io::Result<std::io::BufWriter<std::fs::File>> {
    let path = run_dir.join(format!("metrics_{index:03}.csv"));
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_metrics_header(&mut writer)?;
    Ok(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::{base_content, base_state, place_enemy};
    use crate::GridPos;

    #[test]
    fn enemy_lifecycle_counts() {
        let content = base_content();
        let mut state = base_state(&content);
        place_enemy(&mut state, "enemy_0", GridPos::new(1, 1), 1);
        place_enemy(&mut state, "enemy_1", GridPos::new(2, 2), 2);
        place_enemy(&mut state, "enemy_2", GridPos::new(3, 3), 3);
        state.enemies[1].discovered = true;
        state.enemies[2].discovered = true;
        state.enemies[2].defeated = true;

        let snapshot = compute_metrics(&state);
        assert_eq!(snapshot.enemies_total, 3);
        assert_eq!(snapshot.enemies_hidden, 1);
        assert_eq!(snapshot.enemies_discovered, 1);
        assert_eq!(snapshot.enemies_defeated, 1);
        assert_eq!(snapshot.remaining_turns, 30);
    }

    #[test]
    fn header_and_row_have_matching_columns() {
        let content = base_content();
        let state = base_state(&content);
        let mut buffer = Vec::new();
        write_metrics_header(&mut buffer).unwrap();
        append_metrics_row(&mut buffer, &compute_metrics(&state)).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap().split(',').count();
        let row = lines.next().unwrap().split(',').count();
        assert_eq!(header, row);
        assert_eq!(header, 32);
    }
}
