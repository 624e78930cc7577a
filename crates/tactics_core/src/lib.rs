//! `tactics_core`: deterministic grid tactics rules engine.
//!
//! No IO beyond the metrics writers, no network. All randomness via the
//! passed-in Rng.

mod combat;
mod economy;
mod engine;
pub mod error;
mod grid;
mod id;
mod inventory;
pub mod metrics;
mod progression;
mod session;
pub mod snapshot;
mod structures;
mod types;

pub use combat::{
    available_actions, choose_enemy_action, choose_player_action, enemy_stats_for_threat,
    score_action,
};
pub use economy::{
    base_upgrade_cost, branch_upgrade_cost, bundle, crafting_upgrade_cost, find_branch_upgrade,
};
pub use engine::apply_command;
pub use error::{
    CombatError, CommandError, EconomyError, InventoryError, MoveRejection, RelicError,
    StructureError,
};
pub use grid::{generate_enemies, neighbours, possible_moves, DIRECTIONS};
pub use id::generate_uuid;
pub use inventory::{add_item, can_accept, equip, unequip};
pub use metrics::{compute_metrics, MetricsFileWriter, MetricsSnapshot};
pub use progression::{equipped_relic_effects, relic_discovery_chance, victory_rewards};
pub use session::GameSession;
pub use snapshot::{build_snapshot, RenderSnapshot};
pub use structures::{available_buildings, structure_at, structure_def, terrain_at, BuildOption};
pub use types::*;

pub(crate) fn emit(counters: &mut Counters, turn: u64, event: Event) -> EventEnvelope {
    let id = EventId(format!("evt_{:06}", counters.next_event_id));
    counters.next_event_id += 1;
    EventEnvelope { id, turn, event }
}

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;

#[cfg(test)]
mod tests;
