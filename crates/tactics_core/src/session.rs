//! Single-owner game session.
//!
//! `GameSession` holds the state, the content it is played against and the
//! RNG stream, so every mutation goes through one `&mut self` entry point.

use rand::Rng;

use crate::error::CommandError;
use crate::metrics::{compute_metrics, MetricsSnapshot};
use crate::snapshot::{build_snapshot, RenderSnapshot};
use crate::structures::{available_buildings, BuildOption};
use crate::{
    CombatState, Command, CommandEnvelope, CommandId, EventEnvelope, EventLevel, GameContent,
    GameState, GridPos, PlayerActionDef,
};

pub struct GameSession<R: Rng> {
    state: GameState,
    content: GameContent,
    rng: R,
    event_level: EventLevel,
}

impl<R: Rng> GameSession<R> {
    /// Starts a fresh game on `state`, placing a new set of enemies.
    pub fn new(
        mut state: GameState,
        content: GameContent,
        mut rng: R,
        event_level: EventLevel,
    ) -> Self {
        let count = crate::grid::generate_enemies(&mut state, &content, &mut rng);
        tracing::debug!(count, "enemies placed for new session");
        Self {
            state,
            content,
            rng,
            event_level,
        }
    }

    /// Resumes a saved game. Enemies are regenerated only when the saved list
    /// is empty.
    pub fn restore(
        mut state: GameState,
        content: GameContent,
        mut rng: R,
        event_level: EventLevel,
    ) -> Self {
        if state.enemies.is_empty() {
            crate::grid::generate_enemies(&mut state, &content, &mut rng);
        }
        Self {
            state,
            content,
            rng,
            event_level,
        }
    }

    pub fn apply(
        &mut self,
        envelope: &CommandEnvelope,
    ) -> Result<Vec<EventEnvelope>, CommandError> {
        crate::apply_command(
            &mut self.state,
            envelope,
            &self.content,
            &mut self.rng,
            self.event_level,
        )
    }

    /// Wraps `command` in an envelope with the next command id and applies it.
    pub fn submit(&mut self, command: Command) -> Result<Vec<EventEnvelope>, CommandError> {
        let counters = &mut self.state.counters;
        let id = CommandId(format!("cmd_{:06}", counters.next_command_id));
        counters.next_command_id += 1;
        let envelope = CommandEnvelope {
            id,
            issued_turn: self.state.meta.turn,
            command,
        };
        self.apply(&envelope)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn content(&self) -> &GameContent {
        &self.content
    }

    pub fn combat(&self) -> Option<&CombatState> {
        self.state.combat.as_ref()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        build_snapshot(&self.state, &self.content)
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        compute_metrics(&self.state)
    }

    pub fn possible_moves(&self) -> Vec<GridPos> {
        crate::grid::possible_moves(&self.state).into_vec()
    }

    /// Structures that could go on the player's current cell.
    pub fn available_buildings(&self) -> Vec<BuildOption> {
        available_buildings(&self.state, &self.content, self.state.grid.player)
    }

    /// Player actions off cooldown; empty outside combat.
    pub fn available_actions(&self) -> Vec<&PlayerActionDef> {
        self.state
            .combat
            .as_ref()
            .map(|combat| crate::combat::available_actions(combat, &self.content))
            .unwrap_or_default()
    }

    pub fn into_state(self) -> GameState {
        self.state
    }
}
