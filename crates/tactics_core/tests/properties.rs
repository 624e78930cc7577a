//! Property tests: arbitrary command streams never break game invariants.

use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tactics_core::test_fixtures::{base_content, base_state};
use tactics_core::*;

fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        4 => (-1i32..11, -1i32..11).prop_map(|(x, y)| Command::MovePlayer {
            target: GridPos::new(x, y)
        }),
        3 => prop::sample::select(vec![
            "attack",
            "defend",
            "dodge",
            "heavy_attack",
            "rapid_fire",
            "special_ability",
        ])
        .prop_map(|id| Command::PerformCombatAction {
            action: ActionId(id.to_string())
        }),
        3 => Just(Command::ResolveEnemyTurn),
        1 => Just(Command::ToggleAutobattle),
        2 => Just(Command::AutobattleTurn),
        1 => Just(Command::RetreatFromCombat),
        1 => prop::sample::select(vec![
            "shield_generator",
            "medical_hospital",
            "outpost",
            "plasma_reactor",
            "scrap_forge",
        ])
        .prop_map(|kind| Command::BuildStructure {
            kind: StructureKindId(kind.to_string())
        }),
        1 => Just(Command::UseStructure),
        1 => Just(Command::RemoveStructure),
        1 => Just(Command::RepairBase),
    ]
}

fn check_invariants(state: &GameState) -> Result<(), TestCaseError> {
    prop_assert!(state.grid.player.in_bounds(state.grid.size));
    prop_assert!(state.grid.remaining_turns <= state.grid.max_turns);
    prop_assert!(state.character.shield >= 0);
    prop_assert!(state.character.shield <= state.character.max_shield);
    if state.combat.is_none() {
        prop_assert!(state.character.health >= 1);
        prop_assert!(state.enemies.iter().all(|e| !e.in_combat));
    }
    if let Some(combat) = &state.combat {
        prop_assert!(!combat.is_finished());
        prop_assert!(combat.log.len() <= 10);
    }
    for enemy in &state.enemies {
        prop_assert!(!(enemy.defeated && !enemy.discovered));
    }
    let mut cells: Vec<GridPos> = state.structures.iter().map(|s| s.position).collect();
    let built = cells.len();
    cells.sort();
    cells.dedup();
    prop_assert_eq!(cells.len(), built);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn command_streams_preserve_invariants(
        seed in any::<u64>(),
        commands in prop::collection::vec(arb_command(), 1..120),
    ) {
        let content = base_content();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = base_state(&content);
        generate_enemies(&mut state, &content, &mut rng);
        state.resources.scrap = 500;
        state.resources.biomass = 500;
        state.resources.warpstone = 500;

        for (index, command) in commands.into_iter().enumerate() {
            let envelope = CommandEnvelope {
                id: CommandId(format!("cmd_{index:06}")),
                issued_turn: state.meta.turn,
                command,
            };
            let before = serde_json::to_string(&state).unwrap();
            let result =
                apply_command(&mut state, &envelope, &content, &mut rng, EventLevel::Debug);
            if result.is_err() {
                prop_assert_eq!(before, serde_json::to_string(&state).unwrap());
            }
            check_invariants(&state)?;
        }
    }

    #[test]
    fn remaining_turns_only_fall_by_accepted_moves(
        path in prop::collection::vec(0usize..8, 1..40),
    ) {
        let content = base_content();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut state = base_state(&content);

        let mut accepted = 0u32;
        for direction in path {
            let (dx, dy) = DIRECTIONS[direction];
            let envelope = CommandEnvelope {
                id: CommandId("cmd_move".to_string()),
                issued_turn: state.meta.turn,
                command: Command::MovePlayer { target: state.grid.player.offset(dx, dy) },
            };
            let result =
                apply_command(&mut state, &envelope, &content, &mut rng, EventLevel::Normal);
            if result.is_ok() {
                accepted += 1;
            }
        }
        prop_assert_eq!(state.grid.remaining_turns, 30 - accepted);
        prop_assert_eq!(state.meta.turn, u64::from(accepted));
    }
}
