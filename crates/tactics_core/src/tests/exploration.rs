use super::*;

#[test]
fn move_spends_one_turn() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();

    let events = move_to(&mut state, &content, &mut rng, 6, 6).unwrap();

    assert_eq!(state.grid.player, GridPos::new(6, 6));
    assert_eq!(state.grid.remaining_turns, 29);
    assert_eq!(state.meta.turn, 1);
    assert!(matches!(
        events[0].event,
        Event::PlayerMoved {
            remaining_turns: 29,
            ..
        }
    ));
}

#[test]
fn distance_two_move_is_rejected_without_side_effects() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();

    let err = move_to(&mut state, &content, &mut rng, 7, 5).unwrap_err();

    assert!(matches!(
        err,
        CommandError::Move(MoveRejection::NotAdjacent { .. })
    ));
    assert_eq!(state.grid.player, GridPos::new(5, 5));
    assert_eq!(state.grid.remaining_turns, 30);
    assert_eq!(state.counters.next_event_id, 0);
}

#[test]
fn moves_off_the_grid_are_rejected() {
    let content = base_content();
    let mut state = base_state(&content);
    state.grid.player = GridPos::new(0, 0);
    let mut rng = make_rng();

    let err = move_to(&mut state, &content, &mut rng, -1, 0).unwrap_err();
    assert_eq!(
        err,
        CommandError::Move(MoveRejection::OutOfBounds {
            to: GridPos::new(-1, 0)
        })
    );
}

#[test]
fn last_turn_ends_the_game_before_discovery() {
    let content = base_content();
    let mut state = state_with_enemy(&content, 1);
    state.grid.remaining_turns = 1;
    let mut rng = make_rng();

    let events = move_to(&mut state, &content, &mut rng, 6, 5).unwrap();

    assert!(state.grid.is_game_over);
    assert!(!state.in_combat());
    assert!(!state.enemies[0].discovered);
    assert!(has_event(&events, |e| matches!(e, Event::GameOver { .. })));
    assert!(possible_moves(&state).is_empty());

    let err = move_to(&mut state, &content, &mut rng, 7, 5).unwrap_err();
    assert_eq!(err, CommandError::Move(MoveRejection::GameOver));
}

#[test]
fn stepping_on_an_enemy_starts_combat() {
    let content = base_content();
    let mut state = state_with_enemy(&content, 2);
    let mut rng = make_rng();

    let events = move_to(&mut state, &content, &mut rng, 6, 5).unwrap();

    assert!(has_event(&events, |e| matches!(e, Event::EnemyDiscovered { threat: 2, .. })));
    assert!(has_event(&events, |e| matches!(e, Event::CombatStarted { .. })));
    let combat = state.combat.as_ref().unwrap();
    assert_eq!(combat.enemy.max_health, 100.0);
    assert_eq!(combat.phase, CombatPhase::PlayerTurn);
    assert!(state.enemies[0].in_combat);
    assert_eq!(state.enemies[0].stats, Some(enemy_stats_for_threat(2)));

    assert!(possible_moves(&state).is_empty());
    let err = move_to(&mut state, &content, &mut rng, 5, 5).unwrap_err();
    assert_eq!(err, CommandError::Move(MoveRejection::InCombat));
}

#[test]
fn event_ids_are_sequential_across_commands() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();

    let first = move_to(&mut state, &content, &mut rng, 6, 5).unwrap();
    let second = move_to(&mut state, &content, &mut rng, 7, 5).unwrap();

    assert_eq!(first[0].id, EventId("evt_000000".to_string()));
    assert_eq!(second[0].id, EventId("evt_000001".to_string()));
    assert_eq!(second[0].turn, 2);
}

#[test]
fn reset_restores_the_grid_and_keeps_the_ledger() {
    let content = base_content();
    let mut state = base_state(&content);
    state.resources.scrap = 40;
    state.progression.level = 3;
    let mut rng = make_rng();

    move_to(&mut state, &content, &mut rng, 4, 4).unwrap();
    let events = apply(&mut state, &content, &mut rng, Command::ResetGame).unwrap();

    assert_eq!(state.grid.player, GridPos::new(5, 5));
    assert_eq!(state.grid.remaining_turns, 30);
    assert!(!state.grid.is_game_over);
    assert_eq!(state.enemies.len(), 8);
    assert!(state.enemies.iter().all(|e| e.position != GridPos::new(5, 5)));
    assert_eq!(state.resources.scrap, 40);
    assert_eq!(state.progression.level, 3);
    assert!(has_event(&events, |e| matches!(e, Event::EnemiesGenerated { count: 8 })));
}

#[test]
fn generated_enemies_never_share_a_cell() {
    let content = base_content();
    let mut state = base_state(&content);
    let mut rng = make_rng();

    let count = generate_enemies(&mut state, &content, &mut rng);

    assert_eq!(count, 8);
    let mut cells: Vec<GridPos> = state.enemies.iter().map(|e| e.position).collect();
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(), 8);
    assert!(state
        .enemies
        .iter()
        .all(|e| e.lifecycle() == EnemyLifecycle::Hidden));
}
