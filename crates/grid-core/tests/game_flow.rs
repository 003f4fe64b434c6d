//! Integration tests for the round/board state machine.
//!
//! Drives a group the way the server does: boards register and report,
//! the lecturer advances rounds, and histories are checked afterwards.

use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use grid_core::domain::energy::Source;
use grid_core::{
    lock_group, AdvanceOutcome, BoardId, Clock, GameError, GroupGameManager, GroupGameState,
    Round, RoundType, Script, ScriptCatalog, CONNECTION_TIMEOUT,
};

/// A clock the test moves by hand.
struct ManualClock(Mutex<SystemTime>);

impl ManualClock {
    fn new(start: SystemTime) -> Arc<Self> {
        Arc::new(Self(Mutex::new(start)))
    }

    fn advance(&self, by: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.0.lock().unwrap()
    }
}

fn day_slide_night() -> Script {
    Script::builder()
        .source_range(Source::Coal, 250.0, 500.0)
        .allow_production(Source::Coal)
        .add_round(Round::day().sunny().build())
        .add_round(Round::slide(4))
        .add_round(Round::slide_range(5, 7))
        .add_round(Round::night().calm().build())
        .build()
}

fn assert_history_lengths_match(group: &GroupGameState) {
    for board in group.boards() {
        assert_eq!(board.round_history.len(), board.production_history.len());
        assert_eq!(board.round_history.len(), board.consumption_history.len());
    }
}

#[test]
fn test_first_round_values_land_in_history_after_advance() {
    let mut group = GroupGameState::new("class-a");
    let id = BoardId::from("1");
    group.register_board(id.clone(), None, None);
    group.start_game(day_slide_night()).unwrap();
    assert_eq!(group.current_round_type(), Some(RoundType::Day));

    group.update_board_power(&id, Some(100.0), Some(80.0)).unwrap();
    group.save_all_boards_current_round_to_history().unwrap();
    assert!(group.step().unwrap());

    let board = group.get_board(&id).unwrap();
    assert_eq!(board.production_history, vec![100.0]);
    assert_eq!(board.consumption_history, vec![80.0]);
    assert_eq!(board.round_history, vec![0]);
}

#[test]
fn test_slides_never_reach_history() {
    let mut group = GroupGameState::new("class-a");
    let id = BoardId::from(12u32);
    group.register_board(id.clone(), None, None);
    group.start_game(day_slide_night()).unwrap();

    let mut outcomes = Vec::new();
    loop {
        group.update_board_power(&id, Some(50.0), Some(50.0)).unwrap();
        let outcome = group.advance_round().unwrap();
        assert_history_lengths_match(&group);
        let finished = matches!(outcome, AdvanceOutcome::Finished { .. });
        outcomes.push(outcome);
        if finished {
            break;
        }
    }

    assert_eq!(outcomes.len(), 4);
    let board = group.get_board(&id).unwrap();
    assert_eq!(board.round_history, vec![0, 3]);
    assert_eq!(board.total_score(), 20);
    assert_eq!(board.statistics().rounds_played, 2);
}

#[test]
fn test_reset_keeps_board_identity() {
    let mut group = GroupGameState::new("class-a");
    let id = BoardId::from("1");
    group.register_board(id.clone(), None, None);
    let name_before = group.get_board(&id).unwrap().display_name.clone();
    group.start_game(day_slide_night()).unwrap();
    group.update_board_power(&id, Some(10.0), Some(10.0)).unwrap();
    group.advance_round().unwrap();

    group.start_game(day_slide_night()).unwrap();

    let board = group.get_board(&id).unwrap();
    assert!(board.production_history.is_empty());
    assert!(board.consumption_history.is_empty());
    assert!(board.round_history.is_empty());
    assert_eq!(board.display_name, name_before);
}

#[test]
fn test_connectivity_follows_the_clock() {
    let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let clock = ManualClock::new(start);
    let mut group = GroupGameState::with_clock("class-a", clock.clone(), CONNECTION_TIMEOUT);
    let id = BoardId::from("1");
    group.register_board(id.clone(), None, None);
    group.update_board_power(&id, Some(1.0), Some(1.0)).unwrap();

    clock.advance(Duration::from_secs(1));
    assert!(group.is_board_connected(&id).unwrap());

    clock.advance(Duration::from_secs(5));
    assert!(!group.is_board_connected(&id).unwrap());
    assert_eq!(group.connection_summary().disconnected, vec![id.clone()]);

    let pruned = group.prune_disconnected_boards(CONNECTION_TIMEOUT);
    assert_eq!(pruned, vec![id.clone()]);
    assert!(matches!(group.get_board(&id), Err(GameError::BoardNotFound(_))));
}

#[test]
fn test_manager_runs_builtin_scenario_to_completion() {
    let start = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let clock = ManualClock::new(start);
    let manager = GroupGameManager::with_clock(
        Arc::new(ScriptCatalog::with_builtin_scenarios()),
        clock.clone(),
        CONNECTION_TIMEOUT,
    );

    manager.start_game("class-b", "test").unwrap();
    let handle = manager.get_or_create("class-b");
    let mut group = lock_group(&handle);
    group.register_board("1".into(), Some("Team One".into()), None);

    let mut advanced = 0;
    loop {
        group.update_board_power(&"1".into(), Some(500.0), Some(500.0)).unwrap();
        clock.advance(Duration::from_secs(2));
        match group.advance_round().unwrap() {
            AdvanceOutcome::Advanced { .. } => advanced += 1,
            AdvanceOutcome::Finished { pruned } => {
                assert!(pruned.is_empty());
                break;
            }
        }
    }

    assert_eq!(advanced, 13);
    assert!(!group.is_game_active());
    let board = group.get_board(&"1".into()).unwrap();
    assert_eq!(board.round_history, (0..14).collect::<Vec<_>>());
    assert_eq!(board.total_score(), 140);
}
