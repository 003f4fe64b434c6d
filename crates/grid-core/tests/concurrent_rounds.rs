//! Telemetry ingest racing the lecturer's round advance on one group.
//!
//! Boards report from several threads while another thread walks the script;
//! the per-group lock must keep every board's histories consistent.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use grid_core::domain::energy::Source;
use grid_core::{lock_group, AdvanceOutcome, BoardId, GroupGameState, GroupHandle, Round, Script};

const BOARDS: u32 = 6;
const REPORTERS: u32 = 3;

fn interleaved_script() -> Script {
    Script::builder()
        .source_range(Source::Coal, 250.0, 500.0)
        .allow_production(Source::Coal)
        .add_round(Round::lecture("intro"))
        .add_round(Round::day().sunny().build())
        .add_round(Round::slide(1))
        .add_round(Round::night().calm().build())
        .add_round(Round::slide_range(2, 4))
        .add_round(Round::day().cloudy().build())
        .add_round(Round::night().windy().build())
        .add_round(Round::slide(5))
        .add_round(Round::day().snowy().build())
        .add_round(Round::night().build())
        .build()
}

// ── Ingest vs advance ─────────────────────────────────────────────────────────

#[test]
fn test_reports_racing_round_advance_keep_histories_consistent() {
    // Arrange
    let script = interleaved_script();
    let gameplay: BTreeSet<usize> = script
        .rounds()
        .iter()
        .enumerate()
        .filter(|(_, r)| r.round_type().is_gameplay())
        .map(|(i, _)| i)
        .collect();
    let round_count = script.rounds().len();

    let handle: GroupHandle = Arc::new(Mutex::new(GroupGameState::new("race")));
    {
        let mut group = lock_group(&handle);
        for id in 0..BOARDS {
            group.register_board(BoardId::from(id), None, None);
        }
        group.start_game(script).unwrap();
    }
    let stop = AtomicBool::new(false);

    // Act
    thread::scope(|s| {
        for reporter in 0..REPORTERS {
            let handle = &handle;
            let stop = &stop;
            s.spawn(move || {
                let mut tick = 0u32;
                while !stop.load(Ordering::Relaxed) {
                    let id = BoardId::from((tick + reporter) % BOARDS);
                    let watts = f64::from(tick % 500);
                    lock_group(handle)
                        .update_board_power(&id, Some(watts), Some(watts + 1.0))
                        .unwrap();
                    tick = tick.wrapping_add(1);
                    thread::yield_now();
                }
            });
        }

        let handle = &handle;
        let stop = &stop;
        s.spawn(move || {
            // Stop one short of the end so the finishing prune cannot drop boards.
            for _ in 1..round_count {
                for _ in 0..50 {
                    thread::yield_now();
                }
                let outcome = lock_group(handle).advance_round().unwrap();
                assert!(matches!(outcome, AdvanceOutcome::Advanced { .. }));
            }
            stop.store(true, Ordering::Relaxed);
        });
    });
    let saved_last = lock_group(&handle).finalize_all_boards_current_round();

    // Assert
    assert_eq!(saved_last, BOARDS as usize);
    let group = lock_group(&handle);
    assert_eq!(group.board_count(), BOARDS as usize);
    for board in group.boards() {
        assert_eq!(board.production_history.len(), board.round_history.len());
        assert_eq!(board.consumption_history.len(), board.round_history.len());
        assert!(
            board.round_history.windows(2).all(|w| w[0] < w[1]),
            "round saved twice for {}: {:?}",
            board.id,
            board.round_history
        );
        assert!(
            board.round_history.iter().all(|i| gameplay.contains(i)),
            "presentation round in history for {}: {:?}",
            board.id,
            board.round_history
        );
        assert_eq!(board.round_history.len(), gameplay.len());
    }
}
