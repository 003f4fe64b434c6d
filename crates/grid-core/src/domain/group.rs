//! Game state of one classroom group: its boards and at most one script.
//!
//! The group is the unit of mutual exclusion.  Callers hold it behind a
//! lock (see [`GroupGameManager`](crate::domain::manager::GroupGameManager))
//! so a lecturer's round advance and a board's telemetry never interleave.
//!
//! History capture is driven by the advance path: [`GroupGameState::advance_round`]
//! saves the outgoing round for every board before moving the script cursor.
//! Telemetry ingest only records live values.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::board::{BoardId, BoardState, CONNECTION_TIMEOUT};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::energy::Building;
use crate::domain::round::RoundType;
use crate::domain::scoring::round_score;
use crate::domain::script::Script;
use crate::protocol::fixed_point::watts_to_milliwatts;
use crate::protocol::{BuildingTable, ConnectedBuilding, ProtocolError};

/// Errors from game-state operations.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("board {0} is not registered")]
    BoardNotFound(BoardId),

    #[error("no script is active")]
    ScriptNotActive,

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Boards of a group partitioned by the liveness predicate at call time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSummary {
    pub connected: Vec<BoardId>,
    pub disconnected: Vec<BoardId>,
}

/// Result of a lecturer round advance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// The cursor moved to a new round.
    Advanced {
        round_index: usize,
        round_type: RoundType,
    },
    /// The last round was passed; the game has ended and these boards were
    /// pruned as disconnected.
    Finished { pruned: Vec<BoardId> },
}

pub struct GroupGameState {
    group_id: String,
    script: Option<Script>,
    session_id: Option<Uuid>,
    boards: BTreeMap<BoardId, BoardState>,
    /// Building consumption in watts derived from the current round.
    computed_consumption: BTreeMap<u8, f64>,
    /// Lecturer overrides in watts, layered over the computed values.
    building_overrides: BTreeMap<u8, f64>,
    building_table_version: u64,
    clock: Arc<dyn Clock>,
    connection_timeout: Duration,
}

impl GroupGameState {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self::with_clock(group_id, Arc::new(SystemClock), CONNECTION_TIMEOUT)
    }

    pub fn with_clock(
        group_id: impl Into<String>,
        clock: Arc<dyn Clock>,
        connection_timeout: Duration,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            script: None,
            session_id: None,
            boards: BTreeMap::new(),
            computed_consumption: BTreeMap::new(),
            building_overrides: BTreeMap::new(),
            building_table_version: 0,
            clock,
            connection_timeout,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn now(&self) -> SystemTime {
        self.clock.now()
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }

    pub fn script(&self) -> Option<&Script> {
        self.script.as_ref()
    }

    pub fn session_id(&self) -> Option<Uuid> {
        self.session_id
    }

    pub fn is_game_active(&self) -> bool {
        self.script.as_ref().is_some_and(|s| !s.is_finished())
    }

    /// Type of the round at the script cursor, if a game is running.
    pub fn current_round_type(&self) -> Option<RoundType> {
        self.script.as_ref().and_then(Script::current_round_type)
    }

    pub fn current_round_index(&self) -> Option<usize> {
        self.script.as_ref().and_then(Script::current_round_index)
    }

    // ── Game lifecycle ──────────────────────────────────────────────────────

    /// Replaces any running script, resets every board's round-scoped state
    /// and moves the new script to its first round.
    ///
    /// Returns the id of the new session.
    pub fn start_game(&mut self, mut script: Script) -> Result<Uuid, GameError> {
        if !script.step() {
            return Err(GameError::InvalidScenario(
                "script contains no rounds".to_owned(),
            ));
        }
        for board in self.boards.values_mut() {
            board.reset_for_new_game();
        }
        let session_id = Uuid::new_v4();
        info!(
            group = %self.group_id,
            session = %session_id,
            rounds = script.rounds().len(),
            "game started"
        );
        self.script = Some(script);
        self.session_id = Some(session_id);
        self.rebuild_building_table();
        Ok(session_id)
    }

    /// Finalizes the current round for every board and clears the script.
    /// Boards and their histories stay in place for reporting.
    pub fn end_game(&mut self) {
        let saved = self.finalize_all_boards_current_round();
        if self.script.take().is_some() {
            info!(group = %self.group_id, saved, "game ended");
        }
        self.rebuild_building_table();
    }

    /// Moves the script cursor forward without touching board history.
    pub fn step(&mut self) -> Result<bool, GameError> {
        let script = self.script.as_mut().ok_or(GameError::ScriptNotActive)?;
        let advanced = script.step();
        self.rebuild_building_table();
        Ok(advanced)
    }

    /// Lecturer round advance: save the outgoing round for all boards, then
    /// step.  Passing the last round ends the game and prunes boards that
    /// are no longer connected.
    pub fn advance_round(&mut self) -> Result<AdvanceOutcome, GameError> {
        self.save_all_boards_current_round_to_history()?;

        if self.step()? {
            let (Some(round_index), Some(round_type)) =
                (self.current_round_index(), self.current_round_type())
            else {
                return Err(GameError::ScriptNotActive);
            };
            info!(
                group = %self.group_id,
                round = round_index,
                kind = round_type.name(),
                "round advanced"
            );
            return Ok(AdvanceOutcome::Advanced {
                round_index,
                round_type,
            });
        }

        self.end_game();
        let pruned = self.prune_disconnected_boards(self.connection_timeout);
        Ok(AdvanceOutcome::Finished { pruned })
    }

    // ── Board registry ──────────────────────────────────────────────────────

    /// Registers a board, or refreshes the reported name and type of an
    /// already known one without touching its state.
    pub fn register_board(
        &mut self,
        id: BoardId,
        reported_name: Option<String>,
        board_type: Option<String>,
    ) -> &BoardState {
        let group = &self.group_id;
        let board = self.boards.entry(id).or_insert_with_key(|id| {
            info!(group = %group, board = %id, "board registered");
            BoardState::new(id.clone())
        });
        if let Some(name) = reported_name.filter(|n| !n.is_empty()) {
            board.reported_name = Some(name);
        }
        if let Some(kind) = board_type.filter(|t| !t.is_empty()) {
            board.board_type = kind;
        }
        board
    }

    pub fn get_board(&self, id: &BoardId) -> Result<&BoardState, GameError> {
        self.boards
            .get(id)
            .ok_or_else(|| GameError::BoardNotFound(id.clone()))
    }

    fn board_mut(&mut self, id: &BoardId) -> Result<&mut BoardState, GameError> {
        self.boards
            .get_mut(id)
            .ok_or_else(|| GameError::BoardNotFound(id.clone()))
    }

    pub fn boards(&self) -> impl Iterator<Item = &BoardState> {
        self.boards.values()
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    // ── Telemetry ingest ────────────────────────────────────────────────────

    /// Records a power sample for a registered board.  Never creates one.
    pub fn update_board_power(
        &mut self,
        id: &BoardId,
        production: Option<f64>,
        consumption: Option<f64>,
    ) -> Result<(), GameError> {
        let now = self.clock.now();
        let script = self.script.as_ref();
        let board = self
            .boards
            .get_mut(id)
            .ok_or_else(|| GameError::BoardNotFound(id.clone()))?;
        board.record_sample(production, consumption, script, now);
        debug!(board = %id, ?production, ?consumption, "power sample recorded");
        Ok(())
    }

    /// Lecturer debugging path: records power for `id`, creating the board
    /// when it does not exist yet.
    pub fn spoof_board_power(&mut self, id: BoardId, production: f64, consumption: f64) {
        warn!(group = %self.group_id, board = %id, production, consumption, "spoofing board power");
        let now = self.clock.now();
        let script = self.script.as_ref();
        let board = self
            .boards
            .entry(id)
            .or_insert_with_key(|id| BoardState::new(id.clone()));
        board.update_power(production, consumption, script, now);
    }

    pub fn report_connected_buildings(
        &mut self,
        id: &BoardId,
        buildings: Vec<ConnectedBuilding>,
    ) -> Result<(), GameError> {
        self.board_mut(id)?.replace_connected_buildings(buildings);
        Ok(())
    }

    pub fn report_production(
        &mut self,
        id: &BoardId,
        breakdown: BTreeMap<u8, f64>,
    ) -> Result<(), GameError> {
        let now = self.clock.now();
        let board = self.board_mut(id)?;
        board.replace_production(breakdown);
        board.mark_updated_at(now);
        Ok(())
    }

    // ── History ─────────────────────────────────────────────────────────────

    /// Saves the current round into every board's history.  Returns how many
    /// boards recorded it (zero during presentation rounds).
    pub fn save_all_boards_current_round_to_history(&mut self) -> Result<usize, GameError> {
        let script = self.script.as_ref().ok_or(GameError::ScriptNotActive)?;
        let (Some(index), Some(kind)) = (script.current_round_index(), script.current_round_type())
        else {
            return Ok(0);
        };
        let now = self.clock.now();
        let saved = self
            .boards
            .values_mut()
            .map(|b| b.save_current_round_to_history(index, kind, now))
            .filter(|saved| *saved)
            .count();
        debug!(group = %self.group_id, round = index, saved, "round saved to history");
        Ok(saved)
    }

    /// Like [`Self::save_all_boards_current_round_to_history`] but a no-op
    /// when no game is running.  Safe to call more than once.
    pub fn finalize_all_boards_current_round(&mut self) -> usize {
        self.save_all_boards_current_round_to_history()
            .unwrap_or_default()
    }

    // ── Liveness ────────────────────────────────────────────────────────────

    pub fn is_board_connected(&self, id: &BoardId) -> Result<bool, GameError> {
        let now = self.clock.now();
        Ok(self.get_board(id)?.is_connected(now, self.connection_timeout))
    }

    /// Removes boards that have not reported within `timeout`.
    pub fn prune_disconnected_boards(&mut self, timeout: Duration) -> Vec<BoardId> {
        let now = self.clock.now();
        let stale: Vec<BoardId> = self
            .boards
            .values()
            .filter(|b| !b.is_connected(now, timeout))
            .map(|b| b.id.clone())
            .collect();
        for id in &stale {
            self.boards.remove(id);
            warn!(group = %self.group_id, board = %id, "pruned disconnected board");
        }
        stale
    }

    pub fn connection_summary(&self) -> ConnectionSummary {
        let now = self.clock.now();
        let (connected, disconnected): (Vec<_>, Vec<_>) = self
            .boards
            .values()
            .partition(|b| b.is_connected(now, self.connection_timeout));
        ConnectionSummary {
            connected: connected.into_iter().map(|b| b.id.clone()).collect(),
            disconnected: disconnected.into_iter().map(|b| b.id.clone()).collect(),
        }
    }

    // ── Per-board views ─────────────────────────────────────────────────────

    /// Whether the board still owes a report for the current gameplay round.
    pub fn expecting_data(&self, id: &BoardId) -> Result<bool, GameError> {
        let board = self.get_board(id)?;
        let Some(script) = self.script.as_ref() else {
            return Ok(false);
        };
        let gameplay = script
            .current_round_type()
            .is_some_and(RoundType::is_gameplay);
        Ok(gameplay && board.current_round_index != script.current_round_index())
    }

    /// Recorded score plus the live score of the running gameplay round if
    /// it has not been saved yet.
    pub fn board_score(&self, id: &BoardId) -> Result<u32, GameError> {
        let board = self.get_board(id)?;
        let live = match (self.current_round_index(), self.current_round_type()) {
            (Some(index), Some(kind)) if board.round_history.last() != Some(&index) => {
                round_score(board.current_production, board.current_consumption, kind)
            }
            _ => 0,
        };
        Ok(board.total_score() + live)
    }

    // ── Building table ──────────────────────────────────────────────────────

    pub fn building_table_version(&self) -> u64 {
        self.building_table_version
    }

    /// Current consumption per building type in watts, overrides applied.
    pub fn effective_building_consumption(&self) -> BTreeMap<u8, f64> {
        let mut entries = self.computed_consumption.clone();
        entries.extend(self.building_overrides.iter().map(|(k, v)| (*k, *v)));
        entries
    }

    /// The table sent to boards, in milliwatts.
    pub fn building_table(&self) -> Result<BuildingTable, GameError> {
        let entries = self
            .effective_building_consumption()
            .into_iter()
            .map(|(kind, watts)| Ok((kind, watts_to_milliwatts(watts)?)))
            .collect::<Result<BTreeMap<u8, i32>, ProtocolError>>()?;
        Ok(BuildingTable {
            table_version: self.building_table_version,
            entries,
        })
    }

    /// Pins one building type's consumption.  Rejects values that cannot be
    /// sent as milliwatts; the table is left unchanged in that case.
    pub fn override_building_consumption(
        &mut self,
        building_type: u8,
        watts: f64,
    ) -> Result<(), GameError> {
        watts_to_milliwatts(watts)?;
        let previous = self.building_overrides.insert(building_type, watts);
        if previous != Some(watts) {
            self.building_table_version += 1;
            info!(group = %self.group_id, building_type, watts, "building consumption overridden");
        }
        Ok(())
    }

    pub fn clear_building_override(&mut self, building_type: u8) {
        if self.building_overrides.remove(&building_type).is_some() {
            self.building_table_version += 1;
        }
    }

    fn rebuild_building_table(&mut self) {
        let computed: BTreeMap<u8, f64> = self
            .script
            .as_ref()
            .map(|s| {
                s.current_building_consumptions()
                    .into_iter()
                    .map(|(b, w)| (Building::id(b), w))
                    .collect()
            })
            .unwrap_or_default();
        // Presentation rounds keep the last gameplay table.
        if computed.is_empty() && self.is_game_active() {
            return;
        }
        if computed != self.computed_consumption {
            self.computed_consumption = computed;
            self.building_table_version += 1;
        }
    }
}
