//! Use case: the lecturer drives a group through a scenario.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use grid_core::{
    lock_group, AdvanceOutcome, BoardId, ConnectionSummary, GameError, GroupGameManager,
};

use crate::application::report::GameReport;

pub struct LecturerControl {
    manager: Arc<GroupGameManager>,
}

impl LecturerControl {
    pub fn new(manager: Arc<GroupGameManager>) -> Self {
        Self { manager }
    }

    /// Scenario ids the lecturer can choose from.
    pub fn scenarios(&self) -> Vec<String> {
        self.manager
            .catalog()
            .scenario_ids()
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    /// Starts `scenario_id` in the group.  Registered boards stay
    /// registered; their round-scoped state is reset.
    pub fn start_game(&self, group_id: &str, scenario_id: &str) -> Result<Uuid, GameError> {
        self.manager.start_game(group_id, scenario_id)
    }

    /// Saves every board's readings for the outgoing round, then moves to
    /// the next one.  After the last round the game ends by itself.
    pub fn next_round(&self, group_id: &str) -> Result<AdvanceOutcome, GameError> {
        let handle = self.manager.get_or_create(group_id);
        let mut group = lock_group(&handle);
        let outcome = group.advance_round()?;
        if let AdvanceOutcome::Finished { pruned } = &outcome {
            info!(group = group_id, pruned = pruned.len(), "scenario completed");
        }
        Ok(outcome)
    }

    /// Ends the game early and returns the final report.
    ///
    /// Disconnected boards are pruned after the report is taken so their
    /// results still appear in it.
    pub fn end_game(&self, group_id: &str) -> Result<GameReport, GameError> {
        let handle = self.manager.get_or_create(group_id);
        let mut group = lock_group(&handle);
        if group.script().is_none() {
            return Err(GameError::ScriptNotActive);
        }
        group.end_game();
        let report = GameReport::from_group(&group);
        let timeout = group.connection_timeout();
        group.prune_disconnected_boards(timeout);
        Ok(report)
    }

    pub fn report(&self, group_id: &str) -> GameReport {
        let handle = self.manager.get_or_create(group_id);
        let group = lock_group(&handle);
        GameReport::from_group(&group)
    }

    /// Debug path: sets a board's readings, creating the board if needed.
    pub fn spoof_board_power(&self, group_id: &str, board_id: BoardId, production: f64, consumption: f64) {
        let handle = self.manager.get_or_create(group_id);
        lock_group(&handle).spoof_board_power(board_id, production, consumption);
    }

    /// Pins the consumption of one building type, in watts, until cleared.
    pub fn override_building(
        &self,
        group_id: &str,
        building_type: u8,
        watts: f64,
    ) -> Result<(), GameError> {
        let handle = self.manager.get_or_create(group_id);
        let result = lock_group(&handle).override_building_consumption(building_type, watts);
        result.map_err(|e| {
            warn!(group = group_id, building_type, watts, error = %e, "building override rejected");
            e
        })
    }

    pub fn clear_building_override(&self, group_id: &str, building_type: u8) {
        let handle = self.manager.get_or_create(group_id);
        lock_group(&handle).clear_building_override(building_type);
    }

    pub fn connection_summary(&self, group_id: &str) -> ConnectionSummary {
        let handle = self.manager.get_or_create(group_id);
        let summary = lock_group(&handle).connection_summary();
        if !summary.disconnected.is_empty() {
            warn!(
                group = group_id,
                disconnected = summary.disconnected.len(),
                "boards not reporting"
            );
        }
        summary
    }
}
