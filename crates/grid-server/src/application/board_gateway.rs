//! Use case: serve the requests a board makes.
//!
//! Every entry point takes the raw request body and, where the board expects
//! one, returns the raw response body.  The board-to-group mapping comes from
//! the caller (the transport authenticates the board and knows its group).
//!
//! Power conversions at this boundary:
//!
//! | Message       | Wire unit   | Stored as |
//! |---------------|-------------|-----------|
//! | PowerData     | centiwatts  | watts     |
//! | PowerValues   | milliwatts  | watts     |
//! | PollResponse  | centiwatts  | watts     |

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use thiserror::Error;
use tracing::{debug, warn};

use grid_core::protocol::codec::{
    decode_building_table_request, decode_power_data_compat, decode_power_values,
    decode_registration_request, encode_building_table, encode_coefficients_response,
    encode_poll_response, encode_production_ranges, encode_registration_response,
};
use grid_core::protocol::fixed_point::{
    centiwatts_to_watts, coefficient_to_milli, milliwatts_to_watts, watts_to_centiwatts,
    watts_to_milliwatts,
};
use grid_core::protocol::{
    BuildingListPolicy, CoefficientsResponse, PollResponse, PowerRange, ProductionRanges,
    RegistrationResponse,
};
use grid_core::{lock_group, BoardId, GameError, GroupGameManager, GroupGameState, ProtocolError};

/// Errors surfaced to the transport, which maps them to its own status codes.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Game(#[from] GameError),
}

pub struct BoardGateway {
    manager: Arc<GroupGameManager>,
    policy: BuildingListPolicy,
}

impl BoardGateway {
    pub fn new(manager: Arc<GroupGameManager>, policy: BuildingListPolicy) -> Self {
        Self { manager, policy }
    }

    pub fn policy(&self) -> BuildingListPolicy {
        self.policy
    }

    fn with_group<T>(&self, group_id: &str, f: impl FnOnce(&mut GroupGameState) -> T) -> T {
        let handle = self.manager.get_or_create(group_id);
        let mut group = lock_group(&handle);
        f(&mut group)
    }

    // ── Board → server ────────────────────────────────────────────────────────

    /// Registers the board named in a RegistrationRequest.
    ///
    /// Malformed requests are not an error for the caller: the board gets a
    /// RegistrationResponse with `success = false` and the decode error as
    /// text, so it can tell a version mismatch from a network fault.
    pub fn handle_registration(&self, group_id: &str, body: &[u8]) -> Result<Vec<u8>, GatewayError> {
        let response = match decode_registration_request(body) {
            Ok(request) => {
                let id = BoardId::from(request.board_id);
                let display_name = self.with_group(group_id, |group| {
                    group
                        .register_board(id, Some(request.name), Some(request.board_type))
                        .display_name
                        .clone()
                });
                RegistrationResponse {
                    success: true,
                    message: format!("registered as {display_name}"),
                }
            }
            Err(e) => {
                warn!(group = group_id, "rejected registration: {e}");
                RegistrationResponse {
                    success: false,
                    message: e.to_string(),
                }
            }
        };
        Ok(encode_registration_response(&response)?)
    }

    /// Ingests a PowerData sample of either firmware generation.
    ///
    /// Returns the id of the board the sample was recorded for.
    pub fn handle_power_data(&self, group_id: &str, body: &[u8]) -> Result<BoardId, GatewayError> {
        let sample = decode_power_data_compat(body).map_err(|e| {
            warn!(group = group_id, "rejected power data: {e}");
            e
        })?;
        let id = BoardId::from(sample.board_id);
        self.with_group(group_id, |group| {
            group.update_board_power(
                &id,
                sample.generation.map(centiwatts_to_watts),
                sample.consumption.map(centiwatts_to_watts),
            )
        })?;
        Ok(id)
    }

    /// Ingests a PowerValues report from `board_id`.
    ///
    /// When the report carries a building list it replaces the board's
    /// connected buildings wholesale.
    pub fn handle_power_values(
        &self,
        group_id: &str,
        board_id: &BoardId,
        body: &[u8],
    ) -> Result<(), GatewayError> {
        let report = decode_power_values(body, self.policy).map_err(|e| {
            warn!(group = group_id, board = %board_id, "rejected power values: {e}");
            e
        })?;
        self.with_group(group_id, |group| {
            group.update_board_power(
                board_id,
                Some(milliwatts_to_watts(report.production)),
                Some(milliwatts_to_watts(report.consumption)),
            )?;
            if let Some(buildings) = report.buildings {
                debug!(board = %board_id, count = buildings.len(), "connected buildings reported");
                group.report_connected_buildings(board_id, buildings)?;
            }
            Ok::<_, GameError>(())
        })?;
        Ok(())
    }

    /// Records the per-source generation a board reports (source id → W).
    pub fn report_production(
        &self,
        group_id: &str,
        board_id: &BoardId,
        breakdown: BTreeMap<u8, f64>,
    ) -> Result<(), GatewayError> {
        self.with_group(group_id, |group| group.report_production(board_id, breakdown))?;
        Ok(())
    }

    // ── Server → board ────────────────────────────────────────────────────────

    /// Builds the PollResponse for `board_id`.
    pub fn handle_poll(&self, group_id: &str, board_id: &BoardId) -> Result<Vec<u8>, GatewayError> {
        let response = self.with_group(group_id, |group| poll_response(group, board_id))?;
        Ok(encode_poll_response(&response))
    }

    /// Answers a BuildingTableRequest with the group's current table.
    pub fn handle_building_table_request(
        &self,
        group_id: &str,
        body: &[u8],
    ) -> Result<Vec<u8>, GatewayError> {
        let request = decode_building_table_request(body)?;
        let id = BoardId::from(request.board_id);
        let table = self.with_group(group_id, |group| {
            group.get_board(&id)?;
            group.building_table()
        })?;
        Ok(encode_building_table(&table)?)
    }

    /// Production coefficients and building consumption of the current
    /// round.  Both tables are empty outside gameplay rounds.
    pub fn coefficients(&self, group_id: &str) -> Result<Vec<u8>, GatewayError> {
        let response = self.with_group(group_id, |group| {
            let production = group
                .script()
                .map(|s| s.current_production_coefficients())
                .unwrap_or_default()
                .into_iter()
                .map(|(source, c)| Ok((source.id(), coefficient_to_milli(c)?)))
                .collect::<Result<BTreeMap<_, _>, ProtocolError>>()?;
            let gameplay = group.current_round_type().is_some_and(|t| t.is_gameplay());
            let consumption = if gameplay {
                group
                    .effective_building_consumption()
                    .into_iter()
                    .map(|(building, w)| Ok((building, watts_to_milliwatts(w)?)))
                    .collect::<Result<BTreeMap<_, _>, ProtocolError>>()?
            } else {
                BTreeMap::new()
            };
            Ok::<_, ProtocolError>(CoefficientsResponse {
                production,
                consumption,
            })
        })?;
        Ok(encode_coefficients_response(&response)?)
    }

    /// Allowed output range per power plant in the current round.
    pub fn production_ranges(&self, group_id: &str) -> Result<Vec<u8>, GatewayError> {
        let response = self.with_group(group_id, |group| {
            let ranges = group
                .script()
                .map(|s| s.current_production_ranges())
                .unwrap_or_default()
                .into_iter()
                .map(|(source, range)| {
                    let range = PowerRange {
                        min: watts_to_milliwatts(range.min)?,
                        max: watts_to_milliwatts(range.max)?,
                    };
                    Ok((u32::from(source.id()), range))
                })
                .collect::<Result<BTreeMap<_, _>, ProtocolError>>()?;
            Ok::<_, ProtocolError>(ProductionRanges { ranges })
        })?;
        Ok(encode_production_ranges(&response)?)
    }
}

fn poll_response(group: &GroupGameState, board_id: &BoardId) -> Result<PollResponse, GameError> {
    let board = group.get_board(board_id)?;
    let timestamp = group
        .now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let round = poll_round_number(group.current_round_index())?;
    let round_is_day = group
        .script()
        .and_then(|s| s.current_round())
        .is_some_and(|r| r.is_day());

    Ok(PollResponse {
        timestamp,
        round,
        score: group.board_score(board_id)?,
        generation: watts_to_centiwatts(board.current_production)?,
        consumption: watts_to_centiwatts(board.current_consumption)?,
        building_table_version: group.building_table_version(),
        round_is_day,
        game_active: group.is_game_active(),
        expecting_data: group.expecting_data(board_id)?,
    })
}

/// 1-based round ordinal for the poll response, 0 when no round is active.
fn poll_round_number(index: Option<usize>) -> Result<u16, ProtocolError> {
    let Some(index) = index else {
        return Ok(0);
    };
    index
        .checked_add(1)
        .and_then(|n| u16::try_from(n).ok())
        .ok_or_else(|| ProtocolError::InvalidFieldRange {
            field: "round",
            reason: format!("round index {index} does not fit in u16"),
        })
}
