//! Integration tests for the board gateway and lecturer control use cases.
//!
//! Boards are simulated by encoding requests with the grid-core codec and
//! decoding whatever the gateway answers.

use std::collections::BTreeMap;
use std::sync::Arc;

use grid_core::protocol::codec::{
    decode_building_table, decode_coefficients_response, decode_poll_response,
    decode_production_ranges, decode_registration_response, encode_building_table_request,
    encode_power_data, encode_power_data_legacy, encode_power_values,
    encode_registration_request,
};
use grid_core::protocol::{
    BuildingTableRequest, ConnectedBuilding, PowerData, PowerValues, RegistrationRequest,
    PROTOCOL_VERSION,
};
use grid_core::{lock_group, AdvanceOutcome, BoardId, GameError, ProtocolError};
use grid_server::application::board_gateway::GatewayError;
use grid_server::infrastructure::app_state::AppState;
use grid_server::infrastructure::storage::config::ServerConfig;

const GROUP: &str = "class-a";

fn state() -> Arc<AppState> {
    AppState::new(ServerConfig::default())
}

fn register(state: &AppState, board_id: u32, name: &str) {
    let body = encode_registration_request(&RegistrationRequest {
        board_id,
        name: name.to_string(),
        board_type: "esp32".to_string(),
    })
    .unwrap();
    let response = state.gateway.handle_registration(GROUP, &body).unwrap();
    assert!(decode_registration_response(&response).unwrap().success);
}

fn power_data(board_id: u32, generation_cw: i32, consumption_cw: i32) -> Vec<u8> {
    encode_power_data(&PowerData {
        board_id,
        timestamp: 1_700_000_000,
        generation: Some(generation_cw),
        consumption: Some(consumption_cw),
    })
    .unwrap()
}

// ── Registration ──────────────────────────────────────────────────────────────

#[test]
fn test_registration_answers_with_display_name() {
    let state = state();
    let body = encode_registration_request(&RegistrationRequest {
        board_id: 7,
        name: "Alpha".to_string(),
        board_type: "solar".to_string(),
    })
    .unwrap();

    let response = decode_registration_response(&state.gateway.handle_registration(GROUP, &body).unwrap()).unwrap();

    assert!(response.success);
    assert_eq!(response.message, "registered as Board 7");
    let handle = state.manager.get(GROUP).unwrap();
    let group = lock_group(&handle);
    let board = group.get_board(&BoardId::from(7)).unwrap();
    assert_eq!(board.reported_name.as_deref(), Some("Alpha"));
    assert_eq!(board.board_type, "solar");
}

#[test]
fn test_registration_with_wrong_version_is_answered_with_error_text() {
    let state = state();
    let mut body = encode_registration_request(&RegistrationRequest {
        board_id: 7,
        name: "Alpha".to_string(),
        board_type: "solar".to_string(),
    })
    .unwrap();
    body[0] = PROTOCOL_VERSION + 1;

    let response = decode_registration_response(&state.gateway.handle_registration(GROUP, &body).unwrap()).unwrap();

    assert!(!response.success);
    assert!(response.message.contains("unsupported protocol version"));
}

// ── Telemetry ─────────────────────────────────────────────────────────────────

#[test]
fn test_power_data_from_unregistered_board_is_not_found() {
    let state = state();
    let err = state.gateway.handle_power_data(GROUP, &power_data(9, 100, 100)).unwrap_err();
    assert!(matches!(err, GatewayError::Game(GameError::BoardNotFound(_))));
}

#[test]
fn test_legacy_and_current_power_data_are_both_ingested() {
    let state = state();
    register(&state, 1, "one");

    let legacy = encode_power_data_legacy(&PowerData {
        board_id: 1,
        timestamp: 0,
        generation: Some(12_550),
        consumption: None,
    })
    .unwrap();
    state.gateway.handle_power_data(GROUP, &legacy).unwrap();
    state.gateway.handle_power_data(GROUP, &power_data(1, 12_550, 10_000)).unwrap();

    let handle = state.manager.get(GROUP).unwrap();
    let group = lock_group(&handle);
    let board = group.get_board(&BoardId::from(1)).unwrap();
    assert_eq!(board.current_production, 125.5);
    assert_eq!(board.current_consumption, 100.0);
}

#[test]
fn test_power_values_replace_connected_buildings() {
    let state = state();
    register(&state, 1, "one");
    let id = BoardId::from(1);

    for buildings in [
        vec![
            ConnectedBuilding { uid: 10, building_type: 8 },
            ConnectedBuilding { uid: 11, building_type: 9 },
        ],
        vec![ConnectedBuilding { uid: 12, building_type: 1 }],
    ] {
        let body = encode_power_values(&PowerValues {
            production: 250_000,
            consumption: 240_000,
            buildings: Some(buildings),
        })
        .unwrap();
        state.gateway.handle_power_values(GROUP, &id, &body).unwrap();
    }

    let handle = state.manager.get(GROUP).unwrap();
    let group = lock_group(&handle);
    let board = group.get_board(&id).unwrap();
    assert_eq!(board.connected_buildings, vec![ConnectedBuilding { uid: 12, building_type: 1 }]);
    assert_eq!(board.current_production, 250.0);
}

#[test]
fn test_legacy_power_values_rejected_by_default_policy() {
    let state = state();
    register(&state, 1, "one");
    let body = encode_power_values(&PowerValues {
        production: 1,
        consumption: 1,
        buildings: None,
    })
    .unwrap();

    let err = state.gateway.handle_power_values(GROUP, &BoardId::from(1), &body).unwrap_err();

    assert!(matches!(
        err,
        GatewayError::Protocol(ProtocolError::TruncatedMessage { expected: 9, actual: 8 })
    ));
}

// ── Full round trip ───────────────────────────────────────────────────────────

#[test]
fn test_board_and_lecturer_play_a_round() {
    let state = state();
    register(&state, 1, "one");
    let id = BoardId::from(1);

    state.lecturer.start_game(GROUP, "test").unwrap();

    let poll = decode_poll_response(&state.gateway.handle_poll(GROUP, &id).unwrap()).unwrap();
    assert_eq!(poll.round, 1);
    assert!(poll.round_is_day);
    assert!(poll.game_active);
    assert!(poll.expecting_data);

    state.gateway.handle_power_data(GROUP, &power_data(1, 10_000, 8_000)).unwrap();
    let poll = decode_poll_response(&state.gateway.handle_poll(GROUP, &id).unwrap()).unwrap();
    assert!(!poll.expecting_data);
    assert_eq!(poll.generation, 10_000);
    assert_eq!(poll.score, 4);

    let outcome = state.lecturer.next_round(GROUP).unwrap();
    assert!(matches!(outcome, AdvanceOutcome::Advanced { round_index: 1, .. }));

    let poll = decode_poll_response(&state.gateway.handle_poll(GROUP, &id).unwrap()).unwrap();
    assert_eq!(poll.round, 2);
    assert!(!poll.round_is_day);
    assert!(poll.expecting_data);

    let handle = state.manager.get(GROUP).unwrap();
    let group = lock_group(&handle);
    let board = group.get_board(&id).unwrap();
    assert_eq!(board.production_history, vec![100.0]);
    assert_eq!(board.consumption_history, vec![80.0]);
    assert_eq!(board.round_history, vec![0]);
}

#[test]
fn test_building_table_coefficients_and_ranges_follow_the_round() {
    let state = state();
    register(&state, 1, "one");
    state.lecturer.start_game(GROUP, "test").unwrap();

    let request = encode_building_table_request(&BuildingTableRequest { board_id: 1 });
    let table = decode_building_table(&state.gateway.handle_building_table_request(GROUP, &request).unwrap()).unwrap();
    assert_eq!(table.entries.len(), 17);
    assert_eq!(table.entries[&8], 250_000);

    let coefficients = decode_coefficients_response(&state.gateway.coefficients(GROUP).unwrap()).unwrap();
    // Day 1 is sunny; wind stays at its half-strength baseline.
    assert_eq!(coefficients.production[&7], 1000);
    assert_eq!(coefficients.production[&6], 500);
    assert_eq!(coefficients.consumption[&8], 250_000);

    let ranges = decode_production_ranges(&state.gateway.production_ranges(GROUP).unwrap()).unwrap();
    assert_eq!(ranges.ranges.len(), 8);
    assert_eq!(ranges.ranges[&8].min, -200_000);
    assert_eq!(ranges.ranges[&6].max, 50_000);

    state.lecturer.override_building(GROUP, 8, 300.0).unwrap();
    let table_after = decode_building_table(&state.gateway.handle_building_table_request(GROUP, &request).unwrap()).unwrap();
    assert!(table_after.table_version > table.table_version);
    assert_eq!(table_after.entries[&8], 300_000);
}

#[test]
fn test_coefficients_are_empty_without_a_game() {
    let state = state();
    let coefficients = decode_coefficients_response(&state.gateway.coefficients(GROUP).unwrap()).unwrap();
    assert!(coefficients.production.is_empty());
    assert!(coefficients.consumption.is_empty());
}

#[test]
fn test_report_production_is_snapshotted_on_advance() {
    let state = state();
    register(&state, 1, "one");
    let id = BoardId::from(1);
    state.lecturer.start_game(GROUP, "test").unwrap();

    state
        .gateway
        .report_production(GROUP, &id, BTreeMap::from([(1, 300.0), (5, 950.0)]))
        .unwrap();
    state.lecturer.next_round(GROUP).unwrap();

    let report = state.lecturer.report(GROUP);
    let board = &report.boards[0];
    assert_eq!(board.powerplants.len(), 1);
    assert_eq!(board.powerplants[0].total_production, 1250.0);
    assert_eq!(board.powerplants[0].connected_production, vec![1, 5]);
}

#[test]
fn test_unknown_scenario_is_rejected() {
    let state = state();
    let err = state.lecturer.start_game(GROUP, "missing").unwrap_err();
    assert!(matches!(err, GameError::InvalidScenario(_)));
}
