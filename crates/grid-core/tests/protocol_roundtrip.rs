//! Integration tests for the grid-core protocol codec.
//!
//! These go through the crate's public API only: the `BoardMessage`
//! dispatchers, the per-message functions and the fixed-point helpers.

use std::collections::BTreeMap;

use grid_core::protocol::codec::{
    decode_building_table, decode_power_data_compat, decode_power_values,
    decode_registration_request, encode_building_table, encode_power_data_legacy,
    encode_registration_request,
};
use grid_core::protocol::fixed_point::{centiwatts_to_watts, watts_to_centiwatts};
use grid_core::protocol::messages::{
    BoardMessage, BuildingListPolicy, BuildingTable, BuildingTableRequest, ConnectedBuilding,
    MessageKind, PollResponse, PowerData, PowerValues, RegistrationRequest, RegistrationResponse,
    PROTOCOL_VERSION,
};
use grid_core::{decode_message, encode_message, ProtocolError};

/// Encodes a message and decodes it again with the layout of its own kind.
fn roundtrip(msg: &BoardMessage) -> BoardMessage {
    let bytes = encode_message(msg).expect("encode must succeed");
    decode_message(msg.kind(), &bytes).expect("decode must succeed")
}

#[test]
fn test_roundtrip_registration_request_strips_padding() {
    let request = RegistrationRequest {
        board_id: 7,
        name: "Alpha".to_string(),
        board_type: "solar".to_string(),
    };

    let bytes = encode_registration_request(&request).unwrap();
    let decoded = decode_registration_request(&bytes).unwrap();

    assert_eq!(bytes.len(), 53);
    assert_eq!(
        (decoded.board_id, decoded.name.as_str(), decoded.board_type.as_str()),
        (7, "Alpha", "solar")
    );
}

#[test]
fn test_roundtrip_building_table_is_sorted() {
    let table = BuildingTable {
        table_version: 42,
        entries: BTreeMap::from([(3, -100), (1, 250)]),
    };

    let bytes = encode_building_table(&table).unwrap();
    let decoded = decode_building_table(&bytes).unwrap();

    assert_eq!(decoded.table_version, 42);
    assert_eq!(decoded.entries, BTreeMap::from([(1, 250), (3, -100)]));
    // [ver][version:8][count] then type 1 before type 3
    assert_eq!(bytes[10], 1);
    assert_eq!(bytes[15], 3);
}

#[test]
fn test_roundtrip_poll_response_flags() {
    let original = BoardMessage::PollResponse(PollResponse {
        timestamp: 1_700_000_123,
        round: 14,
        score: 96,
        generation: -5_000,
        consumption: 120_000,
        building_table_version: u64::MAX,
        round_is_day: false,
        game_active: true,
        expecting_data: true,
    });

    assert_eq!(original, roundtrip(&original));
}

#[test]
fn test_roundtrip_registration_response_with_error_text() {
    let original = BoardMessage::RegistrationResponse(RegistrationResponse {
        success: false,
        message: "unsupported protocol version: 1".to_string(),
    });

    assert_eq!(original, roundtrip(&original));
}

#[test]
fn test_roundtrip_power_values_with_buildings() {
    let original = BoardMessage::PowerValues(PowerValues {
        production: 1_500_000,
        consumption: -20_000,
        buildings: Some(vec![
            ConnectedBuilding { uid: 0xDEAD_BEEF, building_type: 8 },
            ConnectedBuilding { uid: 1, building_type: 17 },
        ]),
    });

    assert_eq!(original, roundtrip(&original));
}

#[test]
fn test_version_guard_applies_to_every_versioned_kind() {
    let samples = [
        BoardMessage::BuildingTableRequest(BuildingTableRequest { board_id: 1 }),
        BoardMessage::PowerData(PowerData {
            board_id: 1,
            timestamp: 0,
            generation: None,
            consumption: None,
        }),
    ];
    for msg in samples {
        let mut bytes = encode_message(&msg).unwrap();
        bytes[0] = PROTOCOL_VERSION + 1;
        assert_eq!(
            decode_message(msg.kind(), &bytes),
            Err(ProtocolError::UnsupportedVersion(PROTOCOL_VERSION + 1))
        );
    }
}

#[test]
fn test_empty_buffer_is_truncated_for_every_kind() {
    let kinds = [
        MessageKind::RegistrationRequest,
        MessageKind::RegistrationResponse,
        MessageKind::PowerData,
        MessageKind::PollResponse,
        MessageKind::BuildingTableRequest,
        MessageKind::BuildingTable,
        MessageKind::CoefficientsResponse,
        MessageKind::ProductionRanges,
        MessageKind::PowerValues,
    ];
    for kind in kinds {
        assert!(
            matches!(
                decode_message(kind, &[]),
                Err(ProtocolError::TruncatedMessage { actual: 0, .. })
            ),
            "{kind:?} must reject an empty buffer"
        );
    }
}

#[test]
fn test_legacy_board_is_understood_by_compat_decoder() {
    let sample = PowerData {
        board_id: 3,
        timestamp: 99,
        generation: Some(watts_to_centiwatts(12.5).unwrap()),
        consumption: None,
    };

    let bytes = encode_power_data_legacy(&sample).unwrap();
    let decoded = decode_power_data_compat(&bytes).unwrap();

    assert_eq!(decoded, sample);
    assert_eq!(decoded.generation.map(centiwatts_to_watts), Some(12.5));
    assert!(matches!(
        decode_message(MessageKind::PowerData, &bytes),
        Err(ProtocolError::UnsupportedVersion(_))
    ));
}

#[test]
fn test_buildings_required_policy_rejects_legacy_power_values() {
    let legacy = PowerValues {
        production: 1000,
        consumption: 2000,
        buildings: None,
    };
    let bytes = encode_message(&BoardMessage::PowerValues(legacy.clone())).unwrap();
    assert_eq!(bytes.len(), 8);

    assert_eq!(
        decode_power_values(&bytes, BuildingListPolicy::Required),
        Err(ProtocolError::TruncatedMessage { expected: 9, actual: 8 })
    );
    assert_eq!(decode_power_values(&bytes, BuildingListPolicy::Optional), Ok(legacy));
}
