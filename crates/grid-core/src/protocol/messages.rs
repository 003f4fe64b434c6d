//! All board protocol message types.
//!
//! Boards and the server exchange fixed-layout binary messages.  Unlike a
//! framed protocol there is no shared header carrying a type code: every
//! endpoint knows which message it expects, so the first byte (where present)
//! is the protocol version tag.  All multi-byte integers are big-endian.
//!
//! # Power units
//!
//! Power travels as signed fixed-point integers so the firmware never needs
//! floating point:
//!
//! | Message                         | Unit                       |
//! |---------------------------------|----------------------------|
//! | [`PowerData`], [`PollResponse`] | centiwatts (W × 100)       |
//! | [`PowerValues`]                 | milliwatts (W × 1000)      |
//! | [`BuildingTable`]               | milliwatts                 |
//! | [`CoefficientsResponse`]        | coefficient × 1000 / mW    |
//! | [`ProductionRanges`]            | milliwatts                 |

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// ── Protocol constants ────────────────────────────────────────────────────────

/// Current protocol version byte.
pub const PROTOCOL_VERSION: u8 = 0x02;

/// Version byte of the sentinel-only PowerData layout (no flags byte).
pub const LEGACY_PROTOCOL_VERSION: u8 = 0x01;

/// Reserved value meaning "absent" in the legacy PowerData layout.
///
/// The current layout carries an explicit flags byte and ignores the
/// sentinel on decode, but still writes it into absent fields so older
/// firmware reading the value slot sees "absent" too.
pub const ABSENT_POWER: i32 = 0x7FFF_FFFF;

/// Width of the null-padded board name field in a registration request.
pub const BOARD_NAME_LEN: usize = 32;

/// Width of the null-padded board type field in a registration request.
pub const BOARD_TYPE_LEN: usize = 16;

/// version(1) + board_id(4) + name(32) + type(16)
pub const REGISTRATION_REQUEST_LEN: usize = 53;

/// version(1) + success(1) + msg_len(1)
pub const REGISTRATION_RESPONSE_MIN_LEN: usize = 3;

/// version(1) + board_id(4) + timestamp(8) + generation(4) + consumption(4) + flags(1)
pub const POWER_DATA_LEN: usize = 22;

/// Legacy PowerData: same as [`POWER_DATA_LEN`] without the flags byte.
pub const LEGACY_POWER_DATA_LEN: usize = 21;

/// version(1) + timestamp(8) + round(2) + score(4) + generation(4) +
/// consumption(4) + building_table_version(8) + flags(1)
pub const POLL_RESPONSE_LEN: usize = 32;

/// version(1) + board_id(4)
pub const BUILDING_TABLE_REQUEST_LEN: usize = 5;

/// version(1) + table_version(8) + entry_count(1)
pub const BUILDING_TABLE_MIN_LEN: usize = 10;

/// Legacy PowerValues: production(4) + consumption(4).
pub const LEGACY_POWER_VALUES_LEN: usize = 8;

/// production(4) + consumption(4) + building_count(1)
pub const POWER_VALUES_MIN_LEN: usize = 9;

/// Maximum number of entries in any count-prefixed table.
pub const MAX_TABLE_ENTRIES: usize = u8::MAX as usize;

/// Bit flags of the PowerData flags byte.
pub mod power_flags {
    pub const HAS_GENERATION: u8 = 1 << 0;
    pub const HAS_CONSUMPTION: u8 = 1 << 1;
}

/// Bit flags of the PollResponse flags byte.
pub mod poll_flags {
    pub const ROUND_IS_DAY: u8 = 1 << 0;
    pub const GAME_ACTIVE: u8 = 1 << 1;
    pub const EXPECTING_DATA: u8 = 1 << 2;
}

// ── Message kinds ─────────────────────────────────────────────────────────────

/// Identifies which layout a byte buffer should be decoded with.
///
/// The wire carries no type code, so the receiving endpoint names the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    RegistrationRequest,
    RegistrationResponse,
    PowerData,
    PollResponse,
    BuildingTableRequest,
    BuildingTable,
    CoefficientsResponse,
    ProductionRanges,
    PowerValues,
}

impl MessageKind {
    /// Minimum number of bytes a message of this kind occupies.
    pub fn min_len(self) -> usize {
        match self {
            MessageKind::RegistrationRequest => REGISTRATION_REQUEST_LEN,
            MessageKind::RegistrationResponse => REGISTRATION_RESPONSE_MIN_LEN,
            MessageKind::PowerData => POWER_DATA_LEN,
            MessageKind::PollResponse => POLL_RESPONSE_LEN,
            MessageKind::BuildingTableRequest => BUILDING_TABLE_REQUEST_LEN,
            MessageKind::BuildingTable => BUILDING_TABLE_MIN_LEN,
            // prod_count(1) + cons_count(1)
            MessageKind::CoefficientsResponse => 2,
            MessageKind::ProductionRanges => 1,
            MessageKind::PowerValues => POWER_VALUES_MIN_LEN,
        }
    }

    /// Whether the first byte of this kind is a protocol version tag.
    pub fn is_versioned(self) -> bool {
        matches!(
            self,
            MessageKind::RegistrationRequest
                | MessageKind::RegistrationResponse
                | MessageKind::PowerData
                | MessageKind::PollResponse
                | MessageKind::BuildingTableRequest
                | MessageKind::BuildingTable
        )
    }
}

/// Whether a PowerValues report must carry the connected-building list.
///
/// Once `Required` is active the 8-byte legacy form is rejected; this is a
/// deliberate breaking change between firmware generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BuildingListPolicy {
    #[default]
    Required,
    Optional,
}

// ── Per-message payload structs ───────────────────────────────────────────────

/// Board → server: announce a board after power-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub board_id: u32,
    /// At most [`BOARD_NAME_LEN`] UTF-8 bytes, no NUL characters.
    pub name: String,
    /// At most [`BOARD_TYPE_LEN`] UTF-8 bytes, no NUL characters.
    pub board_type: String,
}

/// Server → board: outcome of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub success: bool,
    /// At most 255 UTF-8 bytes.
    pub message: String,
}

/// Board → server: one power sample in centiwatts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerData {
    pub board_id: u32,
    /// Seconds since the Unix epoch as seen by the board.
    pub timestamp: u64,
    pub generation: Option<i32>,
    pub consumption: Option<i32>,
}

/// Server → board: answer to a status poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResponse {
    /// Server wall clock, seconds since the Unix epoch.
    pub timestamp: u64,
    /// One-based ordinal of the active round, 0 when no round is active.
    pub round: u16,
    pub score: u32,
    /// Centiwatts.
    pub generation: i32,
    /// Centiwatts.
    pub consumption: i32,
    pub building_table_version: u64,
    pub round_is_day: bool,
    pub game_active: bool,
    pub expecting_data: bool,
}

/// Board → server: ask for the current building consumption table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingTableRequest {
    pub board_id: u32,
}

/// Server → board: consumption per building type in milliwatts.
///
/// Entries live in a `BTreeMap` so they are always emitted in ascending
/// building-type order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BuildingTable {
    pub table_version: u64,
    pub entries: BTreeMap<u8, i32>,
}

/// Server → board: per-round production coefficients and building
/// consumption.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CoefficientsResponse {
    /// source id → coefficient × 1000 (signed: storage may charge).
    pub production: BTreeMap<u8, i32>,
    /// building id → consumption in milliwatts.
    pub consumption: BTreeMap<u8, i32>,
}

/// Inclusive power range of one source in milliwatts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerRange {
    pub min: i32,
    pub max: i32,
}

/// Server → board: allowed output range per power plant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProductionRanges {
    pub ranges: BTreeMap<u32, PowerRange>,
}

/// A building card placed on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedBuilding {
    /// Tag UID of the physical card.
    pub uid: u32,
    pub building_type: u8,
}

/// Board → server: power totals in milliwatts plus the buildings currently
/// placed on the board.
///
/// `buildings == None` is the legacy 8-byte form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerValues {
    pub production: i32,
    pub consumption: i32,
    pub buildings: Option<Vec<ConnectedBuilding>>,
}

// ── Top-level message enum ────────────────────────────────────────────────────

/// Every message exchanged with a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardMessage {
    RegistrationRequest(RegistrationRequest),
    RegistrationResponse(RegistrationResponse),
    PowerData(PowerData),
    PollResponse(PollResponse),
    BuildingTableRequest(BuildingTableRequest),
    BuildingTable(BuildingTable),
    CoefficientsResponse(CoefficientsResponse),
    ProductionRanges(ProductionRanges),
    PowerValues(PowerValues),
}

impl BoardMessage {
    /// Returns the layout this message is encoded with.
    pub fn kind(&self) -> MessageKind {
        match self {
            BoardMessage::RegistrationRequest(_) => MessageKind::RegistrationRequest,
            BoardMessage::RegistrationResponse(_) => MessageKind::RegistrationResponse,
            BoardMessage::PowerData(_) => MessageKind::PowerData,
            BoardMessage::PollResponse(_) => MessageKind::PollResponse,
            BoardMessage::BuildingTableRequest(_) => MessageKind::BuildingTableRequest,
            BoardMessage::BuildingTable(_) => MessageKind::BuildingTable,
            BoardMessage::CoefficientsResponse(_) => MessageKind::CoefficientsResponse,
            BoardMessage::ProductionRanges(_) => MessageKind::ProductionRanges,
            BoardMessage::PowerValues(_) => MessageKind::PowerValues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_lengths_match_field_widths() {
        assert_eq!(REGISTRATION_REQUEST_LEN, 1 + 4 + BOARD_NAME_LEN + BOARD_TYPE_LEN);
        assert_eq!(POWER_DATA_LEN, 1 + 4 + 8 + 4 + 4 + 1);
        assert_eq!(POLL_RESPONSE_LEN, 1 + 8 + 2 + 4 + 4 + 4 + 8 + 1);
    }

    #[test]
    fn test_only_board_facing_headers_are_versioned() {
        assert!(MessageKind::PowerData.is_versioned());
        assert!(MessageKind::BuildingTable.is_versioned());
        assert!(!MessageKind::CoefficientsResponse.is_versioned());
        assert!(!MessageKind::PowerValues.is_versioned());
    }

    #[test]
    fn test_default_building_policy_is_required() {
        assert_eq!(BuildingListPolicy::default(), BuildingListPolicy::Required);
    }
}
