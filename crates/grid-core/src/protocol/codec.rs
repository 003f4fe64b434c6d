//! Binary codec for encoding and decoding board protocol messages.
//!
//! Wire layouts (all multi-byte integers big-endian):
//! ```text
//! RegistrationRequest      [ver:1][board_id:4][name:32][type:16]                      53 bytes
//! RegistrationResponse     [ver:1][success:1][msg_len:1][msg:msg_len]
//! PowerData                [ver:1][board_id:4][ts:8][gen:4][cons:4][flags:1]          22 bytes
//! PowerData (legacy v1)    [ver:1][board_id:4][ts:8][gen:4][cons:4]                   21 bytes
//! PollResponse             [ver:1][ts:8][round:2][score:4][gen:4][cons:4][tbl_ver:8][flags:1]
//! BuildingTableRequest     [ver:1][board_id:4]                                         5 bytes
//! BuildingTable            [ver:1][tbl_ver:8][count:1]([type:1][cons:4])*
//! CoefficientsResponse     [n:1]([source:1][coeff:4])* [m:1]([building:1][cons:4])*
//! ProductionRanges         [n:1]([source:4][min:4][max:4])*
//! PowerValues              [prod:4][cons:4][count:1]([uid:4][type:1])*
//! PowerValues (legacy)     [prod:4][cons:4]                                            8 bytes
//! ```
//!
//! Every function here is pure; callers on any thread may use them freely.
//!
//! Decoders check the version byte first (when the layout has one), then the
//! minimum length, then any count-prefixed tail.  Trailing bytes beyond the
//! declared layout are ignored.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::protocol::messages::{
    poll_flags, power_flags, BoardMessage, BuildingListPolicy, BuildingTable,
    BuildingTableRequest, CoefficientsResponse, ConnectedBuilding, MessageKind, PollResponse,
    PowerData, PowerRange, PowerValues, ProductionRanges, RegistrationRequest,
    RegistrationResponse, ABSENT_POWER, BOARD_NAME_LEN, BOARD_TYPE_LEN, BUILDING_TABLE_MIN_LEN,
    BUILDING_TABLE_REQUEST_LEN, LEGACY_POWER_DATA_LEN, LEGACY_POWER_VALUES_LEN,
    LEGACY_PROTOCOL_VERSION, MAX_TABLE_ENTRIES, POLL_RESPONSE_LEN, POWER_DATA_LEN,
    POWER_VALUES_MIN_LEN, PROTOCOL_VERSION, REGISTRATION_REQUEST_LEN,
    REGISTRATION_RESPONSE_MIN_LEN,
};

/// Errors that can occur during message encoding or decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The buffer ends before the layout (or a declared count) is satisfied.
    #[error("truncated message: need at least {expected} bytes, got {actual}")]
    TruncatedMessage { expected: usize, actual: usize },

    /// The version byte does not match the layout being decoded.
    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    /// A field value cannot be represented (or was not valid) on the wire.
    #[error("invalid value for {field}: {reason}")]
    InvalidFieldRange { field: &'static str, reason: String },
}

impl ProtocolError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ProtocolError::InvalidFieldRange {
            field,
            reason: reason.into(),
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Encodes any [`BoardMessage`] into its wire layout.
///
/// # Errors
///
/// Returns [`ProtocolError::InvalidFieldRange`] when a field does not fit its
/// wire width (string too long, table with more than 255 entries, reserved
/// sentinel used as a real value).  Values are never truncated.
///
/// # Examples
///
/// ```rust
/// use grid_core::protocol::{decode_message, encode_message};
/// use grid_core::protocol::messages::{BoardMessage, BuildingTableRequest, MessageKind};
///
/// let msg = BoardMessage::BuildingTableRequest(BuildingTableRequest { board_id: 9 });
/// let bytes = encode_message(&msg).unwrap();
/// assert_eq!(bytes.len(), 5);
/// assert_eq!(decode_message(MessageKind::BuildingTableRequest, &bytes).unwrap(), msg);
/// ```
pub fn encode_message(msg: &BoardMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        BoardMessage::RegistrationRequest(m) => encode_registration_request(m),
        BoardMessage::RegistrationResponse(m) => encode_registration_response(m),
        BoardMessage::PowerData(m) => encode_power_data(m),
        BoardMessage::PollResponse(m) => Ok(encode_poll_response(m)),
        BoardMessage::BuildingTableRequest(m) => Ok(encode_building_table_request(m)),
        BoardMessage::BuildingTable(m) => encode_building_table(m),
        BoardMessage::CoefficientsResponse(m) => encode_coefficients_response(m),
        BoardMessage::ProductionRanges(m) => encode_production_ranges(m),
        BoardMessage::PowerValues(m) => encode_power_values(m),
    }
}

/// Decodes `bytes` using the layout named by `kind`.
///
/// PowerValues are decoded under [`BuildingListPolicy::Required`]; call
/// [`decode_power_values`] directly to accept the legacy 8-byte form.
///
/// # Errors
///
/// Returns [`ProtocolError`] if the bytes are malformed.
pub fn decode_message(kind: MessageKind, bytes: &[u8]) -> Result<BoardMessage, ProtocolError> {
    match kind {
        MessageKind::RegistrationRequest => {
            decode_registration_request(bytes).map(BoardMessage::RegistrationRequest)
        }
        MessageKind::RegistrationResponse => {
            decode_registration_response(bytes).map(BoardMessage::RegistrationResponse)
        }
        MessageKind::PowerData => decode_power_data(bytes).map(BoardMessage::PowerData),
        MessageKind::PollResponse => decode_poll_response(bytes).map(BoardMessage::PollResponse),
        MessageKind::BuildingTableRequest => {
            decode_building_table_request(bytes).map(BoardMessage::BuildingTableRequest)
        }
        MessageKind::BuildingTable => decode_building_table(bytes).map(BoardMessage::BuildingTable),
        MessageKind::CoefficientsResponse => {
            decode_coefficients_response(bytes).map(BoardMessage::CoefficientsResponse)
        }
        MessageKind::ProductionRanges => {
            decode_production_ranges(bytes).map(BoardMessage::ProductionRanges)
        }
        MessageKind::PowerValues => {
            decode_power_values(bytes, BuildingListPolicy::Required).map(BoardMessage::PowerValues)
        }
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

pub fn encode_registration_request(m: &RegistrationRequest) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(REGISTRATION_REQUEST_LEN);
    buf.push(PROTOCOL_VERSION);
    buf.extend_from_slice(&m.board_id.to_be_bytes());
    write_padded_string(&mut buf, &m.name, BOARD_NAME_LEN, "name")?;
    write_padded_string(&mut buf, &m.board_type, BOARD_TYPE_LEN, "board_type")?;
    Ok(buf)
}

pub fn decode_registration_request(p: &[u8]) -> Result<RegistrationRequest, ProtocolError> {
    check_header(p, PROTOCOL_VERSION, REGISTRATION_REQUEST_LEN)?;
    let board_id = read_u32(p, 1)?;
    let name = read_padded_string(p, 5, BOARD_NAME_LEN, "name")?;
    let board_type = read_padded_string(p, 5 + BOARD_NAME_LEN, BOARD_TYPE_LEN, "board_type")?;
    Ok(RegistrationRequest {
        board_id,
        name,
        board_type,
    })
}

pub fn encode_registration_response(m: &RegistrationResponse) -> Result<Vec<u8>, ProtocolError> {
    let msg = m.message.as_bytes();
    let msg_len = u8::try_from(msg.len()).map_err(|_| {
        ProtocolError::invalid("message", format!("{} bytes exceeds 255", msg.len()))
    })?;
    let mut buf = Vec::with_capacity(REGISTRATION_RESPONSE_MIN_LEN + msg.len());
    buf.push(PROTOCOL_VERSION);
    buf.push(u8::from(m.success));
    buf.push(msg_len);
    buf.extend_from_slice(msg);
    Ok(buf)
}

pub fn decode_registration_response(p: &[u8]) -> Result<RegistrationResponse, ProtocolError> {
    check_header(p, PROTOCOL_VERSION, REGISTRATION_RESPONSE_MIN_LEN)?;
    let success = p[1] != 0;
    let msg_len = usize::from(p[2]);
    let start = REGISTRATION_RESPONSE_MIN_LEN;
    require_len(p, start + msg_len)?;
    let message = std::str::from_utf8(&p[start..start + msg_len])
        .map_err(|e| ProtocolError::invalid("message", format!("invalid UTF-8: {e}")))?
        .to_string();
    Ok(RegistrationResponse { success, message })
}

// ── Power data ────────────────────────────────────────────────────────────────

pub fn encode_power_data(m: &PowerData) -> Result<Vec<u8>, ProtocolError> {
    let generation = power_slot(m.generation, "generation")?;
    let consumption = power_slot(m.consumption, "consumption")?;
    let mut flags = 0u8;
    if m.generation.is_some() {
        flags |= power_flags::HAS_GENERATION;
    }
    if m.consumption.is_some() {
        flags |= power_flags::HAS_CONSUMPTION;
    }

    let mut buf = Vec::with_capacity(POWER_DATA_LEN);
    buf.push(PROTOCOL_VERSION);
    buf.extend_from_slice(&m.board_id.to_be_bytes());
    buf.extend_from_slice(&m.timestamp.to_be_bytes());
    buf.extend_from_slice(&generation.to_be_bytes());
    buf.extend_from_slice(&consumption.to_be_bytes());
    buf.push(flags);
    Ok(buf)
}

/// Decodes the current PowerData layout.
///
/// Presence is taken from the flags byte only; the value slot of an absent
/// field is ignored whatever it contains.
pub fn decode_power_data(p: &[u8]) -> Result<PowerData, ProtocolError> {
    check_header(p, PROTOCOL_VERSION, POWER_DATA_LEN)?;
    let board_id = read_u32(p, 1)?;
    let timestamp = read_u64(p, 5)?;
    let generation = read_i32(p, 13)?;
    let consumption = read_i32(p, 17)?;
    let flags = p[21];
    Ok(PowerData {
        board_id,
        timestamp,
        generation: (flags & power_flags::HAS_GENERATION != 0).then_some(generation),
        consumption: (flags & power_flags::HAS_CONSUMPTION != 0).then_some(consumption),
    })
}

/// Encodes the legacy sentinel-only layout, used by firmware simulators.
pub fn encode_power_data_legacy(m: &PowerData) -> Result<Vec<u8>, ProtocolError> {
    let generation = power_slot(m.generation, "generation")?;
    let consumption = power_slot(m.consumption, "consumption")?;
    let mut buf = Vec::with_capacity(LEGACY_POWER_DATA_LEN);
    buf.push(LEGACY_PROTOCOL_VERSION);
    buf.extend_from_slice(&m.board_id.to_be_bytes());
    buf.extend_from_slice(&m.timestamp.to_be_bytes());
    buf.extend_from_slice(&generation.to_be_bytes());
    buf.extend_from_slice(&consumption.to_be_bytes());
    Ok(buf)
}

/// Decodes the legacy layout, where [`ABSENT_POWER`] marks a missing value.
pub fn decode_power_data_legacy(p: &[u8]) -> Result<PowerData, ProtocolError> {
    check_header(p, LEGACY_PROTOCOL_VERSION, LEGACY_POWER_DATA_LEN)?;
    let board_id = read_u32(p, 1)?;
    let timestamp = read_u64(p, 5)?;
    let generation = read_i32(p, 13)?;
    let consumption = read_i32(p, 17)?;
    Ok(PowerData {
        board_id,
        timestamp,
        generation: (generation != ABSENT_POWER).then_some(generation),
        consumption: (consumption != ABSENT_POWER).then_some(consumption),
    })
}

/// Decodes PowerData of either firmware generation, dispatching on the
/// version byte.
pub fn decode_power_data_compat(p: &[u8]) -> Result<PowerData, ProtocolError> {
    match p.first() {
        None => Err(ProtocolError::TruncatedMessage {
            expected: LEGACY_POWER_DATA_LEN,
            actual: 0,
        }),
        Some(&PROTOCOL_VERSION) => decode_power_data(p),
        Some(&LEGACY_PROTOCOL_VERSION) => decode_power_data_legacy(p),
        Some(&other) => Err(ProtocolError::UnsupportedVersion(other)),
    }
}

// ── Poll ──────────────────────────────────────────────────────────────────────

pub fn encode_poll_response(m: &PollResponse) -> Vec<u8> {
    let mut flags = 0u8;
    if m.round_is_day {
        flags |= poll_flags::ROUND_IS_DAY;
    }
    if m.game_active {
        flags |= poll_flags::GAME_ACTIVE;
    }
    if m.expecting_data {
        flags |= poll_flags::EXPECTING_DATA;
    }

    let mut buf = Vec::with_capacity(POLL_RESPONSE_LEN);
    buf.push(PROTOCOL_VERSION);
    buf.extend_from_slice(&m.timestamp.to_be_bytes());
    buf.extend_from_slice(&m.round.to_be_bytes());
    buf.extend_from_slice(&m.score.to_be_bytes());
    buf.extend_from_slice(&m.generation.to_be_bytes());
    buf.extend_from_slice(&m.consumption.to_be_bytes());
    buf.extend_from_slice(&m.building_table_version.to_be_bytes());
    buf.push(flags);
    buf
}

pub fn decode_poll_response(p: &[u8]) -> Result<PollResponse, ProtocolError> {
    check_header(p, PROTOCOL_VERSION, POLL_RESPONSE_LEN)?;
    let flags = p[31];
    Ok(PollResponse {
        timestamp: read_u64(p, 1)?,
        round: read_u16(p, 9)?,
        score: read_u32(p, 11)?,
        generation: read_i32(p, 15)?,
        consumption: read_i32(p, 19)?,
        building_table_version: read_u64(p, 23)?,
        round_is_day: flags & poll_flags::ROUND_IS_DAY != 0,
        game_active: flags & poll_flags::GAME_ACTIVE != 0,
        expecting_data: flags & poll_flags::EXPECTING_DATA != 0,
    })
}

// ── Building table ────────────────────────────────────────────────────────────

pub fn encode_building_table_request(m: &BuildingTableRequest) -> Vec<u8> {
    let mut buf = Vec::with_capacity(BUILDING_TABLE_REQUEST_LEN);
    buf.push(PROTOCOL_VERSION);
    buf.extend_from_slice(&m.board_id.to_be_bytes());
    buf
}

pub fn decode_building_table_request(p: &[u8]) -> Result<BuildingTableRequest, ProtocolError> {
    check_header(p, PROTOCOL_VERSION, BUILDING_TABLE_REQUEST_LEN)?;
    Ok(BuildingTableRequest {
        board_id: read_u32(p, 1)?,
    })
}

pub fn encode_building_table(m: &BuildingTable) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(BUILDING_TABLE_MIN_LEN + m.entries.len() * 5);
    buf.push(PROTOCOL_VERSION);
    buf.extend_from_slice(&m.table_version.to_be_bytes());
    write_u8_table(&mut buf, &m.entries, "building_table")?;
    Ok(buf)
}

pub fn decode_building_table(p: &[u8]) -> Result<BuildingTable, ProtocolError> {
    check_header(p, PROTOCOL_VERSION, BUILDING_TABLE_MIN_LEN)?;
    let table_version = read_u64(p, 1)?;
    let (entries, _) = read_u8_table(p, 9, "building_table")?;
    Ok(BuildingTable {
        table_version,
        entries,
    })
}

// ── Coefficients and ranges ───────────────────────────────────────────────────

pub fn encode_coefficients_response(m: &CoefficientsResponse) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(2 + (m.production.len() + m.consumption.len()) * 5);
    write_u8_table(&mut buf, &m.production, "production")?;
    write_u8_table(&mut buf, &m.consumption, "consumption")?;
    Ok(buf)
}

pub fn decode_coefficients_response(p: &[u8]) -> Result<CoefficientsResponse, ProtocolError> {
    require_len(p, MessageKind::CoefficientsResponse.min_len())?;
    let (production, cons_offset) = read_u8_table(p, 0, "production")?;
    let (consumption, _) = read_u8_table(p, cons_offset, "consumption")?;
    Ok(CoefficientsResponse {
        production,
        consumption,
    })
}

pub fn encode_production_ranges(m: &ProductionRanges) -> Result<Vec<u8>, ProtocolError> {
    let count = table_count(m.ranges.len(), "ranges")?;
    let mut buf = Vec::with_capacity(1 + m.ranges.len() * 12);
    buf.push(count);
    for (source_id, range) in &m.ranges {
        check_range(*source_id, range)?;
        buf.extend_from_slice(&source_id.to_be_bytes());
        buf.extend_from_slice(&range.min.to_be_bytes());
        buf.extend_from_slice(&range.max.to_be_bytes());
    }
    Ok(buf)
}

pub fn decode_production_ranges(p: &[u8]) -> Result<ProductionRanges, ProtocolError> {
    const ENTRY_SIZE: usize = 12;
    require_len(p, 1)?;
    let count = usize::from(p[0]);
    require_len(p, 1 + count * ENTRY_SIZE)?;
    let mut ranges = BTreeMap::new();
    let mut off = 1;
    for _ in 0..count {
        let source_id = read_u32(p, off)?;
        let range = PowerRange {
            min: read_i32(p, off + 4)?,
            max: read_i32(p, off + 8)?,
        };
        check_range(source_id, &range)?;
        if ranges.insert(source_id, range).is_some() {
            return Err(ProtocolError::invalid(
                "ranges",
                format!("duplicate source id {source_id}"),
            ));
        }
        off += ENTRY_SIZE;
    }
    Ok(ProductionRanges { ranges })
}

// ── Power values with buildings ───────────────────────────────────────────────

pub fn encode_power_values(m: &PowerValues) -> Result<Vec<u8>, ProtocolError> {
    let mut buf = Vec::with_capacity(POWER_VALUES_MIN_LEN);
    buf.extend_from_slice(&m.production.to_be_bytes());
    buf.extend_from_slice(&m.consumption.to_be_bytes());
    if let Some(buildings) = &m.buildings {
        buf.push(table_count(buildings.len(), "buildings")?);
        for building in buildings {
            buf.extend_from_slice(&building.uid.to_be_bytes());
            buf.push(building.building_type);
        }
    }
    Ok(buf)
}

/// Decodes a PowerValues report.
///
/// Under [`BuildingListPolicy::Required`] anything shorter than 9 bytes,
/// including the legacy 8-byte form, is a [`ProtocolError::TruncatedMessage`].
/// Under [`BuildingListPolicy::Optional`] exactly 8 bytes decode to a report
/// with `buildings == None`.
pub fn decode_power_values(
    p: &[u8],
    policy: BuildingListPolicy,
) -> Result<PowerValues, ProtocolError> {
    const ENTRY_SIZE: usize = 5;
    let min_len = match policy {
        BuildingListPolicy::Required => POWER_VALUES_MIN_LEN,
        BuildingListPolicy::Optional => LEGACY_POWER_VALUES_LEN,
    };
    require_len(p, min_len)?;
    let production = read_i32(p, 0)?;
    let consumption = read_i32(p, 4)?;
    if p.len() == LEGACY_POWER_VALUES_LEN {
        return Ok(PowerValues {
            production,
            consumption,
            buildings: None,
        });
    }

    let count = usize::from(p[8]);
    require_len(p, POWER_VALUES_MIN_LEN + count * ENTRY_SIZE)?;
    let mut buildings = Vec::with_capacity(count);
    let mut off = POWER_VALUES_MIN_LEN;
    for _ in 0..count {
        buildings.push(ConnectedBuilding {
            uid: read_u32(p, off)?,
            building_type: p[off + 4],
        });
        off += ENTRY_SIZE;
    }
    Ok(PowerValues {
        production,
        consumption,
        buildings: Some(buildings),
    })
}

// ── Utility helpers ───────────────────────────────────────────────────────────

/// Validates the version byte, then the minimum length.
///
/// An empty buffer has no version byte and reports truncation; any other
/// buffer with the wrong first byte is rejected as a version mismatch
/// whatever its length.
fn check_header(buf: &[u8], version: u8, min_len: usize) -> Result<(), ProtocolError> {
    match buf.first() {
        None => Err(ProtocolError::TruncatedMessage {
            expected: min_len,
            actual: 0,
        }),
        Some(&got) if got != version => Err(ProtocolError::UnsupportedVersion(got)),
        Some(_) => require_len(buf, min_len),
    }
}

fn require_len(buf: &[u8], needed: usize) -> Result<(), ProtocolError> {
    if buf.len() < needed {
        Err(ProtocolError::TruncatedMessage {
            expected: needed,
            actual: buf.len(),
        })
    } else {
        Ok(())
    }
}

fn read_array<const N: usize>(buf: &[u8], offset: usize) -> Result<[u8; N], ProtocolError> {
    buf.get(offset..offset + N)
        .and_then(|s| s.try_into().ok())
        .ok_or(ProtocolError::TruncatedMessage {
            expected: offset + N,
            actual: buf.len(),
        })
}

fn read_u16(buf: &[u8], offset: usize) -> Result<u16, ProtocolError> {
    read_array(buf, offset).map(u16::from_be_bytes)
}

fn read_u32(buf: &[u8], offset: usize) -> Result<u32, ProtocolError> {
    read_array(buf, offset).map(u32::from_be_bytes)
}

fn read_i32(buf: &[u8], offset: usize) -> Result<i32, ProtocolError> {
    read_array(buf, offset).map(i32::from_be_bytes)
}

fn read_u64(buf: &[u8], offset: usize) -> Result<u64, ProtocolError> {
    read_array(buf, offset).map(u64::from_be_bytes)
}

/// Maps an optional power value onto its wire slot, refusing the sentinel
/// as a real reading.
fn power_slot(value: Option<i32>, field: &'static str) -> Result<i32, ProtocolError> {
    match value {
        Some(ABSENT_POWER) => Err(ProtocolError::invalid(
            field,
            "0x7FFFFFFF is reserved for absent values",
        )),
        Some(v) => Ok(v),
        None => Ok(ABSENT_POWER),
    }
}

fn table_count(len: usize, field: &'static str) -> Result<u8, ProtocolError> {
    if len > MAX_TABLE_ENTRIES {
        return Err(ProtocolError::invalid(
            field,
            format!("{len} entries exceeds {MAX_TABLE_ENTRIES}"),
        ));
    }
    Ok(len as u8)
}

fn check_range(source_id: u32, range: &PowerRange) -> Result<(), ProtocolError> {
    if range.min > range.max {
        return Err(ProtocolError::invalid(
            "ranges",
            format!("source {source_id}: min {} > max {}", range.min, range.max),
        ));
    }
    Ok(())
}

/// Writes `count(1)` followed by `[key(1) + value(4)]` entries in key order.
fn write_u8_table(
    buf: &mut Vec<u8>,
    table: &BTreeMap<u8, i32>,
    field: &'static str,
) -> Result<(), ProtocolError> {
    buf.push(table_count(table.len(), field)?);
    for (key, value) in table {
        buf.push(*key);
        buf.extend_from_slice(&value.to_be_bytes());
    }
    Ok(())
}

/// Reads a table written by [`write_u8_table`] starting at `offset`.
/// Returns the table and the offset of the byte after it.
fn read_u8_table(
    buf: &[u8],
    offset: usize,
    field: &'static str,
) -> Result<(BTreeMap<u8, i32>, usize), ProtocolError> {
    const ENTRY_SIZE: usize = 5;
    let count = usize::from(read_array::<1>(buf, offset)?[0]);
    let end = offset + 1 + count * ENTRY_SIZE;
    require_len(buf, end)?;
    let mut table = BTreeMap::new();
    let mut off = offset + 1;
    for _ in 0..count {
        let key = buf[off];
        let value = read_i32(buf, off + 1)?;
        if table.insert(key, value).is_some() {
            return Err(ProtocolError::invalid(field, format!("duplicate id {key}")));
        }
        off += ENTRY_SIZE;
    }
    Ok((table, end))
}

fn write_padded_string(
    buf: &mut Vec<u8>,
    s: &str,
    width: usize,
    field: &'static str,
) -> Result<(), ProtocolError> {
    let bytes = s.as_bytes();
    if bytes.len() > width {
        return Err(ProtocolError::invalid(
            field,
            format!("{} bytes exceeds field width {width}", bytes.len()),
        ));
    }
    if bytes.contains(&0) {
        return Err(ProtocolError::invalid(field, "embedded NUL byte"));
    }
    buf.extend_from_slice(bytes);
    buf.resize(buf.len() + (width - bytes.len()), 0x00);
    Ok(())
}

/// Reads a fixed-width field, keeping everything before the first NUL.
fn read_padded_string(
    buf: &[u8],
    offset: usize,
    width: usize,
    field: &'static str,
) -> Result<String, ProtocolError> {
    require_len(buf, offset + width)?;
    let raw = &buf[offset..offset + width];
    let end = raw.iter().position(|&b| b == 0).unwrap_or(width);
    std::str::from_utf8(&raw[..end])
        .map(str::to_string)
        .map_err(|e| ProtocolError::invalid(field, format!("invalid UTF-8: {e}")))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
