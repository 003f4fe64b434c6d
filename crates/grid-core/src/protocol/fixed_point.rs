//! Conversions between watts and the fixed-point integers used on the wire.
//!
//! Boards have no floating-point unit to spare, so power travels as scaled
//! `i32` values.  Conversion rounds to the nearest unit and refuses values
//! that would not fit: nothing here wraps or saturates.

use crate::protocol::codec::ProtocolError;

const MILLI: f64 = 1000.0;
const CENTI: f64 = 100.0;

/// Watts → milliwatts.
///
/// # Errors
///
/// [`ProtocolError::InvalidFieldRange`] for NaN, infinities, or results
/// outside `i32`.
pub fn watts_to_milliwatts(watts: f64) -> Result<i32, ProtocolError> {
    scale(watts, MILLI, "milliwatts")
}

/// Watts → centiwatts.
///
/// # Errors
///
/// Same as [`watts_to_milliwatts`].
pub fn watts_to_centiwatts(watts: f64) -> Result<i32, ProtocolError> {
    scale(watts, CENTI, "centiwatts")
}

/// Dimensionless coefficient → thousandths, as sent in coefficient tables.
///
/// # Errors
///
/// Same as [`watts_to_milliwatts`].
pub fn coefficient_to_milli(coefficient: f64) -> Result<i32, ProtocolError> {
    scale(coefficient, MILLI, "coefficient")
}

pub fn milliwatts_to_watts(value: i32) -> f64 {
    f64::from(value) / MILLI
}

pub fn centiwatts_to_watts(value: i32) -> f64 {
    f64::from(value) / CENTI
}

pub fn milli_to_coefficient(value: i32) -> f64 {
    f64::from(value) / MILLI
}

fn scale(value: f64, factor: f64, field: &'static str) -> Result<i32, ProtocolError> {
    if !value.is_finite() {
        return Err(ProtocolError::invalid(field, format!("{value} is not finite")));
    }
    let scaled = (value * factor).round();
    if scaled < f64::from(i32::MIN) || scaled > f64::from(i32::MAX) {
        return Err(ProtocolError::invalid(
            field,
            format!("{value} does not fit in a 32-bit fixed-point value"),
        ));
    }
    Ok(scaled as i32)
}
