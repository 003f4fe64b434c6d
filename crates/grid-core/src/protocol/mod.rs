//! Protocol module containing message types, the binary codec and the
//! fixed-point conversions used to put power values on the wire.

pub mod codec;
pub mod fixed_point;
pub mod messages;

pub use codec::{decode_message, encode_message, ProtocolError};
pub use messages::*;
