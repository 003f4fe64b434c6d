//! Application layer use cases for the game server.
//!
//! Use cases orchestrate `grid_core` objects to fulfil one caller's goal.
//! They take and return plain bytes or plain values; the transport that
//! carries them (HTTP in the classroom deployment) lives outside this crate.
//!
//! # Sub-modules
//!
//! - **`board_gateway`** – Everything a board does: register, report power,
//!   poll for status, fetch the building table, coefficients and ranges.
//!   Binary in, binary out.
//!
//! - **`lecturer_control`** – Everything the lecturer does: start a
//!   scenario, advance rounds, end the game, spoof readings and override
//!   building consumption.
//!
//! - **`report`** – The end-of-game summary handed to the web front end.

pub mod board_gateway;
pub mod lecturer_control;
pub mod report;
