//! # grid-core
//!
//! Shared library for the energy-grid classroom game: the binary protocol
//! spoken by the team boards and the round/board state machine that
//! consumes it.
//!
//! It has no dependencies on network sockets, HTTP frameworks or storage.
//!
//! # Architecture overview (for beginners)
//!
//! Each team in a classroom builds a small power grid on a microcontroller
//! board: power plants on one side, buildings that consume power on the
//! other.  The boards report what they produce and consume; a lecturer walks
//! the class through a script of day and night rounds with changing weather
//! and scores how well each team balances its grid.
//!
//! - **`protocol`** – Fixed-layout binary messages exchanged with boards,
//!   with a version byte up front and big-endian integers throughout.  Power
//!   values travel as fixed-point integers (centiwatts or milliwatts).
//!
//! - **`domain`** – Rounds, scripts, board telemetry and history, scoring,
//!   and the per-group game state guarded behind one lock per group.

pub mod domain;
pub mod protocol;

// Re-export the most-used types at the crate root so callers can write
// `grid_core::GroupGameState` instead of `grid_core::domain::group::GroupGameState`.
pub use domain::board::{BoardId, BoardState, CONNECTION_TIMEOUT};
pub use domain::catalog::ScriptCatalog;
pub use domain::clock::{Clock, SystemClock};
pub use domain::group::{AdvanceOutcome, ConnectionSummary, GameError, GroupGameState};
pub use domain::manager::{lock_group, GroupGameManager, GroupHandle};
pub use domain::round::{Round, RoundType};
pub use domain::script::Script;
pub use protocol::codec::{decode_message, encode_message, ProtocolError};
pub use protocol::messages::BoardMessage;
