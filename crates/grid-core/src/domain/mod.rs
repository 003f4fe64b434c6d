//! Game domain: rounds, scripts, boards and the per-group state machine.
//!
//! Nothing here touches sockets, files or async runtimes.  All operations
//! are in-memory and synchronous; the server crate decides how requests
//! reach them.
//!
//! # How the pieces fit together (for beginners)
//!
//! A lecturer starts a **script** (an ordered list of **rounds**) in a
//! **group**.  Boards belonging to that group report power readings while a
//! round is running.  When the lecturer advances, every board's readings for
//! the outgoing round are written to its history, then the script cursor
//! moves on.  Slides and lectures are rounds too, but they are never scored
//! and never appear in history.

pub mod board;
pub mod catalog;
pub mod clock;
/// Power sources, buildings and weather.
pub mod energy;
pub mod group;
pub mod manager;
pub mod round;
pub mod scenarios;
pub mod scoring;
pub mod script;
