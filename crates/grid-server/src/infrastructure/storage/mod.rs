//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration from the
//! platform-appropriate directory (or the path in `GRID_GAME_CONFIG`),
//! writes it back when asked, and falls back to defaults when no file
//! exists yet.

pub mod config;
