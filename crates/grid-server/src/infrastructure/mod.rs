//! Infrastructure layer for the game server.
//!
//! Contains file-system storage for the configuration and the shared state
//! the binary hands to whatever transport serves requests.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `grid_core`, but MUST NOT be imported by the `application` layer.

pub mod app_state;
pub mod storage;
