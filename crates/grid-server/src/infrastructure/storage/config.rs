//! TOML-based configuration persistence for the game server.
//!
//! The file is looked up at the path in the `GRID_GAME_CONFIG` environment
//! variable, or else in the platform-appropriate config directory:
//! - Windows:  `%APPDATA%\GridGame\config.toml`
//! - Linux:    `~/.config/gridgame/config.toml`
//! - macOS:    `~/Library/Application Support/GridGame/config.toml`
//!
//! Example:
//!
//! ```toml
//! [server]
//! log_level = "debug"
//! connection_timeout_secs = 5
//! require_building_list = true
//! default_scenario = "test"
//!
//! [[groups]]
//! group_id = "class-a"
//! name = "Morning class"
//!
//! [[groups.boards]]
//! board_id = "1"
//! name = "Team Solar"
//! board_type = "esp32"
//! ```
//!
//! # Serde default values
//!
//! Every field carries a serde default, so a missing section or an older
//! file without newer fields still loads.  A missing file loads as
//! [`ServerConfig::default()`].

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use grid_core::protocol::BuildingListPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "GRID_GAME_CONFIG";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level server configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

/// General server behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Seconds after its last report before a board counts as disconnected.
    #[serde(default = "default_connection_timeout_secs")]
    pub connection_timeout_secs: u64,
    /// Reject PowerValues reports that carry no building list.
    #[serde(default = "default_true")]
    pub require_building_list: bool,
    /// Scenario the lecturer UI offers first.
    #[serde(default = "default_scenario")]
    pub default_scenario: String,
}

/// A classroom group known before any board connects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GroupEntry {
    pub group_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub boards: Vec<BoardEntry>,
}

/// A board assigned to a group ahead of time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoardEntry {
    pub board_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default = "default_board_type")]
    pub board_type: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_connection_timeout_secs() -> u64 {
    5
}
fn default_true() -> bool {
    true
}
fn default_scenario() -> String {
    "test".to_string()
}
fn default_board_type() -> String {
    "generic".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            connection_timeout_secs: default_connection_timeout_secs(),
            require_building_list: default_true(),
            default_scenario: default_scenario(),
        }
    }
}

impl ServerSection {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }

    pub fn building_list_policy(&self) -> BuildingListPolicy {
        if self.require_building_list {
            BuildingListPolicy::Required
        } else {
            BuildingListPolicy::Optional
        }
    }
}

impl ServerConfig {
    /// The configured group a board belongs to, if any.
    pub fn group_for_board(&self, board_id: &str) -> Option<&GroupEntry> {
        self.groups
            .iter()
            .find(|g| g.boards.iter().any(|b| b.board_id == board_id))
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if no override is set and
/// the base directory cannot be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    resolve_config_path(std::env::var_os(CONFIG_PATH_ENV))
}

fn resolve_config_path(override_path: Option<OsString>) -> Result<PathBuf, ConfigError> {
    match override_path.filter(|p| !p.is_empty()) {
        Some(path) => Ok(PathBuf::from(path)),
        None => Ok(platform_config_dir()
            .ok_or(ConfigError::NoPlatformConfigDir)?
            .join("config.toml")),
    }
}

/// Loads the config from its resolved path.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<ServerConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `ServerConfig` from `path`, returning the default if the file does
/// not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<ServerConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to its resolved path.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &ServerConfig) -> Result<(), ConfigError> {
    save_config_to(config, &config_file_path()?)
}

/// Writes `config` as pretty TOML, creating the directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &ServerConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory including the `GridGame` subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("GridGame"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("gridgame"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("GridGame")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
