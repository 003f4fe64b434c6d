//! Shared state handed to whatever transport serves board and lecturer
//! requests.

use std::sync::Arc;

use tracing::{info, warn};

use grid_core::{lock_group, BoardId, Clock, GroupGameManager, ScriptCatalog, SystemClock};

use crate::application::board_gateway::BoardGateway;
use crate::application::lecturer_control::LecturerControl;
use crate::infrastructure::storage::config::ServerConfig;

/// Wrapped in `Arc<>` and cloned into every request handler.
pub struct AppState {
    pub config: ServerConfig,
    pub manager: Arc<GroupGameManager>,
    pub gateway: BoardGateway,
    pub lecturer: LecturerControl,
}

impl AppState {
    /// Builds the state with the built-in scenarios and the system clock.
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Self::with_clock(
            config,
            ScriptCatalog::with_builtin_scenarios(),
            Arc::new(SystemClock),
        )
    }

    /// Builds the state and pre-creates every configured group with its
    /// configured boards, so lecturers see them before the first report.
    pub fn with_clock(config: ServerConfig, catalog: ScriptCatalog, clock: Arc<dyn Clock>) -> Arc<Self> {
        if !catalog.contains(&config.server.default_scenario) {
            warn!(
                scenario = %config.server.default_scenario,
                "default scenario is not in the catalog"
            );
        }
        let manager = Arc::new(GroupGameManager::with_clock(
            Arc::new(catalog),
            clock,
            config.server.connection_timeout(),
        ));

        for entry in &config.groups {
            let handle = manager.get_or_create(&entry.group_id);
            let mut group = lock_group(&handle);
            for board in &entry.boards {
                group.register_board(
                    BoardId::from(board.board_id.as_str()),
                    board.name.clone(),
                    Some(board.board_type.clone()),
                );
            }
            info!(
                group = %entry.group_id,
                boards = entry.boards.len(),
                "configured group ready"
            );
        }

        Arc::new(Self {
            gateway: BoardGateway::new(Arc::clone(&manager), config.server.building_list_policy()),
            lecturer: LecturerControl::new(Arc::clone(&manager)),
            manager,
            config,
        })
    }
}
