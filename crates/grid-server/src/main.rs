//! Energy-grid game server entry point.
//!
//! Loads the configuration, initialises logging and the shared state, then
//! runs until Ctrl-C.  The HTTP transport that carries board and lecturer
//! requests mounts on top of [`AppState`]; this binary keeps the state
//! alive and reports board liveness while it runs.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- GRID_GAME_CONFIG or platform config dir
//!  └─ AppState::new()        -- catalog, group manager, use cases
//!  └─ liveness ticker        -- per-group connection summary (Tokio task)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use grid_server::infrastructure::app_state::AppState;
use grid_server::infrastructure::storage::config::{config_file_path, load_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;

    // Initialise structured logging.  Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    info!("grid game server starting");
    if let Ok(path) = config_file_path() {
        debug!("configuration path: {}", path.display());
    }

    let state = AppState::new(config);
    info!(
        scenarios = ?state.lecturer.scenarios(),
        default = %state.config.server.default_scenario,
        "scenario catalog loaded"
    );

    // ── Liveness ticker ───────────────────────────────────────────────────────
    let ticker_state = Arc::clone(&state);
    let ticker = tokio::spawn(async move {
        let period = ticker_state
            .config
            .server
            .connection_timeout()
            .max(Duration::from_secs(1));
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            for group_id in ticker_state.manager.group_ids() {
                let summary = ticker_state.lecturer.connection_summary(&group_id);
                debug!(
                    group = %group_id,
                    connected = summary.connected.len(),
                    disconnected = summary.disconnected.len(),
                    "connection summary"
                );
            }
        }
    });

    info!("grid game server ready.  Press Ctrl-C to exit.");
    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    ticker.abort();
    info!("grid game server stopped");
    Ok(())
}
