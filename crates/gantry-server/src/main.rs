//! `gantryd` – the gantry orchestration daemon.
//!
//! Boot order:
//!
//! 1. Initialise structured logging (`RUST_LOG`, `GANTRY_LOG_FORMAT`).
//! 2. Load and validate the settings file (`GANTRY_SETTINGS`, default
//!    `settings.yaml`); refuse to start on a bad world model.
//! 3. Wire the dispatcher over the store and the mock motion bridge.
//! 4. Spawn the settings-file watcher so external edits apply live.
//! 5. Serve HTTP on `GANTRY_PORT` (default 8000).

use std::net::SocketAddr;
use std::sync::Arc;

use gantry_bridge::MockBridge;
use gantry_runtime::ToolDispatcher;
use gantry_server::{AppState, DEFAULT_PORT, app, init_tracing};
use gantry_store::{ChangeWatcher, ConfigStore};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    init_tracing();

    let settings_path =
        std::env::var("GANTRY_SETTINGS").unwrap_or_else(|_| "settings.yaml".to_string());
    let port = std::env::var("GANTRY_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);

    let store = match ConfigStore::load(&settings_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(path = settings_path, error = %e, "failed to load settings");
            std::process::exit(1);
        }
    };

    let dispatcher = Arc::new(ToolDispatcher::new(
        Arc::clone(&store),
        Arc::new(MockBridge::new()),
    ));

    ChangeWatcher::new(Arc::clone(&store)).spawn();

    let state = AppState { dispatcher, store };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };
    info!(%addr, settings = settings_path, "gantryd listening");

    if let Err(e) = axum::serve(listener, app(state)).await {
        error!(error = %e, "server error");
        std::process::exit(1);
    }
}
