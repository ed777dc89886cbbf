//! # BarFlow Track Host
//!
//! Composes the storage, migration, event bus and connectivity tracker into
//! a running process.
//!
//! ## Module Organization
//! ```text
//! barflow_host/
//! ├── lib.rs      ◄─── You are here (logging, startup, shutdown)
//! └── state.rs    ◄─── HostState: the wired-up services
//! ```

pub mod state;

use std::error::Error;

use barflow_sync::BarflowConfig;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub use state::HostState;

/// Runs the host until ctrl-c.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                          Host Startup                                   │
/// │                                                                         │
/// │  1. Initialize Logging ──► EnvFilter, RUST_LOG overrides the default    │
/// │  2. Load Config ─────────► TOML file + BARFLOW_* env, else defaults     │
/// │  3. Open Stores ─────────► legacy/*.json and barflow.db (WAL)           │
/// │  4. Migrate ─────────────► once; failures are logged, startup continues │
/// │  5. Wire Services ───────► EventBus, DomainStore, ConnectivityTracker   │
/// │  6. Wait for ctrl-c, then shut the tracker down and close the pool      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();

    info!("Starting BarFlow Track host");

    let config = BarflowConfig::load_or_default(None);
    let state = HostState::start(&config).await.map_err(|e| {
        error!(error = %e, "Host startup failed");
        e
    })?;

    let status = state.status();
    info!(
        online = status.is_online,
        queue_length = status.queue_length,
        "Host ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("Interrupt received");

    state.shutdown().await?;
    info!("Host stopped");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=barflow_sync=trace` - Show bus dispatch traces
/// - Default: `info,barflow=debug,sqlx=warn`
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,barflow=debug,sqlx=warn"));

    // A subscriber may already be installed when embedded in another binary
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
