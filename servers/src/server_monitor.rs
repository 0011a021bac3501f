//! # Telemetry Bridge Server
//!
//! Watches a game server's per-player statistics artifacts and serves the
//! gathered numbers to remote consumers over a WebSocket query protocol.
//! The heavy lifting lives in `lib_monitor`; this binary only loads the
//! configuration, sets up logging and owns the process lifecycle.

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;

use lib_monitor::ingest::{AlwaysReady, StatFileIngestor};
use lib_monitor::{service, RecordStore};

mod monitor_logic;
use monitor_logic::{config, logger};

#[tokio::main]
async fn main() -> Result<()> {
    let config = config::load_config();
    logger::setup_logging(&config.log_dir(), &config.log_level())?;

    let service_config = config.service_config()?;
    log::info!(
        "Telemetry bridge starting; world dir: {}, query endpoint: {}",
        config.world_dir().display(),
        service_config.bind_addr
    );

    let store = RecordStore::new();
    let ingestor = Arc::new(StatFileIngestor::new(config.world_dir(), store.clone()));
    let handle = service::start(service_config, store, ingestor, Arc::new(AlwaysReady)).await;

    // Wait for shutdown signal
    tokio::select! {
        _ = signal::ctrl_c() => {
            log::info!("Ctrl-C received, initiating shutdown.");
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut term_signal = signal::unix::signal(signal::unix::SignalKind::terminate())
                    .expect("failed to install SIGTERM handler");
                term_signal.recv().await;
                log::info!("SIGTERM received, initiating shutdown.");
            }
            #[cfg(not(unix))]
            {
                // On non-unix platforms, just wait forever.
                std::future::pending::<()>().await;
            }
        } => {}
    }

    handle.stop().await;
    log::info!("Shutdown complete.");
    Ok(())
}
