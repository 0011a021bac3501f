//! Service lifecycle.
//!
//! The embedding process owns configuration and collaborator construction;
//! this module owns wiring. [`start`] seeds the roster, spawns the refresh
//! scheduler and the query server against one shared store, and hands back
//! a [`ServiceHandle`] whose [`stop`](ServiceHandle::stop) tears both down
//! through the shared stop signal.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::downstream;
use crate::ingest::{Ingestor, SourceProbe};
use crate::roster;
use crate::scheduler;
use crate::store::RecordStore;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the query server listens on.
    pub bind_addr: SocketAddr,
    /// Pause between refresh sweeps.
    pub sweep_interval: Duration,
    /// Pause between query-server bind attempts.
    pub retry_interval: Duration,
    /// Directory holding `whitelist.json`.
    pub whitelist_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([127, 0, 0, 1], 8765).into(),
            sweep_interval: Duration::from_millis(1000),
            retry_interval: Duration::from_millis(1000),
            whitelist_dir: PathBuf::from("."),
        }
    }
}

/// Handle to a running bridge. Dropping it without calling `stop` leaves
/// both loops running for the lifetime of the runtime.
pub struct ServiceHandle {
    shutdown: broadcast::Sender<()>,
    scheduler: JoinHandle<()>,
    server: JoinHandle<()>,
}

/// Wires the store, scheduler and query server together and starts both
/// loops. A missing or unreadable roster is a warning, not a failure: the
/// bridge starts empty and fills up on later roster loads.
pub async fn start(
    config: ServiceConfig,
    store: RecordStore,
    ingestor: Arc<dyn Ingestor>,
    probe: Arc<dyn SourceProbe>,
) -> ServiceHandle {
    if let Err(err) = roster::load_into_store(&config.whitelist_dir, &store).await {
        log::warn!("Failed to load player roster: {}", err);
    }

    let (shutdown_tx, _) = broadcast::channel(1);

    let scheduler = tokio::spawn(scheduler::run(
        config.sweep_interval,
        store.clone(),
        ingestor,
        probe,
        shutdown_tx.subscribe(),
    ));
    let server = tokio::spawn(downstream::run(
        config.bind_addr,
        config.retry_interval,
        store,
        shutdown_tx.clone(),
    ));

    ServiceHandle {
        shutdown: shutdown_tx,
        scheduler,
        server,
    }
}

impl ServiceHandle {
    /// Signals both loops and waits for them to finish. In-flight sweeps
    /// complete; open query connections are closed abruptly.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = tokio::try_join!(self.scheduler, self.server);
    }
}
