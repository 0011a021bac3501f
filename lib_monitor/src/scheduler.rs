//! # Refresh Scheduler
//!
//! One long-lived loop driving the configured ingestion strategy over the
//! tracked roster. Failures are isolated per player: one bad player is
//! logged and the sweep moves on, so a single missing or corrupt artifact
//! never stalls everyone else's data. A sweep that is already underway when
//! the stop signal fires runs to completion before the loop exits.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::ingest::{Ingestor, SourceProbe};
use crate::store::RecordStore;

pub async fn run(
    interval: Duration,
    store: RecordStore,
    ingestor: Arc<dyn Ingestor>,
    probe: Arc<dyn SourceProbe>,
    mut shutdown: broadcast::Receiver<()>,
) {
    log::info!("Refresh scheduler started (interval: {:?})", interval);
    loop {
        if shutdown.try_recv().is_ok() {
            break;
        }

        if probe.is_ready() {
            sweep(&store, ingestor.as_ref()).await;
        } else {
            // Not an error: the source simply has nothing for us yet.
            log::debug!("Statistics source not ready; skipping this cycle");
        }

        tokio::select! {
            _ = shutdown.recv() => break,
            _ = sleep(interval) => {}
        }
    }
    log::info!("Refresh scheduler stopped.");
}

/// One pass over the current roster.
pub async fn sweep(store: &RecordStore, ingestor: &dyn Ingestor) {
    for (name, uuid) in store.roster() {
        if let Err(err) = ingestor.sync_player(&name, &uuid).await {
            log::warn!("Failed to synchronize player data for {} ({}): {}", name, uuid, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Succeeds for everyone except the player it is told to fail for.
    struct FlakyIngestor {
        fail_for: &'static str,
        synced: Mutex<Vec<String>>,
    }

    impl FlakyIngestor {
        fn new(fail_for: &'static str) -> Self {
            Self {
                fail_for,
                synced: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Ingestor for FlakyIngestor {
        async fn sync_player(&self, name: &str, uuid: &str) -> Result<(), SyncError> {
            if name == self.fail_for {
                return Err(SyncError::SourceUnavailable {
                    path: format!("stats/{uuid}.json").into(),
                });
            }
            self.synced.lock().unwrap().push(name.to_string());
            Ok(())
        }
    }

    struct NeverReady;

    impl SourceProbe for NeverReady {
        fn is_ready(&self) -> bool {
            false
        }
    }

    fn seeded_store() -> RecordStore {
        let store = RecordStore::new();
        store.upsert("Steve", Some("uuid-1"));
        store.upsert("Alex", Some("uuid-2"));
        store.upsert("Herobrine", Some("uuid-3"));
        store
    }

    #[tokio::test]
    async fn test_sweep_isolates_per_player_failures() {
        let store = seeded_store();
        let ingestor = FlakyIngestor::new("Alex");

        sweep(&store, &ingestor).await;

        let mut synced = ingestor.synced.lock().unwrap().clone();
        synced.sort();
        assert_eq!(synced, vec!["Herobrine".to_string(), "Steve".to_string()]);
    }

    #[tokio::test]
    async fn test_not_ready_source_skips_the_cycle() {
        struct PanickyIngestor;

        #[async_trait]
        impl Ingestor for PanickyIngestor {
            async fn sync_player(&self, _: &str, _: &str) -> Result<(), SyncError> {
                panic!("must not be called while the source is not ready");
            }
        }

        let store = seeded_store();
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(run(
            Duration::from_millis(5),
            store,
            Arc::new(PanickyIngestor),
            Arc::new(NeverReady),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(25)).await;
        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_stop_signal_ends_the_loop() {
        struct CountingIngestor {
            called: AtomicBool,
        }

        #[async_trait]
        impl Ingestor for CountingIngestor {
            async fn sync_player(&self, _: &str, _: &str) -> Result<(), SyncError> {
                self.called.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let store = seeded_store();
        let ingestor = Arc::new(CountingIngestor {
            called: AtomicBool::new(false),
        });
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let ingestor_arc: Arc<dyn Ingestor> = ingestor.clone();
        let handle = tokio::spawn(run(
            Duration::from_millis(5),
            store,
            ingestor_arc,
            Arc::new(crate::ingest::AlwaysReady),
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(25)).await;
        shutdown_tx.send(()).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("scheduler did not stop")
            .unwrap();
        assert!(ingestor.called.load(Ordering::SeqCst));
    }
}
