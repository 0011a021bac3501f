//! # Pull-Scan Ingestion
//!
//! Reads the complete statistics artifact the game server keeps per player
//! under `<world>/stats/<uuid>.json` and merges every catalog-known entry
//! into the record store.
//!
//! The artifact nests values by statistic namespace:
//!
//! ```json
//! { "stats": { "minecraft:custom": { "minecraft:deaths": 4, ... }, ... } }
//! ```
//!
//! Namespaces themselves carry no meaning here; only the leaf keys are
//! matched against the catalog. Merging is additive: a key absent from the
//! artifact never erases a previously stored value, so counters only move
//! forward or stay.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use crate::catalog;
use crate::error::SyncError;
use crate::ingest::Ingestor;
use crate::store::RecordStore;

pub struct StatFileIngestor {
    world_dir: PathBuf,
    store: RecordStore,
}

impl StatFileIngestor {
    pub fn new(world_dir: impl Into<PathBuf>, store: RecordStore) -> Self {
        Self {
            world_dir: world_dir.into(),
            store,
        }
    }
}

#[async_trait]
impl Ingestor for StatFileIngestor {
    async fn sync_player(&self, name: &str, uuid: &str) -> Result<(), SyncError> {
        if name.is_empty() || uuid.is_empty() {
            return Err(SyncError::InvalidArgument {
                name: name.to_string(),
                uuid: uuid.to_string(),
            });
        }

        let path = self.world_dir.join("stats").join(format!("{uuid}.json"));
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(_) => return Err(SyncError::SourceUnavailable { path }),
        };
        let doc: Value =
            serde_json::from_str(&raw).map_err(|source| SyncError::Parse { path, source })?;

        let mut applied = 0usize;
        if let Some(namespaces) = doc.get("stats").and_then(Value::as_object) {
            for section in namespaces.values() {
                let Some(section) = section.as_object() else {
                    continue;
                };
                for (key, value) in section {
                    if !catalog::is_known(key) {
                        continue;
                    }
                    let Some(value) = value.as_u64() else {
                        log::warn!(
                            "Discarding non-integer value for '{}' in {}",
                            key,
                            self.world_dir.display()
                        );
                        continue;
                    };
                    if self.store.set_metric(name, key, value) {
                        applied += 1;
                    }
                }
            }
        }
        log::trace!("Synchronized {} statistics for {} ({})", applied, name, uuid);
        Ok(())
    }
}
