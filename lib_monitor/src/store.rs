//! # Player Record Store
//!
//! The single piece of state shared between the refresh scheduler, the
//! query server's connection tasks and (for the command-driven strategy)
//! the external completion handler. All access goes through one
//! reader/writer lock: snapshot readers run concurrently, writers exclude
//! each other and in-progress snapshots.
//!
//! The lock is only ever held around a single read or write, never across
//! an await point, so a plain `std::sync::RwLock` is the right tool here.
//!
//! Records are created on first reference and never removed during a run.
//! A player that leaves keeps their last known statistics, so history
//! survives disconnects.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::catalog;

/// One tracked player and their statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRecord {
    /// Display name, also the record's key in the store.
    pub name: String,
    /// Stable UUID, distinct from the display name. May be empty until the
    /// roster supplies it.
    pub uuid: String,
    /// Catalog-gated statistic values. Only keys from [`catalog::all`] ever
    /// appear here.
    pub stats: HashMap<&'static str, u64>,
}

impl PlayerRecord {
    fn new(name: &str, uuid: &str) -> Self {
        Self {
            name: name.to_string(),
            uuid: uuid.to_string(),
            stats: HashMap::new(),
        }
    }
}

/// Shared handle to the record table. Cloning is cheap and every clone
/// refers to the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<RwLock<HashMap<String, PlayerRecord>>>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the record for `name` if absent; updates its UUID when one is
    /// given and differs from what is stored. Returns a copy of the record
    /// as it stands after the call.
    pub fn upsert(&self, name: &str, uuid: Option<&str>) -> PlayerRecord {
        let mut records = self.records.write().expect("record store lock poisoned");
        let record = records
            .entry(name.to_string())
            .or_insert_with(|| PlayerRecord::new(name, uuid.unwrap_or_default()));
        if let Some(uuid) = uuid {
            if record.uuid != uuid {
                record.uuid = uuid.to_string();
            }
        }
        record.clone()
    }

    /// Writes one statistic value. Returns `false` without touching the
    /// store when `key` is outside the catalog or `name` was never
    /// upserted; callers are expected to upsert first.
    pub fn set_metric(&self, name: &str, key: &str, value: u64) -> bool {
        let Some(key) = catalog::canonical(key) else {
            log::warn!("Discarding value for unknown statistic key '{}'", key);
            return false;
        };
        let mut records = self.records.write().expect("record store lock poisoned");
        match records.get_mut(name) {
            Some(record) => {
                record.stats.insert(key, value);
                true
            }
            None => {
                log::debug!("No record for player '{}'; dropping {}={}", name, key, value);
                false
            }
        }
    }

    /// Point-in-time copy of the whole table, used to answer one query.
    /// The copy shares nothing mutable with the live map.
    pub fn snapshot(&self) -> HashMap<String, PlayerRecord> {
        self.records.read().expect("record store lock poisoned").clone()
    }

    /// The `(name, uuid)` pairs currently tracked, captured under a single
    /// read lock. The sweep iterates this instead of the live map so
    /// ingestion I/O never happens with the lock held.
    pub fn roster(&self) -> Vec<(String, String)> {
        self.records
            .read()
            .expect("record store lock poisoned")
            .values()
            .map(|r| (r.name.clone(), r.uuid.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("record store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
