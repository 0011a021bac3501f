//! Roster loading.
//!
//! The server's whitelist file is the authoritative list of tracked
//! players. Loading it seeds the record store with `(name, uuid)` pairs;
//! re-loading it later picks up roster changes without disturbing the
//! statistics already gathered (upsert semantics).

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::store::RecordStore;

/// One entry of the whitelist file.
#[derive(Debug, Clone, Deserialize)]
pub struct WhitelistEntry {
    pub name: String,
    pub uuid: String,
}

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("whitelist file not readable at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("whitelist file {path} is malformed: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads `whitelist.json` from `dir`.
pub async fn load_whitelist(dir: &Path) -> Result<Vec<WhitelistEntry>, RosterError> {
    let path = dir.join("whitelist.json");
    let display = path.display().to_string();
    let raw = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| RosterError::Read { path: display.clone(), source })?;
    serde_json::from_str(&raw).map_err(|source| RosterError::Parse { path: display, source })
}

/// Loads the whitelist and upserts every entry into `store`. Returns the
/// number of entries loaded. Existing records keep their statistics; only
/// the UUID is refreshed when it changed.
pub async fn load_into_store(dir: &Path, store: &RecordStore) -> Result<usize, RosterError> {
    let entries = load_whitelist(dir).await?;
    for entry in &entries {
        store.upsert(&entry.name, Some(&entry.uuid));
    }
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    log::info!(
        "Loaded {} players from the whitelist file: {}",
        entries.len(),
        names.join(", ")
    );
    Ok(entries.len())
}
