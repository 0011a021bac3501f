//! Ingestion strategies.
//!
//! Two interchangeable ways of moving statistics from the game server into
//! the record store: reading the per-player artifacts the server writes to
//! disk ([`stat_files::StatFileIngestor`]), or driving the server's command
//! channel and correlating the asynchronous results
//! ([`command::CommandIngestor`]). The refresh scheduler only sees the
//! [`Ingestor`] trait.

use async_trait::async_trait;

use crate::error::SyncError;

pub mod command;
pub mod stat_files;

pub use command::{CommandChannel, CommandIngestor, CompletionOutcome, CorrelationQueue};
pub use stat_files::StatFileIngestor;

/// One synchronization strategy. `sync_player` covers a single player and
/// must be safe to call again on the next sweep regardless of the outcome.
#[async_trait]
pub trait Ingestor: Send + Sync {
    async fn sync_player(&self, name: &str, uuid: &str) -> Result<(), SyncError>;
}

/// Readiness gate consulted once per sweep. When the source is not ready
/// (server still booting, world not loaded) the whole cycle is skipped;
/// that is not an error.
pub trait SourceProbe: Send + Sync {
    fn is_ready(&self) -> bool;
}

/// Probe for sources that are always available, e.g. on-disk artifacts.
pub struct AlwaysReady;

impl SourceProbe for AlwaysReady {
    fn is_ready(&self) -> bool {
        true
    }
}
