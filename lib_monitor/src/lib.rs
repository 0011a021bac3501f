//! Core library for the game-server telemetry bridge.
//!
//! Maintains an in-memory table of per-player statistics, refreshed from
//! the game server's data either by scanning its on-disk artifacts or by
//! driving its command channel, and answers snapshot queries from remote
//! consumers over a WebSocket protocol with one JSON object per frame.

// Declare the modules to re-export
pub mod catalog;
pub mod downstream;
pub mod error;
pub mod ingest;
pub mod protocol;
pub mod roster;
pub mod scheduler;
pub mod service;
pub mod store;

// Re-export the main entry points
pub use error::SyncError;
pub use ingest::{AlwaysReady, CommandIngestor, Ingestor, SourceProbe, StatFileIngestor};
pub use service::{start, ServiceConfig, ServiceHandle};
pub use store::{PlayerRecord, RecordStore};
