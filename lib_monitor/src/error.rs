//! Error taxonomy for the ingestion side of the bridge.
//!
//! Every variant here is recoverable by design: the refresh scheduler logs
//! and moves on to the next player, and the failed player is retried on the
//! next sweep. Nothing in this module ever terminates the process.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single player synchronization attempt.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Missing or empty identifiers. Caller error, no I/O was performed.
    #[error("invalid player identifiers (name: {name:?}, uuid: {uuid:?})")]
    InvalidArgument { name: String, uuid: String },

    /// The per-player statistics artifact does not exist (yet). Expected for
    /// players that never joined; retried on the next sweep.
    #[error("statistics source unavailable: {}", path.display())]
    SourceUnavailable { path: PathBuf },

    /// The statistics artifact exists but could not be parsed.
    #[error("malformed statistics artifact {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_identifiers() {
        let err = SyncError::InvalidArgument {
            name: "Steve".to_string(),
            uuid: String::new(),
        };
        let text = err.to_string();
        assert!(text.contains("Steve"));
        assert!(text.contains("invalid player identifiers"));
    }

    #[test]
    fn test_parse_error_carries_source() {
        let bad: serde_json::Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = SyncError::Parse {
            path: PathBuf::from("stats/abc.json"),
            source: bad,
        };
        assert!(std::error::Error::source(&err).is_some());
    }
}
