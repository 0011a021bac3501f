//! # Request-Correlate Ingestion
//!
//! For servers that expose statistics only through triggered computation,
//! not passive storage: each (player, key) pair becomes one fire-and-forget
//! command on the host's command channel, and the host later reports a
//! generic completion notice of the form
//!
//! ```text
//! <namespaced-command> returned <integer>
//! ```
//!
//! Completions carry no addressing, so they are matched strictly in FIFO
//! order against the oldest outstanding request. When the reported command
//! name does not match the head of the queue, both the notice and the head
//! request are dropped: delivery is at-most-once with no retry. Any
//! reordering or loss on the external channel therefore loses requests
//! silently (beyond a warning log); the next sweep re-issues them.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;

use crate::catalog;
use crate::error::SyncError;
use crate::ingest::Ingestor;
use crate::store::RecordStore;

/// The host's imperative command channel. `issue` must not block: requests
/// are fire-and-forget and results arrive through
/// [`CommandIngestor::on_external_completion`].
pub trait CommandChannel: Send + Sync {
    fn issue(&self, player: &str, key: &str);
}

#[derive(Debug)]
struct PendingRequest {
    player: String,
    key: &'static str,
    issued_at: Instant,
}

/// FIFO queue of outstanding metric-read requests. Enqueued by the sweep,
/// dequeued by the completion handler, possibly on different tasks.
#[derive(Debug, Default)]
pub struct CorrelationQueue {
    inner: Mutex<VecDeque<PendingRequest>>,
}

impl CorrelationQueue {
    fn push(&self, request: PendingRequest) {
        self.inner.lock().expect("correlation queue lock poisoned").push_back(request);
    }

    fn pop(&self) -> Option<PendingRequest> {
        self.inner.lock().expect("correlation queue lock poisoned").pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("correlation queue lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What became of one completion notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Matched the oldest pending request; the value was stored.
    Stored,
    /// Did not match the oldest pending request. Both the notice and that
    /// request are gone.
    UnmatchedDropped,
    /// Arrived with nothing outstanding.
    NoPending,
}

pub struct CommandIngestor<C: CommandChannel> {
    channel: C,
    queue: CorrelationQueue,
    store: RecordStore,
}

impl<C: CommandChannel> CommandIngestor<C> {
    pub fn new(channel: C, store: RecordStore) -> Self {
        Self {
            channel,
            queue: CorrelationQueue::default(),
            store,
        }
    }

    pub fn queue(&self) -> &CorrelationQueue {
        &self.queue
    }

    /// Issues one metric read. Enqueues the pending request before touching
    /// the channel so a fast completion can never arrive ahead of its queue
    /// entry. Unknown keys are dropped here, before any command goes out.
    pub fn request_metric(&self, player: &str, key: &str) {
        let Some(key) = catalog::canonical(key) else {
            log::warn!("Refusing to request unknown statistic key '{}'", key);
            return;
        };
        self.queue.push(PendingRequest {
            player: player.to_string(),
            key,
            issued_at: Instant::now(),
        });
        self.channel.issue(player, key);
    }

    /// Handles one completion notice, already parsed into its command name
    /// and value (see [`parse_completion_notice`]).
    pub fn on_external_completion(&self, command: &str, value: u64) -> CompletionOutcome {
        let Some(pending) = self.queue.pop() else {
            log::warn!("Completion for '{}' with no outstanding request", command);
            return CompletionOutcome::NoPending;
        };
        if pending.key == command {
            self.store.set_metric(&pending.player, pending.key, value);
            CompletionOutcome::Stored
        } else {
            log::warn!(
                "Completion '{}' does not match oldest pending request '{}' for {} (issued {:?} ago); request lost",
                command,
                pending.key,
                pending.player,
                pending.issued_at.elapsed()
            );
            CompletionOutcome::UnmatchedDropped
        }
    }
}

#[async_trait]
impl<C: CommandChannel> Ingestor for CommandIngestor<C> {
    /// Fans out one request per catalog key. Returns once everything is
    /// issued; the values land whenever the completions come back.
    async fn sync_player(&self, name: &str, _uuid: &str) -> Result<(), SyncError> {
        if name.is_empty() {
            return Err(SyncError::InvalidArgument {
                name: name.to_string(),
                uuid: _uuid.to_string(),
            });
        }
        for key in catalog::all() {
            self.request_metric(name, key);
        }
        Ok(())
    }
}

/// Splits a raw completion notice `"<namespaced-command> returned <integer>"`
/// into its command name and value. Returns `None` for anything else,
/// including negative or non-numeric values.
pub fn parse_completion_notice(notice: &str) -> Option<(&str, u64)> {
    let (command, value) = notice.rsplit_once(" returned ")?;
    let value = value.trim().parse().ok()?;
    let command = command.trim();
    if command.is_empty() {
        return None;
    }
    Some((command, value))
}
