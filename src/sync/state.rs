use std::fmt;

use indexer_domain::Checkpoint;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncState {
    Initializing,
    Connecting,
    RangeComputed,
    Fetching,
    Decoding,
    Checkpointing,
    Persisting,
    IdleWait,
    ErrorBackoff,
    Stopped,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Initializing => "INITIALIZING",
            SyncState::Connecting => "CONNECTING",
            SyncState::RangeComputed => "RANGE_COMPUTED",
            SyncState::Fetching => "FETCHING",
            SyncState::Decoding => "DECODING",
            SyncState::Checkpointing => "CHECKPOINTING",
            SyncState::Persisting => "PERSISTING",
            SyncState::IdleWait => "IDLE_WAIT",
            SyncState::ErrorBackoff => "ERROR_BACKOFF",
            SyncState::Stopped => "STOPPED",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot published by the engine after every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncStatus {
    pub state: SyncState,
    /// Last checkpoint loaded or written; `None` until one exists.
    pub checkpoint: Option<Checkpoint>,
    pub consecutive_failures: u32,
}

impl Default for SyncStatus {
    fn default() -> Self {
        Self {
            state: SyncState::Initializing,
            checkpoint: None,
            consecutive_failures: 0,
        }
    }
}
