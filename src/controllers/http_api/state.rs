use std::sync::Arc;

use indexer_domain::Checkpoint;
use indexer_repository::{CheckpointStore, RecordStore, error::Result};
use tokio::sync::watch;

use crate::sync::SyncStatus;

/// Read-only handles shared by every HTTP handler.
#[derive(Clone)]
pub struct HttpApiState {
    records: Arc<dyn RecordStore>,
    checkpoints: Arc<dyn CheckpointStore>,
    status: watch::Receiver<SyncStatus>,
}

impl HttpApiState {
    pub fn new(
        records: Arc<dyn RecordStore>,
        checkpoints: Arc<dyn CheckpointStore>,
        status: watch::Receiver<SyncStatus>,
    ) -> Self {
        Self {
            records,
            checkpoints,
            status,
        }
    }

    pub(crate) fn records(&self) -> &dyn RecordStore {
        self.records.as_ref()
    }

    pub(crate) fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Checkpoint published by the engine, falling back to the store while the
    /// engine has not loaded one yet.
    pub(crate) async fn checkpoint(&self) -> Result<Option<Checkpoint>> {
        match self.status().checkpoint {
            Some(checkpoint) => Ok(Some(checkpoint)),
            None => self.checkpoints.get_checkpoint().await,
        }
    }
}
