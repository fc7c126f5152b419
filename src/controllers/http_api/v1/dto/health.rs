use indexer_domain::Checkpoint;
use serde::Serialize;

use crate::sync::SyncState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct HealthResponse {
    pub last_indexed_block: u64,
    pub latest_observed_block: u64,
    pub difference: u64,
    pub state: SyncState,
}

impl HealthResponse {
    pub(crate) fn new(checkpoint: Checkpoint, state: SyncState) -> Self {
        Self {
            last_indexed_block: checkpoint.last_indexed_block,
            latest_observed_block: checkpoint.latest_observed_block,
            difference: checkpoint.difference(),
            state,
        }
    }
}
