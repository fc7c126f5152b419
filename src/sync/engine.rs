use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use indexer_blockchain::{ChainReader, EventDecoder, LogFilter};
use indexer_domain::{Checkpoint, LeafRecord, RawEventLog, UnspentRecord};
use indexer_observability as observability;
use indexer_repository::{CheckpointStore, RecordStore};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::{
    config::SyncConfig,
    error::SyncError,
    state::{SyncState, SyncStatus},
};

/// Outcome of one pass through the main loop.
#[derive(Debug, PartialEq, Eq)]
enum Iteration {
    /// Cursor restored from the checkpoint store (or the configured start block).
    Loaded(u64),
    /// A range was checkpointed and persisted; the cursor moves to `next_cursor`.
    Advanced { next_cursor: u64 },
    /// The safe head has not moved past the cursor.
    Idle,
    /// Shutdown was requested before fetching.
    Cancelled,
}

#[derive(Default)]
struct DecodedBatch {
    leaves: Vec<LeafRecord>,
    unspents: Vec<UnspentRecord>,
    failures: usize,
}

/// Drives range computation, fetching, checkpointing and persistence.
pub struct SyncEngine {
    config: SyncConfig,
    reader: Arc<dyn ChainReader>,
    decoder: Arc<EventDecoder>,
    checkpoints: Arc<dyn CheckpointStore>,
    records: Arc<dyn RecordStore>,
    filter: LogFilter,
    status: watch::Sender<SyncStatus>,
}

impl SyncEngine {
    pub fn new(
        config: SyncConfig,
        reader: Arc<dyn ChainReader>,
        decoder: Arc<EventDecoder>,
        checkpoints: Arc<dyn CheckpointStore>,
        records: Arc<dyn RecordStore>,
        filter: LogFilter,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        Self {
            config,
            reader,
            decoder,
            checkpoints,
            records,
            filter,
            status,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        *self.status.borrow()
    }

    /// Run until cancelled or until `max_consecutive_failures` iterations in a
    /// row have failed. The reader is closed on every exit path.
    pub async fn run(&self, shutdown: CancellationToken) -> Result<(), SyncError> {
        tracing::info!(
            start_block = self.config.start_block,
            max_blocks_per_batch = self.config.max_blocks_per_batch,
            block_difference = self.config.block_difference,
            "Sync engine starting"
        );

        let result = self.run_loop(&shutdown).await;

        self.reader.close().await;
        self.set_state(SyncState::Stopped);

        match &result {
            Ok(()) => tracing::info!("Sync engine stopped"),
            Err(error) => tracing::error!(error = %error, "Sync engine stopped with fatal error"),
        }
        result
    }

    async fn run_loop(&self, shutdown: &CancellationToken) -> Result<(), SyncError> {
        let mut cursor: Option<u64> = None;
        let mut failures: u32 = 0;

        loop {
            if shutdown.is_cancelled() {
                return Ok(());
            }

            let started = Instant::now();
            let outcome = match cursor {
                None => self.load_cursor().await,
                Some(from_block) => self.sync_once(from_block, shutdown).await,
            };

            match outcome {
                Ok(iteration) => {
                    if failures > 0 {
                        tracing::info!(failures, "Sync recovered");
                        failures = 0;
                        self.set_failures(failures);
                    }

                    match iteration {
                        Iteration::Loaded(from_block) | Iteration::Advanced { next_cursor: from_block } => {
                            cursor = Some(from_block);
                        }
                        Iteration::Idle => {
                            self.set_state(SyncState::IdleWait);
                            if !sleep_or_cancel(self.config.poll_delay(), shutdown).await {
                                return Ok(());
                            }
                        }
                        Iteration::Cancelled => return Ok(()),
                    }
                }
                Err(error) => {
                    failures = failures.saturating_add(1);
                    self.set_failures(failures);
                    observability::record_sync_iteration(
                        "failure",
                        started.elapsed(),
                        0,
                        0,
                        0,
                        0,
                        0,
                    );

                    if failures >= self.config.max_consecutive_failures {
                        return Err(SyncError::FatalSyncFailure {
                            failures,
                            last_error: error.to_string(),
                        });
                    }

                    let backoff = self.config.error_backoff();
                    tracing::warn!(
                        error = %error,
                        failures,
                        max_failures = self.config.max_consecutive_failures,
                        backoff_ms = backoff.as_millis() as u64,
                        cursor = ?cursor,
                        "Sync iteration failed; retrying the same range"
                    );

                    self.set_state(SyncState::ErrorBackoff);
                    if !sleep_or_cancel(backoff, shutdown).await {
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn load_cursor(&self) -> Result<Iteration, SyncError> {
        self.set_state(SyncState::Initializing);

        let cursor = match self.checkpoints.get_checkpoint().await? {
            Some(checkpoint) => {
                tracing::info!(
                    last_indexed_block = checkpoint.last_indexed_block,
                    latest_observed_block = checkpoint.latest_observed_block,
                    "Resuming from checkpoint"
                );
                self.publish_checkpoint(checkpoint);
                checkpoint.last_indexed_block
            }
            None => {
                tracing::info!(
                    start_block = self.config.start_block,
                    "No checkpoint found; starting from configured block"
                );
                self.config.start_block
            }
        };

        Ok(Iteration::Loaded(cursor))
    }

    #[tracing::instrument(
        name = "sync.iteration",
        skip(self, shutdown),
        fields(
            to_block = tracing::field::Empty,
            height = tracing::field::Empty,
        )
    )]
    async fn sync_once(
        &self,
        from_block: u64,
        shutdown: &CancellationToken,
    ) -> Result<Iteration, SyncError> {
        let started = Instant::now();

        self.set_state(SyncState::Connecting);
        if !self.reader.is_connected().await {
            self.reader.connect().await?;
        }
        let height = self.reader.current_height().await?;
        tracing::Span::current().record("height", height);

        let safe_head = height.saturating_sub(self.config.block_difference);
        if safe_head <= from_block {
            tracing::debug!(safe_head, "Caught up with the safe head");
            return Ok(Iteration::Idle);
        }

        let to_block = from_block
            .saturating_add(self.config.max_blocks_per_batch)
            .min(safe_head);
        tracing::Span::current().record("to_block", to_block);
        self.set_state(SyncState::RangeComputed);

        if shutdown.is_cancelled() {
            return Ok(Iteration::Cancelled);
        }

        self.set_state(SyncState::Fetching);
        let logs = self.reader.get_logs(from_block, to_block, &self.filter).await?;

        self.set_state(SyncState::Decoding);
        let batch = self.decode_logs(&logs);

        self.set_state(SyncState::Checkpointing);
        let next_cursor = to_block + 1;
        let checkpoint = self.checkpoints.set_checkpoint(next_cursor, height).await?;
        self.publish_checkpoint(checkpoint);

        self.set_state(SyncState::Persisting);
        self.records.insert_leaves(&batch.leaves).await?;
        self.records.insert_unspents(&batch.unspents).await?;

        observability::record_sync_iteration(
            "success",
            started.elapsed(),
            to_block - from_block + 1,
            logs.len(),
            batch.leaves.len(),
            batch.unspents.len(),
            batch.failures,
        );
        tracing::info!(
            logs = logs.len(),
            leaves = batch.leaves.len(),
            unspents = batch.unspents.len(),
            decode_failures = batch.failures,
            next_cursor,
            "Indexed block range"
        );

        Ok(Iteration::Advanced { next_cursor })
    }

    fn decode_logs(&self, logs: &[RawEventLog]) -> DecodedBatch {
        let mut batch = DecodedBatch::default();
        for log in logs {
            match self.decoder.decode(log) {
                Ok(Some(event)) => {
                    batch.leaves.push(event.leaf);
                    batch.unspents.push(event.unspent);
                }
                Ok(None) => {}
                Err(error) => {
                    batch.failures += 1;
                    tracing::warn!(error = %error, "Skipping undecodable log");
                }
            }
        }
        batch
    }

    fn set_state(&self, state: SyncState) {
        observability::record_sync_state(state.as_str());
        self.status.send_modify(|status| status.state = state);
    }

    fn set_failures(&self, failures: u32) {
        observability::record_sync_consecutive_failures(failures);
        self.status
            .send_modify(|status| status.consecutive_failures = failures);
    }

    fn publish_checkpoint(&self, checkpoint: Checkpoint) {
        observability::record_sync_checkpoint(
            checkpoint.last_indexed_block,
            checkpoint.latest_observed_block,
        );
        self.status
            .send_modify(|status| status.checkpoint = Some(checkpoint));
    }
}

/// Returns `false` when shutdown fired before the delay elapsed.
async fn sleep_or_cancel(delay: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown.cancelled() => {
            tracing::info!("Sync engine shutting down");
            false
        }
    }
}
