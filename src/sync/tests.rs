use std::{sync::Arc, time::Duration};

use indexer_blockchain::{DecodeCache, DecoderOptions, EventDecoder, LogFilter};
use indexer_domain::{B256, Bytes, Checkpoint, RawEventLog, U256};
use tokio_util::sync::CancellationToken;

use super::*;
use crate::testing::{
    FakeChainReader, Journal, MemoryCheckpointStore, MemoryRecordStore, raw_log, shield_log,
    transfer_log,
};

fn sync_config() -> SyncConfig {
    SyncConfig {
        start_block: 0,
        max_blocks_per_batch: 1000,
        block_difference: 10,
        poll_delay_ms: 5_000,
        max_consecutive_failures: 10,
    }
}

struct Harness {
    reader: Arc<FakeChainReader>,
    checkpoints: Arc<MemoryCheckpointStore>,
    records: Arc<MemoryRecordStore>,
    journal: Journal,
}

impl Harness {
    fn new(height: u64, logs: Vec<RawEventLog>, checkpoint: Option<Checkpoint>) -> Self {
        let journal = Journal::default();
        Self {
            reader: Arc::new(FakeChainReader::new(height, logs, journal.clone())),
            checkpoints: Arc::new(MemoryCheckpointStore::new(checkpoint, journal.clone())),
            records: Arc::new(MemoryRecordStore::new(journal.clone())),
            journal,
        }
    }

    fn engine(&self, config: SyncConfig) -> Arc<SyncEngine> {
        Arc::new(SyncEngine::new(
            config,
            self.reader.clone(),
            Arc::new(EventDecoder::new(
                DecodeCache::new(64, Duration::from_secs(60)),
                DecoderOptions::default(),
            )),
            self.checkpoints.clone(),
            self.records.clone(),
            LogFilter::default(),
        ))
    }
}

/// Runs the engine until `done` holds for its published status, then cancels
/// it and returns the run result.
async fn run_until(
    engine: Arc<SyncEngine>,
    done: impl FnMut(&SyncStatus) -> bool,
) -> Result<(), SyncError> {
    let shutdown = CancellationToken::new();
    let mut status = engine.subscribe();
    let handle = tokio::spawn({
        let engine = engine.clone();
        let shutdown = shutdown.clone();
        async move { engine.run(shutdown).await }
    });

    tokio::time::timeout(Duration::from_secs(600), status.wait_for(done))
        .await
        .expect("engine did not reach the expected status")
        .expect("status channel closed");
    shutdown.cancel();
    handle.await.expect("engine task panicked")
}

fn is_idle(status: &SyncStatus) -> bool {
    status.state == SyncState::IdleWait
}

#[tokio::test(start_paused = true)]
async fn indexes_range_up_to_safe_head_and_advances_checkpoint() {
    let harness = Harness::new(
        150,
        vec![shield_log(120, 0x01, 0), transfer_log(130, 0x02, 1)],
        Some(Checkpoint::new(100, 120)),
    );

    run_until(harness.engine(sync_config()), is_idle)
        .await
        .unwrap();

    assert_eq!(harness.reader.fetched_ranges(), vec![(100, 140)]);
    assert_eq!(harness.checkpoints.current(), Some(Checkpoint::new(141, 150)));

    let leaves = harness.records.leaves();
    assert_eq!(leaves.len(), 2);
    assert_eq!(leaves[0].tree_index, U256::from(0));
    assert_eq!(leaves[1].tree_index, U256::from(1));

    let unspents = harness.records.unspents();
    assert_eq!(unspents.len(), 2);
    assert!(!unspents[0].is_encrypted());
    assert!(unspents[1].is_encrypted());
}

#[tokio::test(start_paused = true)]
async fn stays_idle_when_cursor_reached_safe_head() {
    let harness = Harness::new(150, vec![], Some(Checkpoint::new(141, 150)));

    let engine = harness.engine(sync_config());
    run_until(engine.clone(), is_idle).await.unwrap();

    assert!(harness.reader.fetched_ranges().is_empty());
    assert!(harness.checkpoints.written_cursors().is_empty());
    assert_eq!(engine.status().checkpoint, Some(Checkpoint::new(141, 150)));
}

#[tokio::test(start_paused = true)]
async fn starts_from_configured_block_and_splits_ranges() {
    let harness = Harness::new(
        50,
        vec![shield_log(5, 0x01, 0), shield_log(33, 0x02, 1)],
        None,
    );
    let config = SyncConfig {
        max_blocks_per_batch: 20,
        ..sync_config()
    };

    run_until(harness.engine(config), is_idle).await.unwrap();

    assert_eq!(harness.reader.fetched_ranges(), vec![(0, 20), (21, 40)]);
    assert_eq!(harness.checkpoints.written_cursors(), vec![21, 41]);
    assert_eq!(harness.checkpoints.current(), Some(Checkpoint::new(41, 50)));
    assert_eq!(harness.records.leaves().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn checkpoint_is_written_before_records() {
    let harness = Harness::new(
        150,
        vec![shield_log(120, 0x01, 0), transfer_log(130, 0x02, 1)],
        Some(Checkpoint::new(100, 120)),
    );

    run_until(harness.engine(sync_config()), is_idle)
        .await
        .unwrap();

    assert_eq!(
        harness.journal.entries(),
        vec!["get_logs 100-140", "checkpoint 141", "leaves 2", "unspents 2"]
    );
}

#[tokio::test(start_paused = true)]
async fn restart_after_crash_between_checkpoint_and_persist_does_not_refetch() {
    let harness = Harness::new(
        150,
        vec![shield_log(120, 0x01, 0)],
        Some(Checkpoint::new(100, 120)),
    );
    harness.records.fail_leaf_inserts(usize::MAX);
    let crashing = SyncConfig {
        max_consecutive_failures: 1,
        ..sync_config()
    };

    let result = harness.engine(crashing).run(CancellationToken::new()).await;

    assert!(matches!(
        result,
        Err(SyncError::FatalSyncFailure { failures: 1, .. })
    ));
    assert_eq!(harness.checkpoints.current(), Some(Checkpoint::new(141, 150)));
    assert!(harness.records.leaves().is_empty());

    let restarted = Harness {
        reader: Arc::new(FakeChainReader::new(150, vec![], Journal::default())),
        checkpoints: harness.checkpoints.clone(),
        records: Arc::new(MemoryRecordStore::default()),
        journal: Journal::default(),
    };
    run_until(restarted.engine(sync_config()), is_idle)
        .await
        .unwrap();

    assert!(restarted.reader.fetched_ranges().is_empty());
    assert_eq!(
        restarted.checkpoints.current().map(|c| c.last_indexed_block),
        Some(141)
    );
}

#[tokio::test(start_paused = true)]
async fn retried_range_does_not_duplicate_records() {
    let harness = Harness::new(
        150,
        vec![shield_log(120, 0x01, 0), transfer_log(130, 0x02, 1)],
        Some(Checkpoint::new(100, 120)),
    );
    // Leaves land on the first attempt, unspents only on the retry.
    harness.records.fail_unspent_inserts(1);

    run_until(harness.engine(sync_config()), is_idle)
        .await
        .unwrap();

    assert_eq!(harness.reader.fetched_ranges(), vec![(100, 140), (100, 140)]);
    assert_eq!(harness.checkpoints.written_cursors(), vec![141, 141]);
    assert_eq!(harness.records.leaves().len(), 2);
    assert_eq!(harness.records.unspents().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn stops_with_fatal_error_after_consecutive_failures() {
    let harness = Harness::new(150, vec![], Some(Checkpoint::new(100, 120)));
    harness.reader.fail_height();
    let engine = harness.engine(sync_config());

    let started = tokio::time::Instant::now();
    let result = engine.run(CancellationToken::new()).await;

    match result {
        Err(SyncError::FatalSyncFailure {
            failures,
            last_error,
        }) => {
            assert_eq!(failures, 10);
            assert!(last_error.contains("not connected"), "{last_error}");
        }
        other => panic!("expected fatal failure, got {other:?}"),
    }
    // Nine backoffs of 2 x poll delay separate the ten attempts.
    assert!(started.elapsed() >= Duration::from_secs(90));
    assert_eq!(engine.status().state, SyncState::Stopped);
    assert_eq!(engine.status().consecutive_failures, 10);
    assert!(!harness.reader.connected());
}

#[tokio::test(start_paused = true)]
async fn checkpoint_load_failures_are_retried() {
    let harness = Harness::new(150, vec![], Some(Checkpoint::new(141, 150)));
    harness.checkpoints.fail_loads(2);

    let engine = harness.engine(sync_config());
    run_until(engine.clone(), is_idle).await.unwrap();

    assert_eq!(engine.status().consecutive_failures, 0);
    assert_eq!(engine.status().checkpoint, Some(Checkpoint::new(141, 150)));
}

#[tokio::test(start_paused = true)]
async fn cancellation_stops_engine_and_closes_reader() {
    let harness = Harness::new(150, vec![], Some(Checkpoint::new(141, 150)));
    let engine = harness.engine(sync_config());

    run_until(engine.clone(), is_idle).await.unwrap();

    assert_eq!(engine.status().state, SyncState::Stopped);
    assert!(!harness.reader.connected());
}

#[tokio::test(start_paused = true)]
async fn cancelled_engine_does_not_start() {
    let harness = Harness::new(150, vec![], Some(Checkpoint::new(100, 120)));
    let shutdown = CancellationToken::new();
    shutdown.cancel();

    harness.engine(sync_config()).run(shutdown).await.unwrap();

    assert!(harness.reader.fetched_ranges().is_empty());
    assert!(harness.checkpoints.written_cursors().is_empty());
}

#[tokio::test(start_paused = true)]
async fn undecodable_logs_are_skipped() {
    let good = shield_log(120, 0x01, 0);
    let broken = raw_log(
        125,
        0x02,
        good.topics.clone(),
        Bytes::from_static(&[0xff; 7]),
    );
    let unknown = raw_log(126, 0x03, vec![B256::repeat_byte(0xee)], Bytes::new());
    let harness = Harness::new(
        150,
        vec![good, broken, unknown],
        Some(Checkpoint::new(100, 120)),
    );

    run_until(harness.engine(sync_config()), is_idle)
        .await
        .unwrap();

    assert_eq!(harness.checkpoints.current(), Some(Checkpoint::new(141, 150)));
    assert_eq!(harness.records.leaves().len(), 1);
    assert_eq!(harness.records.leaves()[0].block_number, 120);
}
