use std::time::Duration;

use metrics::{counter, gauge, histogram};

pub fn record_sync_iteration(
    status: &str,
    duration: Duration,
    block_span: u64,
    fetched_logs: usize,
    leaves: usize,
    unspents: usize,
    decode_failures: usize,
) {
    counter!(
        "indexer_sync_iterations_total",
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "indexer_sync_iteration_duration_seconds",
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
    histogram!("indexer_sync_iteration_blocks").record(block_span as f64);
    histogram!("indexer_sync_iteration_logs").record(fetched_logs as f64);
    counter!("indexer_sync_leaves_total").increment(leaves as u64);
    counter!("indexer_sync_unspents_total").increment(unspents as u64);
    counter!("indexer_sync_decode_failures_total").increment(decode_failures as u64);
}

pub fn record_sync_checkpoint(last_indexed_block: u64, latest_observed_block: u64) {
    gauge!("indexer_sync_last_indexed_block").set(last_indexed_block as f64);
    gauge!("indexer_sync_latest_observed_block").set(latest_observed_block as f64);
    gauge!("indexer_sync_lag_blocks")
        .set(latest_observed_block.saturating_sub(last_indexed_block) as f64);
}

pub fn record_sync_consecutive_failures(failures: u32) {
    gauge!("indexer_sync_consecutive_failures").set(failures as f64);
}

pub fn record_sync_state(state: &str) {
    counter!(
        "indexer_sync_state_transitions_total",
        "state" => state.to_string()
    )
    .increment(1);
}
