use std::time::Duration;

use metrics::{counter, histogram};

pub fn record_rpc_call(operation: &str, status: &str, attempts: usize, duration: Duration) {
    counter!(
        "indexer_rpc_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "indexer_rpc_duration_seconds",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
    histogram!(
        "indexer_rpc_attempts",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .record(attempts as f64);
}

pub fn record_rpc_retry(operation: &str) {
    counter!(
        "indexer_rpc_retries_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

pub fn record_rpc_rate_limit_wait(duration: Duration) {
    counter!("indexer_rpc_rate_limit_waits_total").increment(1);
    histogram!("indexer_rpc_rate_limit_wait_seconds").record(duration.as_secs_f64());
}

pub fn record_rpc_endpoint_switch(switched: bool) {
    counter!(
        "indexer_rpc_endpoint_switch_total",
        "switched" => switched.to_string()
    )
    .increment(1);
}

pub fn record_event_logs_batch(status: &str, duration: Duration, block_span: u64, logs: usize) {
    counter!(
        "indexer_event_logs_batch_total",
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "indexer_event_logs_batch_duration_seconds",
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
    histogram!(
        "indexer_event_logs_batch_blocks",
        "status" => status.to_string()
    )
    .record(block_span as f64);
    histogram!(
        "indexer_event_logs_batch_events",
        "status" => status.to_string()
    )
    .record(logs as f64);
}
