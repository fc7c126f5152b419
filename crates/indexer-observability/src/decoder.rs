use metrics::counter;

pub fn record_decoded_event(kind: &str) {
    counter!(
        "indexer_decoder_events_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

pub fn record_decode_failure(kind: &str) {
    counter!(
        "indexer_decoder_failures_total",
        "kind" => kind.to_string()
    )
    .increment(1);
}

pub fn record_decode_cache_lookup(hit: bool) {
    counter!(
        "indexer_decoder_cache_lookups_total",
        "result" => if hit { "hit" } else { "miss" }
    )
    .increment(1);
}
