use std::time::Duration;

use metrics::{counter, gauge, histogram};

pub fn record_chain_poll_cycle(
    chain_id: &str,
    status: &str,
    duration: Duration,
    fetched_logs: usize,
    dispatched_events: usize,
) {
    counter!(
        "monitor_chain_poll_cycles_total",
        "chain_id" => chain_id.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "monitor_chain_poll_cycle_duration_seconds",
        "chain_id" => chain_id.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
    counter!(
        "monitor_chain_logs_fetched_total",
        "chain_id" => chain_id.to_string()
    )
    .increment(fetched_logs as u64);
    counter!(
        "monitor_chain_events_dispatched_total",
        "chain_id" => chain_id.to_string()
    )
    .increment(dispatched_events as u64);
}

pub fn record_chain_cursor(chain_id: &str, block_number: u64) {
    gauge!(
        "monitor_chain_cursor_block",
        "chain_id" => chain_id.to_string()
    )
    .set(block_number as f64);
}

pub fn record_chain_logs_batch(
    chain_id: &str,
    contract: &str,
    status: &str,
    duration: Duration,
    block_span: usize,
    logs: usize,
) {
    counter!(
        "monitor_chain_logs_batches_total",
        "chain_id" => chain_id.to_string(),
        "contract" => contract.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "monitor_chain_logs_batch_duration_seconds",
        "chain_id" => chain_id.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
    histogram!(
        "monitor_chain_logs_batch_block_span",
        "chain_id" => chain_id.to_string()
    )
    .record(block_span as f64);
    histogram!(
        "monitor_chain_logs_batch_size",
        "chain_id" => chain_id.to_string()
    )
    .record(logs as f64);
}
