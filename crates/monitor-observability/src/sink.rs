use std::time::Duration;

use metrics::{counter, histogram};

pub fn record_event_dispatch(chain_id: &str, destinations: usize, failed: usize) {
    counter!(
        "monitor_sink_events_total",
        "chain_id" => chain_id.to_string()
    )
    .increment(1);
    if failed > 0 {
        counter!(
            "monitor_sink_partial_dispatch_total",
            "chain_id" => chain_id.to_string()
        )
        .increment(1);
    }
    histogram!("monitor_sink_destinations").record(destinations as f64);
}

pub fn record_destination_delivery(destination: &str, status: &str, duration: Duration) {
    counter!(
        "monitor_destination_deliveries_total",
        "destination" => destination.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "monitor_destination_delivery_duration_seconds",
        "destination" => destination.to_string(),
        "status" => status.to_string()
    )
    .record(duration.as_secs_f64());
}
