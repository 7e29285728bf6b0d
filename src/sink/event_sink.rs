use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Instant,
};

use monitor_domain::Event;
use monitor_observability::{record_destination_delivery, record_event_dispatch};

use super::OutputDestination;

/// Collects destinations before any task starts.
#[derive(Default)]
pub(crate) struct EventSinkBuilder {
    destinations: Vec<Arc<dyn OutputDestination>>,
}

impl EventSinkBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Appends a destination. Registering the same destination twice delivers
    /// every event to it twice.
    pub(crate) fn register(&mut self, destination: Arc<dyn OutputDestination>) -> &mut Self {
        tracing::info!(destination = destination.name(), "Registered output destination");
        self.destinations.push(destination);
        self
    }

    pub(crate) fn build(self) -> EventSink {
        EventSink {
            destinations: self.destinations.into(),
            dispatched: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Immutable broadcaster shared by every chain task.
#[derive(Clone)]
pub(crate) struct EventSink {
    destinations: Arc<[Arc<dyn OutputDestination>]>,
    dispatched: Arc<AtomicU64>,
}

impl EventSink {
    /// Delivers `event` to every destination in registration order.
    ///
    /// A failing destination is logged and skipped; it never stops delivery to
    /// the remaining destinations and never reaches the caller.
    pub(crate) async fn dispatch(&self, event: &Event) {
        let mut failed = 0;

        for destination in self.destinations.iter() {
            let started = Instant::now();
            match destination.deliver(event).await {
                Ok(()) => {
                    record_destination_delivery(destination.name(), "success", started.elapsed());
                }
                Err(error) => {
                    failed += 1;
                    record_destination_delivery(destination.name(), "error", started.elapsed());
                    tracing::error!(
                        destination = destination.name(),
                        chain_id = %event.chain_id,
                        contract = %event.contract,
                        event = %event.name,
                        block_number = event.block_number,
                        error = %error,
                        "Failed to deliver event"
                    );
                }
            }
        }

        self.dispatched.fetch_add(1, Ordering::Relaxed);
        record_event_dispatch(event.chain_id.as_str(), self.destinations.len(), failed);
    }

    /// Releases destinations in reverse registration order.
    pub(crate) async fn release(&self) {
        for destination in self.destinations.iter().rev() {
            match destination.release().await {
                Ok(()) => tracing::debug!(destination = destination.name(), "Released output destination"),
                Err(error) => tracing::error!(
                    destination = destination.name(),
                    error = %error,
                    "Failed to release output destination"
                ),
            }
        }
    }

    pub(crate) fn dispatched_count(&self) -> u64 {
        self.dispatched.load(Ordering::Relaxed)
    }

    pub(crate) fn destination_names(&self) -> Vec<String> {
        self.destinations
            .iter()
            .map(|destination| destination.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::sink::testing::{DeliveryLog, RecordingDestination, sample_event};

    #[tokio::test]
    async fn delivers_in_registration_order_despite_failures() {
        let log = DeliveryLog::default();
        let mut builder = EventSinkBuilder::new();
        builder
            .register(Arc::new(RecordingDestination::new("first", &log)))
            .register(Arc::new(RecordingDestination::failing("broken", &log)))
            .register(Arc::new(RecordingDestination::new("last", &log)));
        let sink = builder.build();

        let event = sample_event("ethereum", 1);
        sink.dispatch(&event).await;

        assert_eq!(
            log.deliveries(),
            vec![
                ("first".to_string(), event.clone()),
                ("broken".to_string(), event.clone()),
                ("last".to_string(), event),
            ]
        );
        assert_eq!(sink.dispatched_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_registration_delivers_twice() {
        let log = DeliveryLog::default();
        let destination: Arc<dyn OutputDestination> = Arc::new(RecordingDestination::new("console", &log));
        let mut builder = EventSinkBuilder::new();
        builder
            .register(Arc::clone(&destination))
            .register(destination);
        let sink = builder.build();

        sink.dispatch(&sample_event("ethereum", 1)).await;
        assert_eq!(log.deliveries().len(), 2);
    }

    #[tokio::test]
    async fn releases_in_reverse_order() {
        let log = DeliveryLog::default();
        let mut builder = EventSinkBuilder::new();
        builder
            .register(Arc::new(RecordingDestination::new("console", &log)))
            .register(Arc::new(RecordingDestination::failing("store", &log)));
        let sink = builder.build();

        sink.release().await;
        assert_eq!(log.releases(), vec!["store".to_string(), "console".to_string()]);
    }

    #[tokio::test]
    async fn empty_sink_still_counts_dispatches() {
        let sink = EventSinkBuilder::new().build();
        sink.dispatch(&sample_event("ethereum", 1)).await;
        assert_eq!(sink.dispatched_count(), 1);
        assert!(sink.destination_names().is_empty());
    }
}
