//! Per-chain watch loop.

use std::time::Instant;

use monitor_blockchain::{
    Address, BlockchainError, ChainClient, Log, LogSource, fetch_logs_in_chunks, log_to_event,
};
use monitor_domain::Chain;
use monitor_observability::{record_chain_cursor, record_chain_poll_cycle};

use crate::{
    runtime::{ExecutionScope, TaskExit},
    sink::EventSink,
};

/// Connects to the chain and watches it until the scope is cancelled.
///
/// Connection failures are logged and retried every poll interval, so the
/// task never ends before cancellation.
pub(crate) async fn run_chain_task(
    chain: Chain,
    sink: EventSink,
    scope: ExecutionScope,
) -> TaskExit {
    let Some(client) = connect_until_cancelled(&chain, &scope).await else {
        tracing::info!(chain_id = %chain.id(), "Chain watcher cancelled before connecting");
        return TaskExit::Cancelled;
    };

    ChainWatcher::new(chain, client, sink, scope).run().await
}

async fn connect_until_cancelled(chain: &Chain, scope: &ExecutionScope) -> Option<ChainClient> {
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        let connected = tokio::select! {
            biased;
            _ = scope.cancelled() => return None,
            connected = ChainClient::connect(chain.id(), chain.rpc_endpoints()) => connected,
        };

        match connected {
            Ok(client) => return Some(client),
            Err(error) => tracing::warn!(
                chain_id = %chain.id(),
                attempt,
                error = %error,
                "Chain connection failed, retrying next tick"
            ),
        }

        tokio::select! {
            _ = scope.cancelled() => return None,
            _ = tokio::time::sleep(chain.poll_interval()) => {}
        }
    }
}

/// Confirmed logs for one poll cycle, ending at block `confirmed`.
struct Batch {
    logs: Vec<Log>,
    confirmed: u64,
}

#[derive(Default)]
struct PollStats {
    fetched: usize,
    dispatched: usize,
    skipped: usize,
    interrupted: bool,
}

pub(crate) struct ChainWatcher<S> {
    chain: Chain,
    source: S,
    sink: EventSink,
    scope: ExecutionScope,
    addresses: Vec<Address>,
}

impl<S: LogSource> ChainWatcher<S> {
    pub(crate) fn new(chain: Chain, source: S, sink: EventSink, scope: ExecutionScope) -> Self {
        let addresses = chain
            .contracts()
            .iter()
            .map(|contract| contract.address())
            .collect();
        Self {
            chain,
            source,
            sink,
            scope,
            addresses,
        }
    }

    /// Polls until cancellation. Always ends as [`TaskExit::Cancelled`].
    ///
    /// Only the RPC round trips are abandoned on cancellation. An event
    /// already handed to the sink reaches every destination before the loop
    /// stops.
    pub(crate) async fn run(self) -> TaskExit {
        let chain_id = self.chain.id().clone();
        tracing::info!(
            chain_id = %chain_id,
            contracts = self.addresses.len(),
            poll_interval_ms = self.chain.poll_interval().as_millis() as u64,
            "Chain watcher started"
        );

        let mut cursor = self.chain.start_block();
        loop {
            let started = Instant::now();
            let fetched = tokio::select! {
                biased;
                _ = self.scope.cancelled() => break,
                fetched = self.fetch(&mut cursor) => fetched,
            };

            match fetched {
                Ok(batch) => {
                    let stats = match batch {
                        Some(batch) => self.dispatch_batch(batch, &mut cursor).await,
                        None => PollStats::default(),
                    };
                    self.record_cycle(&stats, started);
                    if stats.interrupted {
                        break;
                    }
                }
                Err(error) => {
                    record_chain_poll_cycle(chain_id.as_str(), "error", started.elapsed(), 0, 0);
                    tracing::warn!(
                        chain_id = %chain_id,
                        cursor = ?cursor,
                        error = %error,
                        "Chain poll failed, retrying next tick"
                    );
                }
            }

            tokio::select! {
                _ = self.scope.cancelled() => break,
                _ = tokio::time::sleep(self.chain.poll_interval()) => {}
            }
        }

        tracing::info!(chain_id = %chain_id, "Chain watcher shutting down");
        TaskExit::Cancelled
    }

    /// Returns `None` when there is nothing new to fetch.
    async fn fetch(&self, cursor: &mut Option<u64>) -> Result<Option<Batch>, BlockchainError> {
        if self.addresses.is_empty() {
            return Ok(None);
        }

        let tip = self.source.block_number().await?;
        let confirmed = tip.saturating_sub(self.chain.confirmations());
        let from = *cursor.get_or_insert(confirmed);
        if from > confirmed {
            return Ok(None);
        }

        let logs = fetch_logs_in_chunks(
            &self.source,
            &self.addresses,
            from,
            confirmed,
            self.chain.max_block_range(),
        )
        .await?;

        Ok(Some(Batch { logs, confirmed }))
    }

    /// Dispatches the batch in order. Cancellation is checked between
    /// events; an interrupted batch leaves the cursor where it was.
    async fn dispatch_batch(&self, batch: Batch, cursor: &mut Option<u64>) -> PollStats {
        let mut stats = PollStats {
            fetched: batch.logs.len(),
            ..PollStats::default()
        };

        for log in &batch.logs {
            let Some(contract) = self.chain.contract_by_address(log.address()) else {
                stats.skipped += 1;
                continue;
            };

            let event = log_to_event(self.chain.id(), contract, log);
            if !contract.watches(&event.name) {
                stats.skipped += 1;
                continue;
            }

            if self.scope.is_cancelled() {
                stats.interrupted = true;
                return stats;
            }

            self.sink.dispatch(&event).await;
            stats.dispatched += 1;
        }

        *cursor = Some(batch.confirmed + 1);
        record_chain_cursor(self.chain.id().as_str(), batch.confirmed);

        stats
    }

    fn record_cycle(&self, stats: &PollStats, started: Instant) {
        let chain_id = self.chain.id().as_str();
        record_chain_poll_cycle(
            chain_id,
            "ok",
            started.elapsed(),
            stats.fetched,
            stats.dispatched,
        );

        if stats.interrupted {
            tracing::info!(
                chain_id,
                dispatched = stats.dispatched,
                fetched = stats.fetched,
                "Cancelled between events, cursor not advanced"
            );
        } else if stats.fetched > 0 {
            tracing::debug!(
                chain_id,
                fetched = stats.fetched,
                dispatched = stats.dispatched,
                skipped = stats.skipped,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Chain poll completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use monitor_domain::{ChainId, Contract};

    use super::*;
    use crate::{
        sink::{
            EventSinkBuilder,
            testing::{DeliveryLog, RecordingDestination},
        },
        tasks::testing::{
            ScriptedSource, TEST_POLL_INTERVAL, TOKEN, token_abi, transfer_log, unknown_log,
            wait_until,
        },
    };

    fn chain(events: Option<Vec<&str>>) -> Chain {
        let chain_id = ChainId::from("ethereum");
        let contract = Contract::new(
            "Token",
            chain_id.clone(),
            TOKEN,
            token_abi(),
            events.map(|names| names.into_iter().map(String::from).collect()),
        );
        Chain::new(
            chain_id,
            vec!["http://localhost:8545".to_string()],
            TEST_POLL_INTERVAL,
            0,
            10,
            Some(90),
            vec![contract],
        )
    }

    fn recording_sink(log: &DeliveryLog) -> EventSink {
        let mut builder = EventSinkBuilder::new();
        builder.register(Arc::new(RecordingDestination::new("console", log)));
        builder.build()
    }

    #[tokio::test]
    async fn dispatches_decoded_and_unknown_events() {
        let source = ScriptedSource::new("ethereum", 100)
            .with_log(transfer_log(95, 0, 7))
            .with_log(unknown_log(96, 1));
        let log = DeliveryLog::default();
        let scope = ExecutionScope::new();
        let watcher = ChainWatcher::new(chain(None), source, recording_sink(&log), scope.clone());
        let handle = tokio::spawn(watcher.run());

        wait_until(|| log.deliveries().len() >= 2).await;
        scope.cancel();
        assert_eq!(handle.await.unwrap(), TaskExit::Cancelled);

        let events = log.delivered_to("console");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].name, "Transfer");
        assert_eq!(events[0].payload["value"], "7");
        assert_eq!(events[0].block_number, 95);
        assert!(events[1].is_unknown());
    }

    #[tokio::test]
    async fn respects_event_filter() {
        let source = ScriptedSource::new("ethereum", 100)
            .with_log(unknown_log(94, 0))
            .with_log(transfer_log(95, 0, 7));
        let log = DeliveryLog::default();
        let scope = ExecutionScope::new();
        let watcher = ChainWatcher::new(
            chain(Some(vec!["Transfer"])),
            source,
            recording_sink(&log),
            scope.clone(),
        );
        let handle = tokio::spawn(watcher.run());

        wait_until(|| !log.deliveries().is_empty()).await;
        // Give the loop another tick to prove nothing else arrives.
        tokio::time::sleep(TEST_POLL_INTERVAL * 3).await;
        scope.cancel();
        handle.await.unwrap();

        let events = log.delivered_to("console");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Transfer");
    }

    #[tokio::test]
    async fn contains_fetch_errors_and_keeps_polling() {
        let source = ScriptedSource::new("ethereum", 100)
            .failing_block_number(3)
            .with_log(transfer_log(95, 0, 1));
        let calls = source.block_number_calls();
        let log = DeliveryLog::default();
        let scope = ExecutionScope::new();
        let watcher = ChainWatcher::new(chain(None), source, recording_sink(&log), scope.clone());
        let handle = tokio::spawn(watcher.run());

        wait_until(|| !log.deliveries().is_empty()).await;
        scope.cancel();
        assert_eq!(handle.await.unwrap(), TaskExit::Cancelled);
        assert!(calls.load(std::sync::atomic::Ordering::SeqCst) >= 4);
    }

    #[tokio::test]
    async fn each_log_is_dispatched_once_across_polls() {
        let source = ScriptedSource::new("ethereum", 100).with_log(transfer_log(95, 0, 7));
        let tip = source.tip();
        let log = DeliveryLog::default();
        let scope = ExecutionScope::new();
        let watcher = ChainWatcher::new(chain(None), source, recording_sink(&log), scope.clone());
        let handle = tokio::spawn(watcher.run());

        wait_until(|| !log.deliveries().is_empty()).await;
        tip.store(120, std::sync::atomic::Ordering::SeqCst);
        tokio::time::sleep(TEST_POLL_INTERVAL * 5).await;
        scope.cancel();
        handle.await.unwrap();

        assert_eq!(log.deliveries().len(), 1);
    }

    #[tokio::test]
    async fn exits_promptly_when_already_cancelled() {
        let scope = ExecutionScope::new();
        scope.cancel();
        let watcher = ChainWatcher::new(
            chain(None),
            ScriptedSource::new("ethereum", 100),
            EventSinkBuilder::new().build(),
            scope,
        );
        let exit = tokio::time::timeout(Duration::from_secs(1), watcher.run())
            .await
            .unwrap();
        assert_eq!(exit, TaskExit::Cancelled);
    }

    #[tokio::test]
    async fn cancellation_lets_the_event_in_flight_reach_every_destination() {
        let source = ScriptedSource::new("ethereum", 100)
            .with_log(transfer_log(95, 0, 7))
            .with_log(transfer_log(96, 0, 8));
        let log = DeliveryLog::default();
        let mut builder = EventSinkBuilder::new();
        builder
            .register(Arc::new(RecordingDestination::new("console", &log)))
            .register(Arc::new(RecordingDestination::slow(
                "archive",
                &log,
                Duration::from_millis(200),
            )))
            .register(Arc::new(RecordingDestination::new("store", &log)));
        let scope = ExecutionScope::new();
        let watcher = ChainWatcher::new(chain(None), source, builder.build(), scope.clone());
        let handle = tokio::spawn(watcher.run());

        wait_until(|| log.delivered_to("console").len() == 1).await;
        scope.cancel();
        let exit = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exit, TaskExit::Cancelled);

        let stored = log.delivered_to("store");
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].block_number, 95);
        assert_eq!(log.delivered_to("archive").len(), 1);
        // The next event was never started.
        assert_eq!(log.delivered_to("console").len(), 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_keeps_the_task_alive_until_cancelled() {
        let _ = rustls::crypto::ring::default_provider().install_default();
        let chain_id = ChainId::from("ethereum");
        let unreachable = Chain::new(
            chain_id.clone(),
            vec!["http://127.0.0.1:1".to_string()],
            TEST_POLL_INTERVAL,
            0,
            10,
            None,
            vec![Contract::new("Token", chain_id, TOKEN, token_abi(), None)],
        );
        let scope = ExecutionScope::new();
        let handle = tokio::spawn(run_chain_task(
            unreachable,
            EventSinkBuilder::new().build(),
            scope.clone(),
        ));

        tokio::time::sleep(TEST_POLL_INTERVAL * 10).await;
        assert!(!handle.is_finished());

        scope.cancel();
        let exit = tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exit, TaskExit::Cancelled);
    }
}
