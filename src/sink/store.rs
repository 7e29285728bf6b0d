//! Durable store lifecycle.
//!
//! `DurableStore::connect` -> `ConnectedStore::prepare_schema` -> `ReadyStore`.
//! Only `ReadyStore` can be registered as an output, so no event can reach a
//! store whose schema was not prepared.

use async_trait::async_trait;
use monitor_domain::{Chain, Event};
use monitor_repository::{EventRepository, RepositoryManager, StoreConfig, error::RepositoryError};

use super::{OutputDestination, OutputError};

pub(crate) struct DurableStore;

impl DurableStore {
    pub(crate) async fn connect(config: &StoreConfig) -> Result<ConnectedStore, RepositoryError> {
        tracing::info!(url = %config.redacted_url(), "Connecting to durable store");
        let manager = RepositoryManager::connect(config).await?;
        tracing::info!(backend = ?manager.backend(), "Connected to durable store");
        Ok(ConnectedStore { manager })
    }
}

/// A store with an open session but no verified schema.
pub(crate) struct ConnectedStore {
    manager: RepositoryManager,
}

impl ConnectedStore {
    /// Creates or verifies the event tables for every contract of `chains`.
    /// The session is closed when preparation fails.
    pub(crate) async fn prepare_schema(self, chains: &[Chain]) -> Result<ReadyStore, RepositoryError> {
        match self.manager.prepare_schema(chains).await {
            Ok(events) => {
                let tables: usize = chains.iter().map(|chain| chain.contracts().len()).sum();
                tracing::info!(chains = chains.len(), tables, "Durable store schema prepared");
                Ok(ReadyStore {
                    manager: self.manager,
                    events,
                })
            }
            Err(error) => {
                if let Err(close_error) = self.manager.close().await {
                    tracing::warn!(error = %close_error, "Failed to close durable store session");
                }
                Err(error)
            }
        }
    }
}

/// A connected store with a prepared schema; the only store state that
/// accepts events.
pub(crate) struct ReadyStore {
    manager: RepositoryManager,
    events: EventRepository,
}

#[cfg(test)]
impl ReadyStore {
    pub(crate) fn is_released(&self) -> bool {
        self.manager.is_closed()
    }

    pub(crate) fn events(&self) -> &EventRepository {
        &self.events
    }
}

#[async_trait]
impl OutputDestination for ReadyStore {
    fn name(&self) -> &str {
        "store"
    }

    async fn deliver(&self, event: &Event) -> Result<(), OutputError> {
        let inserted = self.events.insert(event).await?;
        if !inserted {
            tracing::debug!(
                chain_id = %event.chain_id,
                contract = %event.contract,
                block_number = event.block_number,
                "Event already stored, skipping"
            );
        }
        Ok(())
    }

    async fn release(&self) -> Result<(), OutputError> {
        if self.manager.close().await? {
            tracing::info!("Durable store session closed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use alloy::{json_abi::JsonAbi, primitives::Address};
    use monitor_domain::{ChainId, Contract};
    use monitor_repository::StoreConfigRaw;

    use super::*;
    use crate::sink::{EventSinkBuilder, testing::sample_event};

    fn sqlite_config(url: &str) -> StoreConfig {
        StoreConfigRaw {
            url: Some(url.to_string()),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 2,
        }
        .resolve_with_env(None)
        .unwrap()
        .unwrap()
    }

    fn chains() -> Vec<Chain> {
        let chain_id = ChainId::from("ethereum");
        vec![Chain::new(
            chain_id.clone(),
            vec!["http://localhost:8545".to_string()],
            Duration::from_secs(1),
            0,
            100,
            None,
            vec![Contract::new("Token", chain_id, Address::ZERO, JsonAbi::new(), None)],
        )]
    }

    #[tokio::test]
    async fn ready_store_persists_dispatched_events() {
        let store = DurableStore::connect(&sqlite_config("sqlite::memory:"))
            .await
            .unwrap()
            .prepare_schema(&chains())
            .await
            .unwrap();
        let store = Arc::new(store);

        let mut builder = EventSinkBuilder::new();
        builder.register(Arc::clone(&store) as Arc<dyn OutputDestination>);
        let sink = builder.build();

        sink.dispatch(&sample_event("ethereum", 7)).await;
        sink.dispatch(&sample_event("ethereum", 7)).await;

        let stored = store
            .events()
            .count(&ChainId::from("ethereum"), "Token")
            .await
            .unwrap();
        assert_eq!(stored, 1);
    }

    #[tokio::test]
    async fn release_happens_once() {
        let store = DurableStore::connect(&sqlite_config("sqlite::memory:"))
            .await
            .unwrap()
            .prepare_schema(&chains())
            .await
            .unwrap();

        store.release().await.unwrap();
        store.release().await.unwrap();
        assert!(store.is_released());
    }

    #[tokio::test]
    async fn unreachable_store_fails_to_connect() {
        let result =
            DurableStore::connect(&sqlite_config("sqlite:///nonexistent-dir/monitor.db")).await;
        assert!(result.is_err());
    }
}
