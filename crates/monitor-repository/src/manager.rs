use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::Utc;
use monitor_domain::{Chain, Contract};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

pub use crate::config::StoreConfig;
use crate::{
    error::RepositoryError,
    migrations::Migrator,
    repositories::{
        event_repository::EventRepository,
        monitored_contract_repository::MonitoredContractRepository,
    },
    schema::{EventTable, create_event_table},
};

pub struct RepositoryManager {
    conn: Arc<DatabaseConnection>,
    closed: AtomicBool,
}

impl RepositoryManager {
    /// Opens the connection pool.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the database cannot be reached (bad address,
    /// missing database, bad credentials). There is no retry.
    pub async fn connect(config: &StoreConfig) -> Result<Self, RepositoryError> {
        let mut opt = ConnectOptions::new(config.url.clone());
        opt.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(config.connect_timeout)
            .sqlx_logging(true)
            .sqlx_logging_level(tracing::log::LevelFilter::Debug);

        let conn = Database::connect(opt).await?;
        conn.ping().await?;

        Ok(Self {
            conn: Arc::new(conn),
            closed: AtomicBool::new(false),
        })
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.conn.get_database_backend()
    }

    /// Applies registry migrations, then creates (or verifies) one event table
    /// per contract of every chain and records it in the registry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::TableCollision` before touching the database
    /// when two contracts map to the same event table, or any error from a
    /// migration or DDL statement.
    pub async fn prepare_schema(&self, chains: &[Chain]) -> Result<EventRepository, RepositoryError> {
        let planned = plan_event_tables(self.backend(), chains)?;
        Migrator::up(self.conn.as_ref(), None).await?;

        let registry = self.monitored_contract_repository();
        let mut tables = HashMap::new();

        for (chain, contract, table) in planned {
            create_event_table(self.conn.as_ref(), &table).await?;
            registry
                .upsert(
                    chain.id().as_str(),
                    contract.name(),
                    &contract.address().to_checksum(None),
                    &table.qualified_name(),
                    Utc::now(),
                )
                .await?;

            tracing::debug!(
                chain_id = %chain.id(),
                contract = %contract.name(),
                table = %table.qualified_name(),
                "Event table ready"
            );
            tables.insert((chain.id().clone(), contract.name().to_string()), table);
        }

        Ok(EventRepository::new(Arc::clone(&self.conn), tables))
    }

    pub fn monitored_contract_repository(&self) -> MonitoredContractRepository {
        MonitoredContractRepository::new(Arc::clone(&self.conn))
    }

    /// Closes the connection pool. Only the first call closes; later calls
    /// return `Ok(false)`.
    pub async fn close(&self) -> Result<bool, RepositoryError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        self.conn.close_by_ref().await?;
        Ok(true)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

/// Maps every contract to its event table, refusing two contracts whose names
/// normalize to the same table.
fn plan_event_tables(
    backend: DatabaseBackend,
    chains: &[Chain],
) -> Result<Vec<(&Chain, &Contract, EventTable)>, RepositoryError> {
    let mut owners: HashMap<String, String> = HashMap::new();
    let mut planned = Vec::new();

    for chain in chains {
        for contract in chain.contracts() {
            let table = EventTable::for_contract(backend, chain, contract);
            let owner = format!("{}/{}", chain.id(), contract.name());
            if let Some(first) = owners.insert(table.qualified_name(), owner.clone()) {
                return Err(RepositoryError::TableCollision {
                    table: table.qualified_name(),
                    first,
                    second: owner,
                });
            }
            planned.push((chain, contract, table));
        }
    }

    Ok(planned)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::{json_abi::JsonAbi, primitives::Address};
    use monitor_domain::{ChainId, Contract, Event};
    use serde_json::json;

    use super::*;
    use crate::StoreConfigRaw;

    async fn sqlite_manager() -> RepositoryManager {
        let config = StoreConfigRaw {
            url: Some("sqlite::memory:".to_string()),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 5,
        }
        .resolve_with_env(None)
        .unwrap()
        .unwrap();
        RepositoryManager::connect(&config).await.unwrap()
    }

    fn chains() -> Vec<Chain> {
        let chain_id = ChainId::from("ethereum");
        let contracts = ["Factory", "Router"]
            .into_iter()
            .map(|name| Contract::new(name, chain_id.clone(), Address::ZERO, JsonAbi::new(), None))
            .collect();
        vec![Chain::new(
            chain_id,
            vec!["http://localhost:8545".to_string()],
            Duration::from_secs(1),
            0,
            100,
            None,
            contracts,
        )]
    }

    fn event(contract: &str, log_index: u64) -> Event {
        Event {
            chain_id: ChainId::from("ethereum"),
            contract: contract.to_string(),
            contract_address: Address::ZERO.to_checksum(None),
            name: "PairCreated".to_string(),
            block_number: 100,
            transaction_hash: Some(format!("0x{:064x}", 1)),
            log_index: Some(log_index),
            payload: json!({"pair": "0xabc"}),
            observed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn prepare_schema_registers_every_contract() {
        let manager = sqlite_manager().await;
        manager.prepare_schema(&chains()).await.unwrap();

        let registered = manager.monitored_contract_repository().list().await.unwrap();
        let names: Vec<_> = registered.iter().map(|row| row.contract.as_str()).collect();
        assert_eq!(names, vec!["Factory", "Router"]);
        assert_eq!(registered[0].event_table, "ethereum__factory");
    }

    #[tokio::test]
    async fn prepare_schema_is_idempotent() {
        let manager = sqlite_manager().await;
        manager.prepare_schema(&chains()).await.unwrap();
        manager.prepare_schema(&chains()).await.unwrap();

        let registered = manager.monitored_contract_repository().list().await.unwrap();
        assert_eq!(registered.len(), 2);
    }

    #[tokio::test]
    async fn duplicate_log_is_stored_once() {
        let manager = sqlite_manager().await;
        let events = manager.prepare_schema(&chains()).await.unwrap();
        let chain_id = ChainId::from("ethereum");

        assert!(events.insert(&event("Factory", 0)).await.unwrap());
        assert!(!events.insert(&event("Factory", 0)).await.unwrap());
        assert!(events.insert(&event("Factory", 1)).await.unwrap());

        assert_eq!(events.count(&chain_id, "Factory").await.unwrap(), 2);
        assert_eq!(events.count(&chain_id, "Router").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn insert_for_unprepared_contract_fails() {
        let manager = sqlite_manager().await;
        let events = manager.prepare_schema(&chains()).await.unwrap();

        let result = events.insert(&event("Unknown", 0)).await;
        assert!(matches!(result, Err(RepositoryError::UnknownTable { .. })));
    }

    #[tokio::test]
    async fn contracts_sharing_a_table_name_are_refused() {
        let manager = sqlite_manager().await;
        let chain_id = ChainId::from("ethereum");
        let contracts = ["MyToken", "my_token"]
            .into_iter()
            .map(|name| Contract::new(name, chain_id.clone(), Address::ZERO, JsonAbi::new(), None))
            .collect();
        let chain = Chain::new(
            chain_id,
            vec!["http://localhost:8545".to_string()],
            Duration::from_secs(1),
            0,
            100,
            None,
            contracts,
        );

        let result = manager.prepare_schema(&[chain]).await;
        match result {
            Err(RepositoryError::TableCollision { table, first, second }) => {
                assert_eq!(table, "ethereum__my_token");
                assert_eq!(first, "ethereum/MyToken");
                assert_eq!(second, "ethereum/my_token");
            }
            other => panic!("expected a table collision, got {:?}", other.map(|_| ())),
        }
        assert!(manager.monitored_contract_repository().list().await.is_err());
    }

    #[tokio::test]
    async fn close_happens_once() {
        let manager = sqlite_manager().await;
        assert!(manager.close().await.unwrap());
        assert!(!manager.close().await.unwrap());
        assert!(manager.is_closed());
    }
}
