use std::{collections::HashMap, sync::Arc, time::Instant};

use monitor_domain::{ChainId, Event};
use monitor_observability::record_repository_query;
use sea_orm::{
    ConnectionTrait, DatabaseConnection,
    sea_query::{Alias, Expr, Func, OnConflict, Query},
};

use crate::{
    error::{RepositoryError, Result},
    schema::{EventTable, column},
};

/// Writes events into the per-contract tables prepared at startup.
#[derive(Clone)]
pub struct EventRepository {
    conn: Arc<DatabaseConnection>,
    tables: Arc<HashMap<(ChainId, String), EventTable>>,
}

impl EventRepository {
    pub(crate) fn new(
        conn: Arc<DatabaseConnection>,
        tables: HashMap<(ChainId, String), EventTable>,
    ) -> Self {
        Self {
            conn,
            tables: Arc::new(tables),
        }
    }

    pub fn table_for(&self, chain_id: &ChainId, contract: &str) -> Option<&EventTable> {
        self.tables.get(&(chain_id.clone(), contract.to_string()))
    }

    fn require_table(&self, chain_id: &ChainId, contract: &str) -> Result<&EventTable> {
        self.table_for(chain_id, contract)
            .ok_or_else(|| RepositoryError::UnknownTable {
                chain_id: chain_id.to_string(),
                contract: contract.to_string(),
            })
    }

    /// Store one event. Returns `false` when the same log was already stored.
    pub async fn insert(&self, event: &Event) -> Result<bool> {
        let started = Instant::now();
        let result = self.insert_inner(event).await;

        let status = if result.is_ok() { "ok" } else { "error" };
        record_repository_query(
            "event",
            "insert",
            status,
            started.elapsed(),
            result.as_ref().ok().map(|inserted| usize::from(*inserted)),
        );

        result
    }

    async fn insert_inner(&self, event: &Event) -> Result<bool> {
        let table = self.require_table(&event.chain_id, &event.contract)?;

        let block_number = i64::try_from(event.block_number).map_err(|_| {
            RepositoryError::InvalidEvent("block_number exceeds i64::MAX".to_string())
        })?;
        let log_index = event
            .log_index
            .map(i64::try_from)
            .transpose()
            .map_err(|_| RepositoryError::InvalidEvent("log_index exceeds i64::MAX".to_string()))?;
        let payload = serde_json::to_string(&event.payload)
            .map_err(|error| RepositoryError::InvalidEvent(error.to_string()))?;

        let statement = Query::insert()
            .into_table(table.table_ref())
            .columns([
                Alias::new(column::BLOCK_NUMBER),
                Alias::new(column::TRANSACTION_HASH),
                Alias::new(column::LOG_INDEX),
                Alias::new(column::EVENT_NAME),
                Alias::new(column::CONTRACT_ADDRESS),
                Alias::new(column::PAYLOAD),
                Alias::new(column::OBSERVED_AT),
            ])
            .values([
                block_number.into(),
                event.transaction_hash.clone().into(),
                log_index.into(),
                event.name.clone().into(),
                event.contract_address.clone().into(),
                payload.into(),
                event.observed_at.into(),
            ])
            .map_err(|error| RepositoryError::Statement(error.to_string()))?
            .on_conflict(
                OnConflict::columns([
                    Alias::new(column::TRANSACTION_HASH),
                    Alias::new(column::LOG_INDEX),
                ])
                .do_nothing()
                .to_owned(),
            )
            .to_owned();

        let backend = self.conn.get_database_backend();
        let result = self.conn.execute(backend.build(&statement)).await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of stored events for a contract.
    pub async fn count(&self, chain_id: &ChainId, contract: &str) -> Result<u64> {
        let table = self.require_table(chain_id, contract)?;
        let statement = Query::select()
            .expr_as(Func::count(Expr::col(Alias::new(column::ID))), Alias::new("total"))
            .from(table.table_ref())
            .to_owned();

        let backend = self.conn.get_database_backend();
        let row = self.conn.query_one(backend.build(&statement)).await?;
        let total: i64 = match row {
            Some(row) => row.try_get("", "total")?,
            None => 0,
        };

        Ok(total.max(0) as u64)
    }
}
