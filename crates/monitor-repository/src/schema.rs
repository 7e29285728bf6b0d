//! Per-chain, per-contract event tables.
//!
//! PostgreSQL gets one schema per chain and one table per contract inside it.
//! SQLite has no schemas, so the chain identifier becomes a table prefix.

use monitor_domain::{Chain, Contract};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, DbErr};
use sea_orm_migration::{
    SchemaManager,
    prelude::{Alias, Index, Table},
    schema::{
        big_integer, big_integer_null, pk_auto, string, string_null, text,
        timestamp_with_time_zone,
    },
    sea_query::{IntoTableRef, TableRef},
};

pub(crate) mod column {
    pub(crate) const ID: &str = "id";
    pub(crate) const BLOCK_NUMBER: &str = "block_number";
    pub(crate) const TRANSACTION_HASH: &str = "transaction_hash";
    pub(crate) const LOG_INDEX: &str = "log_index";
    pub(crate) const EVENT_NAME: &str = "event_name";
    pub(crate) const CONTRACT_ADDRESS: &str = "contract_address";
    pub(crate) const PAYLOAD: &str = "payload";
    pub(crate) const OBSERVED_AT: &str = "observed_at";
}

/// Location of the table holding one contract's events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventTable {
    schema: Option<String>,
    table: String,
}

impl EventTable {
    pub fn for_contract(backend: DatabaseBackend, chain: &Chain, contract: &Contract) -> Self {
        let chain_ident = chain.id().storage_identifier();
        let contract_ident = contract.storage_identifier();

        match backend {
            DatabaseBackend::Postgres => Self {
                schema: Some(chain_ident),
                table: contract_ident,
            },
            _ => Self {
                schema: None,
                table: format!("{chain_ident}__{contract_ident}"),
            },
        }
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Dotted name as stored in the contract registry.
    pub fn qualified_name(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.table),
            None => self.table.clone(),
        }
    }

    pub(crate) fn table_ref(&self) -> TableRef {
        match &self.schema {
            Some(schema) => (Alias::new(schema), Alias::new(&self.table)).into_table_ref(),
            None => Alias::new(&self.table).into_table_ref(),
        }
    }

    fn unique_index_name(&self) -> String {
        format!("{}_tx_log_idx", self.table)
    }
}

/// Create the schema (if the backend has them), table and unique index for one contract.
pub(crate) async fn create_event_table(
    conn: &DatabaseConnection,
    table: &EventTable,
) -> Result<(), DbErr> {
    if let Some(schema) = table.schema() {
        conn.execute_unprepared(&format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\""))
            .await?;
    }

    let manager = SchemaManager::new(conn);
    manager
        .create_table(
            Table::create()
                .table(table.table_ref())
                .if_not_exists()
                .col(pk_auto(Alias::new(column::ID)))
                .col(big_integer(Alias::new(column::BLOCK_NUMBER)))
                .col(string_null(Alias::new(column::TRANSACTION_HASH)))
                .col(big_integer_null(Alias::new(column::LOG_INDEX)))
                .col(string(Alias::new(column::EVENT_NAME)))
                .col(string(Alias::new(column::CONTRACT_ADDRESS)))
                .col(text(Alias::new(column::PAYLOAD)))
                .col(timestamp_with_time_zone(Alias::new(column::OBSERVED_AT)))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .if_not_exists()
                .name(table.unique_index_name())
                .table(table.table_ref())
                .col(Alias::new(column::TRANSACTION_HASH))
                .col(Alias::new(column::LOG_INDEX))
                .unique()
                .to_owned(),
        )
        .await
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::{json_abi::JsonAbi, primitives::Address};
    use monitor_domain::ChainId;

    use super::*;

    fn chain() -> Chain {
        let contract = Contract::new(
            "UniswapV2Factory",
            ChainId::from("polygon:137"),
            Address::ZERO,
            JsonAbi::new(),
            None,
        );
        Chain::new(
            ChainId::from("polygon:137"),
            vec!["http://localhost:8545".to_string()],
            Duration::from_secs(1),
            0,
            100,
            None,
            vec![contract],
        )
    }

    #[test]
    fn postgres_uses_chain_schema() {
        let chain = chain();
        let table = EventTable::for_contract(DatabaseBackend::Postgres, &chain, &chain.contracts()[0]);
        assert_eq!(table.schema(), Some("polygon_137"));
        assert_eq!(table.table(), "uniswap_v2_factory");
        assert_eq!(table.qualified_name(), "polygon_137.uniswap_v2_factory");
    }

    #[test]
    fn sqlite_prefixes_table_name() {
        let chain = chain();
        let table = EventTable::for_contract(DatabaseBackend::Sqlite, &chain, &chain.contracts()[0]);
        assert_eq!(table.schema(), None);
        assert_eq!(table.table(), "polygon_137__uniswap_v2_factory");
    }
}
