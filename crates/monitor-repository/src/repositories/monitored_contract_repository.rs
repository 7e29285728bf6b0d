use std::{sync::Arc, time::Instant};

use monitor_observability::record_repository_query;
use sea_orm::{
    ActiveValue, DatabaseConnection, EntityTrait, QueryOrder, prelude::DateTimeUtc,
    sea_query::OnConflict,
};

use crate::{
    error::Result,
    models::monitored_contract::{ActiveModel, Column, Entity, Model},
};

/// Registry row describing where a contract's events are stored.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitoredContract {
    pub chain_id: String,
    pub contract: String,
    pub address: String,
    pub event_table: String,
    pub registered_at: DateTimeUtc,
}

impl From<Model> for MonitoredContract {
    fn from(model: Model) -> Self {
        Self {
            chain_id: model.chain_id,
            contract: model.contract,
            address: model.address,
            event_table: model.event_table,
            registered_at: model.registered_at,
        }
    }
}

#[derive(Clone)]
pub struct MonitoredContractRepository {
    conn: Arc<DatabaseConnection>,
}

impl MonitoredContractRepository {
    pub fn new(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }

    /// Insert or refresh the registry row for a contract.
    pub async fn upsert(
        &self,
        chain_id: &str,
        contract: &str,
        address: &str,
        event_table: &str,
        registered_at: DateTimeUtc,
    ) -> Result<()> {
        let started = Instant::now();
        let model = ActiveModel {
            chain_id: ActiveValue::Set(chain_id.to_owned()),
            contract: ActiveValue::Set(contract.to_owned()),
            address: ActiveValue::Set(address.to_owned()),
            event_table: ActiveValue::Set(event_table.to_owned()),
            registered_at: ActiveValue::Set(registered_at),
        };
        let result = Entity::insert(model)
            .on_conflict(
                OnConflict::columns([Column::ChainId, Column::Contract])
                    .update_columns([Column::Address, Column::EventTable])
                    .to_owned(),
            )
            .exec_without_returning(self.conn.as_ref())
            .await
            .map(|_| ())
            .map_err(Into::into);

        let status = if result.is_ok() { "ok" } else { "error" };
        record_repository_query(
            "monitored_contract",
            "upsert",
            status,
            started.elapsed(),
            result.as_ref().ok().map(|_| 1),
        );

        result
    }

    pub async fn list(&self) -> Result<Vec<MonitoredContract>> {
        let started = Instant::now();
        let result = Entity::find()
            .order_by_asc(Column::ChainId)
            .order_by_asc(Column::Contract)
            .all(self.conn.as_ref())
            .await
            .map(|models| models.into_iter().map(MonitoredContract::from).collect::<Vec<_>>())
            .map_err(Into::into);

        match &result {
            Ok(rows) => record_repository_query(
                "monitored_contract",
                "list",
                "ok",
                started.elapsed(),
                Some(rows.len()),
            ),
            Err(_) => record_repository_query(
                "monitored_contract",
                "list",
                "error",
                started.elapsed(),
                None,
            ),
        }

        result
    }
}
