use sea_orm_migration::{
    async_trait::async_trait,
    prelude::{DbErr, DeriveMigrationName, Iden, Index, MigrationTrait, SchemaManager, Table},
    schema::*,
    sea_query,
};

#[derive(Iden)]
enum MonitoredContract {
    Table,
    ChainId,
    Contract,
    Address,
    EventTable,
    RegisteredAt,
}

#[derive(DeriveMigrationName)]
pub(crate) struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MonitoredContract::Table)
                    .if_not_exists()
                    .col(string(MonitoredContract::ChainId))
                    .col(string(MonitoredContract::Contract))
                    .col(string_len(MonitoredContract::Address, 42))
                    .col(string(MonitoredContract::EventTable))
                    .col(timestamp_with_time_zone(MonitoredContract::RegisteredAt))
                    .primary_key(
                        Index::create()
                            .col(MonitoredContract::ChainId)
                            .col(MonitoredContract::Contract),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(MonitoredContract::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}
