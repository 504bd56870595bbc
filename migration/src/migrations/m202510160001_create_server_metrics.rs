// migrations/m202510160001_create_server_metrics.rs
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum ServerMetrics {
    Table,
    Ts,
    CpuUsed,
    RamUsed,
    DiskUsed,
    CpuTemp,
    PwrUsed,
    NetUp,
    NetDn,
}

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202510160001_create_server_metrics"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServerMetrics::Table)
                    .if_not_exists()
                    // slot start, milliseconds since the epoch
                    .col(
                        ColumnDef::new(ServerMetrics::Ts)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ServerMetrics::CpuUsed).double().not_null())
                    .col(ColumnDef::new(ServerMetrics::RamUsed).double().not_null())
                    .col(ColumnDef::new(ServerMetrics::DiskUsed).double().not_null())
                    .col(ColumnDef::new(ServerMetrics::CpuTemp).double().null())
                    .col(ColumnDef::new(ServerMetrics::PwrUsed).double().null())
                    .col(
                        ColumnDef::new(ServerMetrics::NetUp)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(ServerMetrics::NetDn)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ServerMetrics::Table).to_owned())
            .await
    }
}
