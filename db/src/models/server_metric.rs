// db/models/server_metric.rs
use sea_orm::QueryOrder;
use sea_orm::QuerySelect;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::OnConflict;
use serde::{Deserialize, Serialize};

/// One sampled row per period slot, keyed by the slot start in epoch milliseconds.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "server_metrics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ts: i64,
    pub cpu_used: f64,  // 0..100
    pub ram_used: f64,  // 0..100
    pub disk_used: f64, // 0..100
    pub cpu_temp: Option<f64>,
    pub pwr_used: Option<f64>,
    pub net_up: f64, // bytes/s
    pub net_dn: f64, // bytes/s
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Inserts the row unless one already exists for the same `ts`.
    ///
    /// Returns `true` when a row was written and `false` when the slot was
    /// already present. A duplicate slot is not an error.
    pub async fn insert_if_absent<C>(db: &C, model: Model) -> Result<bool, DbErr>
    where
        C: ConnectionTrait,
    {
        let active: ActiveModel = model.into();
        let rows = Entity::insert(active)
            .on_conflict(OnConflict::column(Column::Ts).do_nothing().to_owned())
            .exec_without_returning(db)
            .await?;

        if rows == 0 {
            tracing::debug!(target: "db::server_metric", "slot already recorded, insert skipped");
        }
        Ok(rows > 0)
    }

    pub async fn find_by_ts<C>(db: &C, ts: i64) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find_by_id(ts).one(db).await
    }

    /// Most recent rows first.
    pub async fn recent<C>(db: &C, limit: u64) -> Result<Vec<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Entity::find()
            .order_by_desc(Column::Ts)
            .limit(limit)
            .all(db)
            .await
    }
}
