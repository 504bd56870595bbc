//! Persistence seam for sampled rows.

use async_trait::async_trait;
use db::models::server_metric::Model as ServerMetricModel;
use sea_orm::DatabaseConnection;

use crate::error::PollerResult;
use crate::sampler::Sample;

/// Idempotent, timestamp-keyed row sink.
#[async_trait]
pub trait SampleSink {
    /// Stores the row. `Ok(false)` means the slot already existed.
    async fn record(&self, sample: &Sample) -> PollerResult<bool>;
}

#[async_trait]
impl SampleSink for DatabaseConnection {
    async fn record(&self, sample: &Sample) -> PollerResult<bool> {
        Ok(ServerMetricModel::insert_if_absent(self, sample.into()).await?)
    }
}

impl From<&Sample> for ServerMetricModel {
    fn from(s: &Sample) -> Self {
        Self {
            ts: s.slot_ts,
            cpu_used: s.cpu_used,
            ram_used: s.ram_used,
            disk_used: s.disk_used,
            cpu_temp: s.cpu_temp,
            pwr_used: s.pwr_used,
            net_up: s.net_up,
            net_dn: s.net_dn,
        }
    }
}
