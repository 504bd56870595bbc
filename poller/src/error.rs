use sea_orm::DbErr;
use util::system_health::MetricsError;

pub type PollerResult<T> = Result<T, PollerError>;

/// Failures that stop the sampling loop.
///
/// Optional readings (temperature, power) never surface here; they collapse
/// to `None` where they are taken.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    #[error("metrics read failed: {0}")]
    Metrics(#[from] MetricsError),

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("invalid configuration: {0}")]
    Config(String),
}
