use db::connect;
use migration::Migrator;
use poller::clock::SystemClock;
use poller::error::PollerResult;
use poller::sampler::Poller;
use poller::sensors::RaplCounter;
use sea_orm::ConnectionTrait;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info};
use tracing_appender::rolling;
use util::config;
use util::system_health::SysinfoSource;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _log_guard = init_logging(&config::log_file());

    if let Err(e) = run().await {
        error!(error = %e, "poller stopped");
        eprintln!("{}: {e}", config::project_name());
        std::process::exit(1);
    }
}

async fn run() -> PollerResult<()> {
    let period = config::sample_period_secs();
    let disk_path = config::disk_path();
    let energy_path = config::energy_counter_path();

    let db = connect().await?;
    Migrator::up(&db, None).await?;

    info!(
        period_secs = period,
        disk = %disk_path,
        energy_counter = %energy_path,
        store = ?db.get_database_backend(),
        "starting {}",
        config::project_name()
    );

    let mut poller = Poller::new(
        SystemClock,
        SysinfoSource::new(),
        RaplCounter::new(energy_path),
        db,
        period,
        disk_path,
    )?;
    poller.run().await
}

fn init_logging(log_file: &str) -> tracing_appender::non_blocking::WorkerGuard {
    use std::fs;
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    fs::create_dir_all("logs").ok();

    let file_appender = rolling::daily("logs", log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_ansi(false)
        .with_target(true);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .with_target(true);

    let env_filter = EnvFilter::try_new(config::log_level())
        .unwrap_or_else(|_| EnvFilter::new("poller=info"));

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer);

    if config::log_to_stdout() {
        registry.with(stdout_layer).init();
    } else {
        registry.init();
    }

    guard
}
