//! Global poller configuration.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton holding
//! the runtime settings loaded from `.env` and environment variables. Tests
//! override single fields through the setters and call [`AppConfig::reset`]
//! to go back to the environment.

use std::env;
use std::sync::{OnceLock, RwLock};

pub const DEFAULT_SAMPLE_PERIOD_SECS: f64 = 5.0;
/// Below one millisecond consecutive slots share a row key.
pub const MIN_SAMPLE_PERIOD_SECS: f64 = 0.001;
pub const MAX_SAMPLE_PERIOD_SECS: f64 = 86_400.0;
pub const DEFAULT_DISK_PATH: &str = "/";
pub const DEFAULT_ENERGY_COUNTER_PATH: &str = "/sys/class/powercap/intel-rapl:0/energy_uj";

/// Complete poller configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub sample_period_secs: f64,
    pub disk_path: String,
    pub energy_counter_path: String,
}

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// # Panics
    /// Panics if `DATABASE_PATH` is missing.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "host-poller".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "poller=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "poller.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            database_path: env::var("DATABASE_PATH").expect("DATABASE_PATH is required"),
            sample_period_secs: parse_period(env::var("SAMPLE_PERIOD_SECS").ok().as_deref()),
            disk_path: env::var("DISK_PATH").unwrap_or_else(|_| DEFAULT_DISK_PATH.into()),
            energy_counter_path: env::var("ENERGY_COUNTER_PATH")
                .unwrap_or_else(|_| DEFAULT_ENERGY_COUNTER_PATH.into()),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Reloads the configuration from the environment, dropping overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    /// Override the sampling period. Out-of-range values fall back to the default.
    pub fn set_sample_period_secs(value: f64) {
        AppConfig::set_field(|cfg| cfg.sample_period_secs = sanitize_period(value));
    }

    pub fn set_disk_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.disk_path = value.into());
    }

    pub fn set_energy_counter_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.energy_counter_path = value.into());
    }
}

fn parse_period(raw: Option<&str>) -> f64 {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .map(sanitize_period)
        .unwrap_or(DEFAULT_SAMPLE_PERIOD_SECS)
}

/// Whether `value` is a usable sampling period, in seconds.
pub fn period_in_range(value: f64) -> bool {
    (MIN_SAMPLE_PERIOD_SECS..=MAX_SAMPLE_PERIOD_SECS).contains(&value)
}

fn sanitize_period(value: f64) -> f64 {
    if period_in_range(value) {
        value
    } else {
        DEFAULT_SAMPLE_PERIOD_SECS
    }
}

// --- Free-function getters ---

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

/// Whether a `DATABASE_PATH` value is a full connection string rather than a
/// bare SQLite file path.
pub fn is_dsn(path_or_url: &str) -> bool {
    path_or_url.starts_with("sqlite:")
        || path_or_url.starts_with("postgres://")
        || path_or_url.starts_with("postgresql://")
}

/// Connection URL for a `DATABASE_PATH` value. Bare paths open SQLite in
/// read-write-create mode.
pub fn database_url(path_or_url: &str) -> String {
    if is_dsn(path_or_url) {
        path_or_url.to_string()
    } else {
        format!("sqlite://{path_or_url}?mode=rwc")
    }
}

pub fn sample_period_secs() -> f64 {
    AppConfig::global().sample_period_secs
}

pub fn disk_path() -> String {
    AppConfig::global().disk_path.clone()
}

pub fn energy_counter_path() -> String {
    AppConfig::global().energy_counter_path.clone()
}
