pub mod models;
pub mod test_utils;

use sea_orm::{Database, DatabaseConnection, DbErr};
use std::path::Path;
use util::config;

/// Connects to the configured store.
///
/// `DATABASE_PATH` may be a full DSN (`sqlite:`, `postgres://`) or a bare
/// SQLite file path, in which case the parent directory is created and the
/// file is opened in read-write-create mode.
pub async fn connect() -> Result<DatabaseConnection, DbErr> {
    Database::connect(&database_url(&config::database_path())).await
}

/// [`config::database_url`], creating the parent directory of a bare SQLite
/// path first.
pub fn database_url(path_or_url: &str) -> String {
    if !config::is_dsn(path_or_url) {
        // SQLite won't create intermediate dirs.
        if let Some(parent) = Path::new(path_or_url).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
    }
    config::database_url(path_or_url)
}
