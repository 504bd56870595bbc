use std::{fs, path::Path};

use migration::Migrator;
use util::config::{self, database_url, is_dsn};

mod runner;

#[tokio::main]
async fn main() {
    let db_path = config::database_path();
    let url = database_url(&db_path);
    let args: Vec<String> = std::env::args().collect();

    let result = match args.get(1).map(|s| s.as_str()) {
        Some("clean") => {
            remove_db_file(&db_path);
            Ok(())
        }
        Some("fresh") => {
            remove_db_file(&db_path);
            create_db_dir(&db_path);
            runner::run_all_migrations(&url).await
        }
        Some("status") => runner::print_status(&url).await,
        _ => {
            create_db_dir(&db_path);
            runner::run_all_migrations(&url).await
        }
    };

    if let Err(e) = result {
        eprintln!("Migration failed: {e}");
        std::process::exit(1);
    }
}

fn remove_db_file(path: &str) {
    if is_dsn(path) {
        println!("Not a local SQLite file, skipping delete: {}", path);
        return;
    }

    let db_path = Path::new(path);
    if db_path.exists() {
        fs::remove_file(db_path).expect("Failed to delete DB file");
        println!("Deleted DB: {}", db_path.display());
    } else {
        println!("DB file does not exist: {}", db_path.display());
    }
}

fn create_db_dir(path: &str) {
    if is_dsn(path) {
        return;
    }
    if let Some(parent) = Path::new(path).parent() {
        fs::create_dir_all(parent).expect("Failed to create DB directory");
    }
}
