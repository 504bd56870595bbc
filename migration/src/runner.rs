use colored::*;
use sea_orm::DatabaseConnection;
use sea_orm_migration::prelude::*;
use std::io::{self, Write};
use std::time::Instant;

const STATUS_COLUMN: usize = 80;

/// Applies every pending migration, one line of progress per migration.
pub async fn run_all_migrations(url: &str) -> Result<(), DbErr> {
    let db = sea_orm::Database::connect(url).await?;

    println!("Running migrations...");
    let pending = crate::Migrator::get_pending_migrations(&db).await?;
    if pending.is_empty() {
        println!("{}", "Nothing to apply".dimmed());
        return Ok(());
    }

    for migration in pending {
        run_migration(&db, migration.name()).await?;
    }
    Ok(())
}

/// Prints applied and pending migrations.
pub async fn print_status(url: &str) -> Result<(), DbErr> {
    let db = sea_orm::Database::connect(url).await?;

    for migration in crate::Migrator::get_migration_with_status(&db).await? {
        let name_str = migration.name().bold().to_string();
        let dots = ".".repeat(STATUS_COLUMN.saturating_sub(name_str.len()));
        println!("{}{} {:?}", name_str, dots, migration.status());
    }
    Ok(())
}

async fn run_migration(db: &DatabaseConnection, name: &str) -> Result<(), DbErr> {
    let name_str = format!("Applying {}", name.bold());
    let dots = ".".repeat(STATUS_COLUMN.saturating_sub(name_str.len()));
    print!("{}{} ", name_str, dots);
    io::stdout().flush().ok();

    let start = Instant::now();
    match crate::Migrator::up(db, Some(1)).await {
        Ok(()) => {
            let time_str = format!("({:.2?})", start.elapsed()).dimmed();
            println!("{} {}", "done".green(), time_str);
            Ok(())
        }
        Err(e) => {
            println!("{}", "failed".red());
            Err(e)
        }
    }
}
