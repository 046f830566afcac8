//! Schema migrations for the reference record store.
//!
//! The `records` and `relations` tables are created by the scripts under
//! `migrations/`. Applied scripts are tracked by sqlx and skipped on rerun.

use std::path::Path;

use log::info;
use sqlx::migrate::Migrator;
use sqlx::SqlitePool;

/// Applies pending record store migrations to `pool`.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), anyhow::Error> {
    let scripts = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let migrator = Migrator::new(scripts.as_path()).await?;
    migrator.run(pool).await?;
    info!(
        "Record store schema up to date ({} migrations)",
        migrator.iter().count()
    );
    Ok(())
}
