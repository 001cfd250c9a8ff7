//! Durable persistence for the protection engine.
//!
//! All data lives in a single local SQLite database, opened with WAL-style
//! journaling and foreign-key enforcement. The store owns every entity's
//! durable form: in-memory handles elsewhere in the workspace are read-only
//! snapshots, and every mutation goes through one of the functions here.
//!
//! On open, any missing tables/indexes are created via an embedded
//! migration (see `migrations/0001_init.sql`).

mod breaches;
mod brokers;
mod findings;
mod persons;
mod removals;
mod runs;
mod status;

pub use breaches::*;
pub use brokers::*;
pub use findings::*;
pub use persons::*;
pub use removals::*;
pub use runs::*;
pub use status::*;

use std::path::Path;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

/// Open (creating if absent) the SQLite database at `path` and apply pending
/// migrations. WAL journal mode and foreign keys are turned on for every
/// connection in the pool.
pub async fn connect(path: impl AsRef<Path>) -> Result<SqlitePool> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create_dir_all {:?}", parent))?;
        }
    }

    let url = format!("sqlite://{}?mode=rwc", path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .with_context(|| format!("connect to sqlite db at {:?}", path))?;

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .context("set journal_mode=WAL")?;
    sqlx::query("PRAGMA foreign_keys=ON")
        .execute(&pool)
        .await
        .context("set foreign_keys=ON")?;

    migrate(&pool).await?;

    Ok(pool)
}

/// Open an in-memory database for tests. Each call gets an isolated instance.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .context("connect to in-memory sqlite db")?;
    sqlx::query("PRAGMA foreign_keys=ON")
        .execute(&pool)
        .await
        .context("set foreign_keys=ON")?;
    migrate(&pool).await?;
    Ok(pool)
}

async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")
}

/// Encode an ordered string list as the JSON text the schema stores.
pub(crate) fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).expect("Vec<String> is always serialisable")
}

/// Decode a JSON-encoded string list, defaulting to empty on any malformed
/// legacy row rather than failing the read.
pub(crate) fn decode_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}
