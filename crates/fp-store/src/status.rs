use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// Aggregate snapshot of the whole store, used by reporting and by the
/// scheduler's status view.
#[derive(Debug, Clone, Default)]
pub struct StoreStatus {
    pub persons: i64,
    pub brokers: i64,
    pub findings_active: i64,
    pub findings_removal_pending: i64,
    pub findings_removed: i64,
    pub removals_pending: i64,
    pub removals_submitted: i64,
    pub removals_confirmed: i64,
    pub removals_failed: i64,
    pub breaches: i64,
    pub last_scan_at: Option<DateTime<Utc>>,
}

async fn count_where(pool: &SqlitePool, table: &str, column: &str, value: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) AS n FROM {table} WHERE {column} = ?");
    let row = sqlx::query(&sql)
        .bind(value)
        .fetch_one(pool)
        .await
        .with_context(|| format!("count_where {table}.{column}={value} failed"))?;
    row.try_get("n").context("read count")
}

async fn count_all(pool: &SqlitePool, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) AS n FROM {table}");
    let row = sqlx::query(&sql)
        .fetch_one(pool)
        .await
        .with_context(|| format!("count_all {table} failed"))?;
    row.try_get("n").context("read count")
}

pub async fn status(pool: &SqlitePool) -> Result<StoreStatus> {
    let last_scan_at: Option<DateTime<Utc>> = sqlx::query(
        "SELECT MAX(started_at) AS ts FROM pipeline_runs",
    )
    .fetch_one(pool)
    .await
    .context("status: last_scan_at failed")?
    .try_get("ts")?;

    Ok(StoreStatus {
        persons: count_all(pool, "persons").await?,
        brokers: count_all(pool, "brokers").await?,
        findings_active: count_where(pool, "findings", "status", "active").await?,
        findings_removal_pending: count_where(pool, "findings", "status", "removal_pending")
            .await?,
        findings_removed: count_where(pool, "findings", "status", "removed").await?,
        removals_pending: count_where(pool, "removals", "status", "pending").await?,
        removals_submitted: count_where(pool, "removals", "status", "submitted").await?,
        removals_confirmed: count_where(pool, "removals", "status", "confirmed").await?,
        removals_failed: count_where(pool, "removals", "status", "failed").await?,
        breaches: count_all(pool, "breaches").await?,
        last_scan_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;

    #[tokio::test]
    async fn status_on_empty_db_is_all_zero() {
        let pool = connect_in_memory().await.unwrap();
        let s = status(&pool).await.unwrap();
        assert_eq!(s.persons, 0);
        assert_eq!(s.brokers, 0);
        assert!(s.last_scan_at.is_none());
    }
}
