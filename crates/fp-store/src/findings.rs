use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use fp_types::{Finding, FindingStatus, Severity};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

fn row_to_finding(row: &sqlx::sqlite::SqliteRow) -> Result<Finding> {
    let risk_raw: String = row.try_get("risk_level")?;
    let status_raw: String = row.try_get("status")?;
    let data_raw: String = row.try_get("data_found")?;

    Ok(Finding {
        id: row.try_get("id")?,
        person_id: row.try_get("person_id")?,
        broker_id: row.try_get("broker_id")?,
        source: row.try_get("source")?,
        finding_type: row.try_get("finding_type")?,
        data_found: serde_json::from_str::<Value>(&data_raw).unwrap_or(Value::Null),
        risk_level: Severity::from_str(&risk_raw)?,
        url: row.try_get("url")?,
        screenshot_path: row.try_get("screenshot_path")?,
        status: FindingStatus::from_str(&status_raw)?,
        discovered_at: row.try_get("discovered_at")?,
    })
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_finding(
    pool: &SqlitePool,
    person_id: i64,
    broker_id: Option<i64>,
    source: &str,
    finding_type: &str,
    data_found: &Value,
    risk_level: Severity,
    url: Option<&str>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO findings (person_id, broker_id, source, finding_type, data_found, risk_level, url, status, discovered_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 'active', ?)
        "#,
    )
    .bind(person_id)
    .bind(broker_id)
    .bind(source)
    .bind(finding_type)
    .bind(data_found.to_string())
    .bind(risk_level.as_str())
    .bind(url)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("insert_finding failed")?;

    Ok(result.last_insert_rowid())
}

pub async fn list_findings_by_person(pool: &SqlitePool, person_id: i64) -> Result<Vec<Finding>> {
    let rows = sqlx::query("SELECT * FROM findings WHERE person_id = ? ORDER BY discovered_at ASC")
        .bind(person_id)
        .fetch_all(pool)
        .await
        .context("list_findings_by_person failed")?;
    rows.iter().map(row_to_finding).collect()
}

pub async fn update_finding_status(
    pool: &SqlitePool,
    id: i64,
    status: FindingStatus,
) -> Result<()> {
    let result = sqlx::query("UPDATE findings SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("update_finding_status {id} failed"))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("update_finding_status: no finding with id {id}");
    }
    Ok(())
}
