use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::Utc;
use fp_types::{
    PipelineRunRow, PipelineRunStatus, ScheduledRunRow, ScheduledRunStatus,
};
use serde_json::Value;
use sqlx::{Row, SqlitePool};

fn row_to_pipeline_run(row: &sqlx::sqlite::SqliteRow) -> Result<PipelineRunRow> {
    let status_raw: String = row.try_get("status")?;
    Ok(PipelineRunRow {
        id: row.try_get("id")?,
        person_id: row.try_get("person_id")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        status: PipelineRunStatus::from_str(&status_raw)?,
        breaches_found: row.try_get("breaches_found")?,
        dark_web_findings: row.try_get("dark_web_findings")?,
        accounts_found: row.try_get("accounts_found")?,
        removals_submitted: row.try_get("removals_submitted")?,
        risk_score: row.try_get("risk_score")?,
        error: row.try_get("error")?,
    })
}

pub async fn insert_pipeline_run(pool: &SqlitePool, person_id: i64) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO pipeline_runs (person_id, started_at, status) VALUES (?, ?, 'running')",
    )
    .bind(person_id)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("insert_pipeline_run failed")?;
    Ok(result.last_insert_rowid())
}

/// Terminal fields written once a pipeline run finishes (§3.1: append-only,
/// updates only fill terminal columns).
#[derive(Debug, Clone)]
pub struct PipelineRunTerminal {
    pub status: PipelineRunStatus,
    pub breaches_found: i64,
    pub dark_web_findings: i64,
    pub accounts_found: i64,
    pub removals_submitted: i64,
    pub risk_score: i64,
    pub error: Option<String>,
}

pub async fn update_pipeline_run_terminal(
    pool: &SqlitePool,
    id: i64,
    terminal: PipelineRunTerminal,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE pipeline_runs
        SET completed_at = ?, status = ?, breaches_found = ?, dark_web_findings = ?,
            accounts_found = ?, removals_submitted = ?, risk_score = ?, error = ?
        WHERE id = ?
        "#,
    )
    .bind(Utc::now())
    .bind(terminal.status.as_str())
    .bind(terminal.breaches_found)
    .bind(terminal.dark_web_findings)
    .bind(terminal.accounts_found)
    .bind(terminal.removals_submitted)
    .bind(terminal.risk_score)
    .bind(terminal.error)
    .bind(id)
    .execute(pool)
    .await
    .with_context(|| format!("update_pipeline_run_terminal({id}) failed"))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("update_pipeline_run_terminal: no pipeline run with id {id}");
    }
    Ok(())
}

pub async fn list_pipeline_runs_by_person(
    pool: &SqlitePool,
    person_id: i64,
) -> Result<Vec<PipelineRunRow>> {
    let rows = sqlx::query(
        "SELECT * FROM pipeline_runs WHERE person_id = ? ORDER BY started_at DESC",
    )
    .bind(person_id)
    .fetch_all(pool)
    .await
    .context("list_pipeline_runs_by_person failed")?;
    rows.iter().map(row_to_pipeline_run).collect()
}

fn row_to_scheduled_run(row: &sqlx::sqlite::SqliteRow) -> Result<ScheduledRunRow> {
    let status_raw: Option<String> = row.try_get("status")?;
    let details_raw: String = row.try_get("details")?;
    Ok(ScheduledRunRow {
        id: row.try_get("id")?,
        job_name: row.try_get("job_name")?,
        started_at: row.try_get("started_at")?,
        completed_at: row.try_get("completed_at")?,
        status: status_raw.map(|s| ScheduledRunStatus::from_str(&s)).transpose()?,
        details: serde_json::from_str(&details_raw).unwrap_or(Value::Null),
        error: row.try_get("error")?,
    })
}

pub async fn insert_scheduled_run(pool: &SqlitePool, job_name: &str) -> Result<i64> {
    let result = sqlx::query(
        "INSERT INTO scheduled_runs (job_name, started_at, details) VALUES (?, ?, '{}')",
    )
    .bind(job_name)
    .bind(Utc::now())
    .execute(pool)
    .await
    .context("insert_scheduled_run failed")?;
    Ok(result.last_insert_rowid())
}

pub async fn update_scheduled_run_terminal(
    pool: &SqlitePool,
    id: i64,
    status: ScheduledRunStatus,
    details: &Value,
    error: Option<&str>,
) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE scheduled_runs
        SET completed_at = ?, status = ?, details = ?, error = ?
        WHERE id = ?
        "#,
    )
    .bind(Utc::now())
    .bind(status.as_str())
    .bind(details.to_string())
    .bind(error)
    .bind(id)
    .execute(pool)
    .await
    .with_context(|| format!("update_scheduled_run_terminal({id}) failed"))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("update_scheduled_run_terminal: no scheduled run with id {id}");
    }
    Ok(())
}

/// The most recent ScheduledRun row for `job_name`, if any have run.
pub async fn last_run(pool: &SqlitePool, job_name: &str) -> Result<Option<ScheduledRunRow>> {
    let row = sqlx::query(
        "SELECT * FROM scheduled_runs WHERE job_name = ? ORDER BY started_at DESC LIMIT 1",
    )
    .bind(job_name)
    .fetch_optional(pool)
    .await
    .with_context(|| format!("last_run({job_name}) failed"))?;

    row.as_ref().map(row_to_scheduled_run).transpose()
}

/// Most recent runs across all jobs, newest first.
pub async fn history(pool: &SqlitePool, limit: i64) -> Result<Vec<ScheduledRunRow>> {
    let rows = sqlx::query("SELECT * FROM scheduled_runs ORDER BY started_at DESC LIMIT ?")
        .bind(limit)
        .fetch_all(pool)
        .await
        .context("history failed")?;
    rows.iter().map(row_to_scheduled_run).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;

    #[tokio::test]
    async fn scheduled_run_terminal_update_sets_completed_at() {
        let pool = connect_in_memory().await.unwrap();
        let id = insert_scheduled_run(&pool, "breach_recheck").await.unwrap();
        update_scheduled_run_terminal(
            &pool,
            id,
            ScheduledRunStatus::Success,
            &serde_json::json!({"new_count": 2}),
            None,
        )
        .await
        .unwrap();

        let last = last_run(&pool, "breach_recheck").await.unwrap().unwrap();
        assert_eq!(last.status, Some(ScheduledRunStatus::Success));
        assert!(last.completed_at.is_some());
        assert_eq!(last.details["new_count"], 2);
    }

    #[tokio::test]
    async fn history_returns_most_recent_first() {
        let pool = connect_in_memory().await.unwrap();
        for job in ["a", "b", "c"] {
            insert_scheduled_run(&pool, job).await.unwrap();
        }
        let hist = history(&pool, 10).await.unwrap();
        assert_eq!(hist.len(), 3);
        assert_eq!(hist[0].job_name, "c");
    }
}
