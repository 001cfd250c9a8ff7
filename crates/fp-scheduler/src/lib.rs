//! Periodic job runner (§4.7): a fixed table of recurring jobs, each tracked
//! as its own `ScheduledRun` history so the engine can tell what's overdue
//! without an external cron — this binary is meant to be invoked by one.

mod jobs;

pub use jobs::{JobDef, ScanClients, JOBS};

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use fp_alert::SmtpAlertConfig;
use fp_scanners::stealth::StealthBrowser;
use fp_types::ScheduledRunStatus;
use sqlx::SqlitePool;

/// One job's result after a `run_scheduled_jobs` pass.
#[derive(Debug, Clone)]
pub struct JobRunResult {
    pub job_name: &'static str,
    pub status: ScheduledRunStatus,
    pub error: Option<String>,
}

/// Exactly the jobs whose last run is absent or older than their interval —
/// a job with no prior run is always overdue.
pub async fn get_overdue_jobs(pool: &SqlitePool) -> Result<Vec<JobDef>> {
    let mut overdue = Vec::new();
    for job in JOBS {
        let last = fp_store::last_run(pool, job.name).await?;
        let is_overdue = match last {
            None => true,
            Some(run) => Utc::now() - run.started_at >= Duration::days(job.interval_days),
        };
        if is_overdue {
            overdue.push(job);
        }
    }
    Ok(overdue)
}

/// Runs every overdue job, in table order. One `ScheduledRun` row is written
/// per job with a terminal status — a job's own failure is caught and
/// recorded, never propagated, so the rest of the table still runs.
pub async fn run_scheduled_jobs<B: StealthBrowser>(
    pool: &SqlitePool,
    clients: &jobs::ScanClients,
    smtp: Option<&SmtpAlertConfig>,
    reports_dir: &Path,
    browser: &B,
) -> Result<Vec<JobRunResult>> {
    let overdue = get_overdue_jobs(pool).await?;
    let mut results = Vec::with_capacity(overdue.len());

    for job in overdue {
        let run_id = fp_store::insert_scheduled_run(pool, job.name).await?;

        let outcome = match job.name {
            "breach_recheck" => jobs::run_breach_recheck(pool, clients, smtp).await,
            "dark_web_monitor" => jobs::run_dark_web_monitor(pool, clients, smtp).await,
            "verify_removals" => jobs::run_verify_removals(pool, browser).await,
            "generate_report" => jobs::run_generate_report(pool, reports_dir).await,
            other => Err(anyhow::anyhow!("unknown job: {other}")),
        };

        let result = match outcome {
            Ok(details) => {
                fp_store::update_scheduled_run_terminal(
                    pool,
                    run_id,
                    ScheduledRunStatus::Success,
                    &details,
                    None,
                )
                .await?;
                JobRunResult {
                    job_name: job.name,
                    status: ScheduledRunStatus::Success,
                    error: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                fp_store::update_scheduled_run_terminal(
                    pool,
                    run_id,
                    ScheduledRunStatus::Failed,
                    &serde_json::json!({}),
                    Some(&message),
                )
                .await?;
                tracing::warn!(job = job.name, error = %message, "scheduled job failed");
                JobRunResult {
                    job_name: job.name,
                    status: ScheduledRunStatus::Failed,
                    error: Some(message),
                }
            }
        };
        results.push(result);
    }

    Ok(results)
}

#[derive(Debug, Clone)]
pub struct JobStatus {
    pub name: &'static str,
    pub interval_days: i64,
    pub last_run: Option<DateTime<Utc>>,
    pub next_due: Option<DateTime<Utc>>,
    pub overdue: bool,
}

/// Per-job status snapshot, in table order, for operator visibility.
pub async fn get_schedule_status(pool: &SqlitePool) -> Result<Vec<JobStatus>> {
    let mut statuses = Vec::with_capacity(JOBS.len());
    for job in JOBS {
        let last = fp_store::last_run(pool, job.name).await?;
        let last_run = last.as_ref().map(|r| r.started_at);
        let next_due = last_run.map(|t| t + Duration::days(job.interval_days));
        let overdue = match last_run {
            None => true,
            Some(t) => Utc::now() - t >= Duration::days(job.interval_days),
        };
        statuses.push(JobStatus {
            name: job.name,
            interval_days: job.interval_days,
            last_run,
            next_due,
            overdue,
        });
    }
    Ok(statuses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_scanners::FakeStealthBrowser;

    fn clients() -> jobs::ScanClients {
        jobs::ScanClients {
            http: reqwest::Client::new(),
            hibp_api_key: None,
            dehashed_api_key: None,
            dehashed_email: None,
        }
    }

    #[tokio::test]
    async fn empty_database_all_four_jobs_overdue() {
        let pool = fp_store::connect_in_memory().await.unwrap();
        let overdue = get_overdue_jobs(&pool).await.unwrap();
        assert_eq!(overdue.len(), 4);
    }

    #[tokio::test]
    async fn first_pass_writes_one_row_per_job_second_pass_writes_none() {
        let pool = fp_store::connect_in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        let browser = FakeStealthBrowser::default();

        let first = run_scheduled_jobs(&pool, &clients(), None, dir.path(), &browser)
            .await
            .unwrap();
        assert_eq!(first.len(), 4);
        for r in &first {
            assert_eq!(r.status, ScheduledRunStatus::Success);
        }
        let history = fp_store::history(&pool, 10).await.unwrap();
        assert_eq!(history.len(), 4);

        let second = run_scheduled_jobs(&pool, &clients(), None, dir.path(), &browser)
            .await
            .unwrap();
        assert_eq!(second.len(), 0);
        let history_after = fp_store::history(&pool, 10).await.unwrap();
        assert_eq!(history_after.len(), 4);
    }

    #[tokio::test]
    async fn schedule_status_reports_all_jobs_in_table_order() {
        let pool = fp_store::connect_in_memory().await.unwrap();
        let statuses = get_schedule_status(&pool).await.unwrap();
        assert_eq!(statuses.len(), 4);
        assert_eq!(statuses[0].name, "breach_recheck");
        assert_eq!(statuses[3].name, "generate_report");
        assert!(statuses.iter().all(|s| s.overdue));
    }
}
