//! `digital-footprint` — run-once scheduler entry point.
//!
//! Resolves configuration, re-upserts the broker registry, runs every
//! overdue job, and prints the resulting schedule status. Invoked by an
//! external cron; exits 1 if any job's terminal status was `failed` so the
//! invoking scheduler can alert on it.

use anyhow::Context;
use fp_scanners::FakeStealthBrowser;
use fp_types::ScheduledRunStatus;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    init_tracing();

    let config = fp_config::resolve_from_env().context("resolve configuration")?;
    let pool = fp_store::connect(&config.db_path)
        .await
        .context("connect to store")?;

    let registry_dir = config.broker_registry_dir();
    std::fs::create_dir_all(&registry_dir).context("create broker registry dir")?;
    let registry_report = fp_registry::load_registry(&pool, &registry_dir)
        .await
        .context("load broker registry")?;
    tracing::info!(
        upserted = registry_report.upserted_count(),
        "broker registry re-upserted"
    );

    let clients = fp_scheduler::ScanClients {
        http: reqwest::Client::new(),
        hibp_api_key: config.secrets.hibp_api_key.clone(),
        dehashed_api_key: config.secrets.dehashed_api_key.clone(),
        dehashed_email: config.secrets.dehashed_email.clone(),
    };

    let smtp_alert = config.smtp.as_ref().and_then(|smtp| {
        Some(fp_alert::SmtpAlertConfig {
            host: smtp.host.clone(),
            port: smtp.port,
            user: smtp.user.clone()?,
            password: config.secrets.smtp_password.clone()?,
            alert_email: config.alert_email.clone()?,
        })
    });

    // The real stealth-browser automation engine is an out-of-scope external
    // collaborator; the scheduler drives the same trait-bound jobs against
    // the deterministic fake until a concrete driver is wired in.
    let browser = FakeStealthBrowser::default();

    let results = fp_scheduler::run_scheduled_jobs(
        &pool,
        &clients,
        smtp_alert.as_ref(),
        &config.reports_dir(),
        &browser,
    )
    .await
    .context("run scheduled jobs")?;

    for r in &results {
        match &r.error {
            Some(e) => tracing::warn!(job = r.job_name, error = %e, "job failed"),
            None => tracing::info!(job = r.job_name, "job succeeded"),
        }
    }

    let status = fp_scheduler::get_schedule_status(&pool)
        .await
        .context("get schedule status")?;
    for job in &status {
        println!(
            "{:<20} interval={}d last_run={:?} next_due={:?} overdue={}",
            job.name, job.interval_days, job.last_run, job.next_due, job.overdue
        );
    }

    let any_failed = results
        .iter()
        .any(|r| r.status == ScheduledRunStatus::Failed);
    std::process::exit(if any_failed { 1 } else { 0 });
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
