//! The fixed job table and each job's body (§4.7).

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use fp_alert::SmtpAlertConfig;
use fp_scanners::stealth::StealthBrowser;
use serde_json::{json, Value};
use sqlx::SqlitePool;

#[derive(Debug, Clone, Copy)]
pub struct JobDef {
    pub name: &'static str,
    pub interval_days: i64,
}

/// Closed set, in table order — `run_scheduled_jobs` iterates exactly this.
pub const JOBS: [JobDef; 4] = [
    JobDef {
        name: "breach_recheck",
        interval_days: 7,
    },
    JobDef {
        name: "dark_web_monitor",
        interval_days: 3,
    },
    JobDef {
        name: "verify_removals",
        interval_days: 1,
    },
    JobDef {
        name: "generate_report",
        interval_days: 7,
    },
];

#[derive(Clone)]
pub struct ScanClients {
    pub http: reqwest::Client,
    pub hibp_api_key: Option<String>,
    pub dehashed_api_key: Option<String>,
    pub dehashed_email: Option<String>,
}

/// `previous_count` for the alerter is the prior `ScheduledRun`'s
/// `details.new_count` for the same job, defaulting to 0 when absent — an
/// explicit resolution of the source's inconsistent "previous_count" usage.
async fn previous_new_count(pool: &SqlitePool, job_name: &str) -> Result<i64> {
    let last = fp_store::last_run(pool, job_name).await?;
    Ok(last
        .and_then(|r| r.details.get("new_count").and_then(|v| v.as_i64()))
        .unwrap_or(0))
}

pub async fn run_breach_recheck(
    pool: &SqlitePool,
    clients: &ScanClients,
    smtp: Option<&SmtpAlertConfig>,
) -> Result<Value> {
    let previous_count = previous_new_count(pool, "breach_recheck").await?;
    let persons = fp_store::list_persons(pool).await.context("list_persons failed")?;

    let mut total_new = 0i64;
    let mut persons_scanned = 0i64;

    for person in persons.iter().filter(|p| !p.emails.is_empty()) {
        let email = &person.emails[0];
        let result = fp_scanners::breach_scan(
            &clients.http,
            email,
            clients.hibp_api_key.as_deref(),
            clients.dehashed_api_key.as_deref(),
            clients.dehashed_email.as_deref(),
        )
        .await;
        let new_count = result.totals() as i64;
        total_new += new_count;
        persons_scanned += 1;

        fp_alert::check_and_alert(smtp, &person.name, "breach_recheck", new_count, previous_count).await;
    }

    Ok(json!({"new_count": total_new, "persons_scanned": persons_scanned}))
}

pub async fn run_dark_web_monitor(
    pool: &SqlitePool,
    clients: &ScanClients,
    smtp: Option<&SmtpAlertConfig>,
) -> Result<Value> {
    let previous_count = previous_new_count(pool, "dark_web_monitor").await?;
    let persons = fp_store::list_persons(pool).await.context("list_persons failed")?;

    let mut total_new = 0i64;
    let mut persons_scanned = 0i64;

    for person in persons.iter().filter(|p| !p.emails.is_empty()) {
        let email = &person.emails[0];
        let hits = fp_scanners::ahmia_scan(&clients.http, email).await;
        let new_count = hits.len() as i64;
        total_new += new_count;
        persons_scanned += 1;

        fp_alert::check_and_alert(smtp, &person.name, "dark_web_monitor", new_count, previous_count).await;
    }

    Ok(json!({"new_count": total_new, "persons_scanned": persons_scanned}))
}

pub async fn run_verify_removals<B: StealthBrowser>(pool: &SqlitePool, browser: &B) -> Result<Value> {
    let outcomes = fp_removal::verify_pending_removals(pool, browser)
        .await
        .context("verify_pending_removals failed")?;

    let confirmed = outcomes.iter().filter(|o| o.confirmed).count() as i64;
    let still_found = outcomes.len() as i64 - confirmed;

    Ok(json!({
        "checked": outcomes.len(),
        "confirmed": confirmed,
        "still_found": still_found,
    }))
}

pub async fn run_generate_report(pool: &SqlitePool, reports_dir: &Path) -> Result<Value> {
    std::fs::create_dir_all(reports_dir)
        .with_context(|| format!("create_dir_all {:?}", reports_dir))?;

    let persons = fp_store::list_persons(pool).await.context("list_persons failed")?;
    let today = Utc::now().date_naive();
    let mut reports_written = 0i64;

    for person in &persons {
        let markdown = render_stored_report(pool, person).await?;
        let slug = slugify(&person.name);
        let path = reports_dir.join(format!("{today}-{slug}.md"));
        std::fs::write(&path, markdown).with_context(|| format!("write {:?}", path))?;
        reports_written += 1;
    }

    Ok(json!({"reports_written": reports_written}))
}

async fn render_stored_report(pool: &SqlitePool, person: &fp_types::Person) -> Result<String> {
    let breaches = fp_store::list_breaches_by_person(pool, person.id).await?;
    let findings = fp_store::list_findings_by_person(pool, person.id).await?;

    let breach_findings: Vec<fp_report::BreachFinding> = breaches
        .into_iter()
        .map(|b| fp_report::BreachFinding {
            label: b.breach_name,
            severity: b.severity,
            detail: b.breach_date.map(|d| format!("breached {d}")),
        })
        .collect();

    let brokers: Vec<fp_report::BrokerFinding> = findings
        .iter()
        .filter(|f| f.finding_type == "broker" && f.status == fp_types::FindingStatus::Active)
        .map(|f| fp_report::BrokerFinding {
            broker_name: f.source.clone(),
            url: f.url.clone().unwrap_or_default(),
            snippet: f
                .data_found
                .get("snippet")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
        .collect();

    let search_exposure: Vec<fp_report::SearchExposureFinding> = findings
        .iter()
        .filter(|f| f.finding_type == "dark_web" && f.status == fp_types::FindingStatus::Active)
        .map(|f| fp_report::SearchExposureFinding {
            url: f.url.clone().unwrap_or_default(),
            risk: f.risk_level,
        })
        .collect();

    let accounts: Vec<fp_report::AccountFinding> = person
        .usernames
        .iter()
        .map(|u| fp_report::AccountFinding {
            platform: u.clone(),
            url: None,
        })
        .collect();

    Ok(fp_report::generate_exposure_report(
        &person.name,
        Utc::now().date_naive(),
        &fp_report::ExposureReportInputs {
            brokers,
            breaches: breach_findings,
            accounts,
            search_exposure,
        },
    ))
}

fn slugify(name: &str) -> String {
    name.trim()
        .to_ascii_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_whitespace_and_punctuation() {
        assert_eq!(slugify("John Doe"), "john-doe");
        assert_eq!(slugify("  Mary-Jane O'Brien "), "mary-jane-o-brien");
    }
}
