//! `protect_person`: the per-person scan-and-report composition (§4.6).
//!
//! Runs the breach, paste, and dark-web scanners for every stored email in
//! order, persists what they find, renders an exposure report, and records
//! a `PipelineRun` row. A scanner exception for one email is logged and
//! treated as empty for that email — it never fails the whole run.

use anyhow::{Context, Result};
use chrono::Utc;
use fp_types::{BreachSource, Severity};
use sqlx::SqlitePool;

/// External collaborators `protect_person` needs; bundled so callers don't
/// have to thread five parameters through.
#[derive(Clone)]
pub struct ScanClients {
    pub http: reqwest::Client,
    pub hibp_api_key: Option<String>,
    pub dehashed_api_key: Option<String>,
    pub dehashed_email: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub run_id: i64,
    pub risk_score: i64,
    pub report_markdown: String,
}

pub async fn protect_person(
    pool: &SqlitePool,
    clients: &ScanClients,
    person_id: i64,
) -> Result<PipelineOutcome> {
    let person = fp_store::get_person(pool, person_id)
        .await
        .with_context(|| format!("no person with id {person_id}"))?;

    let run_id = fp_store::insert_pipeline_run(pool, person_id)
        .await
        .context("insert_pipeline_run failed")?;

    let outcome = run_scans(pool, clients, &person).await;

    match &outcome {
        Ok((breaches_found, dark_web_findings, risk_score, _)) => {
            fp_store::update_pipeline_run_terminal(
                pool,
                run_id,
                fp_store::PipelineRunTerminal {
                    status: fp_types::PipelineRunStatus::Completed,
                    breaches_found: *breaches_found,
                    dark_web_findings: *dark_web_findings,
                    accounts_found: person.usernames.len() as i64,
                    removals_submitted: 0,
                    risk_score: *risk_score,
                    error: None,
                },
            )
            .await?;
        }
        Err(e) => {
            fp_store::update_pipeline_run_terminal(
                pool,
                run_id,
                fp_store::PipelineRunTerminal {
                    status: fp_types::PipelineRunStatus::Error,
                    breaches_found: 0,
                    dark_web_findings: 0,
                    accounts_found: person.usernames.len() as i64,
                    removals_submitted: 0,
                    risk_score: 0,
                    error: Some(e.to_string()),
                },
            )
            .await?;
            return Err(anyhow::anyhow!("protect_person failed: {e}"));
        }
    }

    let (breaches_found, dark_web_findings, risk_score, report_markdown) = outcome.unwrap();
    let _ = (breaches_found, dark_web_findings);

    Ok(PipelineOutcome {
        run_id,
        risk_score,
        report_markdown,
    })
}

async fn run_scans(
    pool: &SqlitePool,
    clients: &ScanClients,
    person: &fp_types::Person,
) -> Result<(i64, i64, i64, String)> {
    let mut breaches_found: i64 = 0;
    let mut dark_web_findings: i64 = 0;
    let mut severities: Vec<Severity> = Vec::new();
    let mut breach_findings = Vec::new();
    let mut search_exposure = Vec::new();

    for email in &person.emails {
        let breach_result = fp_scanners::breach_scan(
            &clients.http,
            email,
            clients.hibp_api_key.as_deref(),
            clients.dehashed_api_key.as_deref(),
            clients.dehashed_email.as_deref(),
        )
        .await;
        breaches_found += breach_result.totals() as i64;

        for b in &breach_result.hibp_breaches {
            severities.push(b.severity);
            fp_store::insert_breach(
                pool,
                person.id,
                &b.name,
                BreachSource::Hibp,
                b.breach_date,
                &b.data_classes,
                b.severity,
            )
            .await
            .context("insert_breach (hibp) failed")?;
            breach_findings.push(fp_report::BreachFinding {
                label: format!("{} (HIBP)", b.name),
                severity: b.severity,
                detail: b.breach_date.map(|d| format!("breached {d}")),
            });
        }

        for d in &breach_result.dehashed_records {
            severities.push(d.severity);
            fp_store::insert_breach(
                pool,
                person.id,
                &d.database_name,
                BreachSource::Dehashed,
                None,
                &[],
                d.severity,
            )
            .await
            .context("insert_breach (dehashed) failed")?;
            breach_findings.push(fp_report::BreachFinding {
                label: format!("{} (DeHashed)", d.database_name),
                severity: d.severity,
                detail: None,
            });
        }

        let pastes = fp_scanners::paste_scan(&clients.http, email, clients.hibp_api_key.as_deref()).await;
        for p in &pastes {
            severities.push(p.severity);
            fp_store::insert_breach(
                pool,
                person.id,
                &p.source,
                BreachSource::Paste,
                None,
                &[],
                p.severity,
            )
            .await
            .context("insert_breach (paste) failed")?;
            breach_findings.push(fp_report::BreachFinding {
                label: format!("Paste on {}", p.source),
                severity: p.severity,
                detail: p.title.clone(),
            });
        }

        let dark_hits = fp_scanners::ahmia_scan(&clients.http, email).await;
        dark_web_findings += dark_hits.len() as i64;
        for hit in &dark_hits {
            severities.push(hit.severity);
            let url = hit.onion_url.clone().unwrap_or_default();
            fp_store::insert_finding(
                pool,
                person.id,
                None,
                "ahmia",
                "dark_web",
                &serde_json::json!({"title": hit.title, "snippet": hit.snippet}),
                hit.severity,
                Some(&url),
            )
            .await
            .context("insert_finding (dark_web) failed")?;
            search_exposure.push(fp_report::SearchExposureFinding {
                url,
                risk: hit.severity,
            });
        }
    }

    let accounts: Vec<fp_report::AccountFinding> = person
        .usernames
        .iter()
        .map(|u| fp_report::AccountFinding {
            platform: u.clone(),
            url: None,
        })
        .collect();

    let brokers = broker_findings_from_store(pool, person.id).await?;

    let risk_score = fp_report::compute_risk_score(&severities);

    let report_markdown = fp_report::generate_exposure_report(
        &person.name,
        Utc::now().date_naive(),
        &fp_report::ExposureReportInputs {
            brokers,
            breaches: breach_findings,
            accounts,
            search_exposure,
        },
    );

    Ok((breaches_found, dark_web_findings, risk_score, report_markdown))
}

/// Broker findings come from a separate broker-scan job, not from this
/// pipeline run; this projects whatever is already stored into the
/// reporter's shape.
async fn broker_findings_from_store(
    pool: &SqlitePool,
    person_id: i64,
) -> Result<Vec<fp_report::BrokerFinding>> {
    let findings = fp_store::list_findings_by_person(pool, person_id)
        .await
        .context("list_findings_by_person failed")?;

    Ok(findings
        .into_iter()
        .filter(|f| f.finding_type == "broker" && f.status == fp_types::FindingStatus::Active)
        .map(|f| fp_report::BrokerFinding {
            broker_name: f.source,
            url: f.url.unwrap_or_default(),
            snippet: f
                .data_found
                .get("snippet")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_types::Relation;

    fn clients() -> ScanClients {
        ScanClients {
            http: reqwest::Client::new(),
            hibp_api_key: None,
            dehashed_api_key: None,
            dehashed_email: None,
        }
    }

    #[tokio::test]
    async fn missing_person_is_an_error() {
        let pool = fp_store::connect_in_memory().await.unwrap();
        let result = protect_person(&pool, &clients(), 999).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn completes_with_zero_risk_when_no_credentials_configured() {
        let pool = fp_store::connect_in_memory().await.unwrap();
        let person_id = fp_store::insert_person(
            &pool,
            "John Doe",
            Relation::SelfPerson,
            &["john@example.com".to_string()],
            &[],
            &[],
            &[],
            None,
        )
        .await
        .unwrap();

        let outcome = protect_person(&pool, &clients(), person_id).await.unwrap();
        assert_eq!(outcome.risk_score, 0);
        assert!(outcome.report_markdown.contains("No action required"));

        let runs = fp_store::list_pipeline_runs_by_person(&pool, person_id)
            .await
            .unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status, fp_types::PipelineRunStatus::Completed);
        assert!(runs[0].completed_at.is_some());
    }
}
