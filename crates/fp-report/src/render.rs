//! Markdown exposure report rendering (§4.4). Input shapes here are the
//! reporter's own normalized view, distinct from any individual scanner's
//! raw output — the pipeline is responsible for projecting scan results
//! into these before calling `generate_exposure_report`.

use chrono::NaiveDate;
use fp_types::Severity;

use crate::risk::{compute_risk_score, risk_label};

#[derive(Debug, Clone)]
pub struct BrokerFinding {
    pub broker_name: String,
    pub url: String,
    pub snippet: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BreachFinding {
    pub label: String,
    pub severity: Severity,
    pub detail: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AccountFinding {
    pub platform: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchExposureFinding {
    pub url: String,
    pub risk: Severity,
}

#[derive(Debug, Clone, Default)]
pub struct ExposureReportInputs {
    pub brokers: Vec<BrokerFinding>,
    pub breaches: Vec<BreachFinding>,
    pub accounts: Vec<AccountFinding>,
    pub search_exposure: Vec<SearchExposureFinding>,
}

pub fn generate_exposure_report(
    person_name: &str,
    report_date: NaiveDate,
    inputs: &ExposureReportInputs,
) -> String {
    let severities: Vec<Severity> = inputs
        .breaches
        .iter()
        .map(|b| b.severity)
        .chain(inputs.search_exposure.iter().map(|s| s.risk))
        .collect();
    let score = compute_risk_score(&severities);
    let label = risk_label(score);

    let mut out = String::new();
    out.push_str(&format!("# Digital Footprint Exposure Report — {person_name}\n\n"));
    out.push_str(&format!("**Date:** {report_date}\n"));
    out.push_str(&format!("**Risk score:** {score}/100 ({label})\n\n"));

    out.push_str("## Data Brokers\n\n");
    if inputs.brokers.is_empty() {
        out.push_str("No broker listings found.\n\n");
    } else {
        for b in &inputs.brokers {
            match &b.snippet {
                Some(snippet) => out.push_str(&format!("- [{}]({}) — {snippet}\n", b.broker_name, b.url)),
                None => out.push_str(&format!("- [{}]({})\n", b.broker_name, b.url)),
            }
        }
        out.push('\n');
    }

    out.push_str("## Breaches & Leaks\n\n");
    if inputs.breaches.is_empty() {
        out.push_str("No breaches or leaks found.\n\n");
    } else {
        for b in &inputs.breaches {
            match &b.detail {
                Some(detail) => out.push_str(&format!("- **{}** ({}) — {detail}\n", b.label, b.severity)),
                None => out.push_str(&format!("- **{}** ({})\n", b.label, b.severity)),
            }
        }
        out.push('\n');
    }

    out.push_str("## Accounts Found\n\n");
    if inputs.accounts.is_empty() {
        out.push_str("No accounts found.\n\n");
    } else {
        for a in &inputs.accounts {
            match &a.url {
                Some(url) => out.push_str(&format!("- [{}]({url})\n", a.platform)),
                None => out.push_str(&format!("- {}\n", a.platform)),
            }
        }
        out.push('\n');
    }

    out.push_str("## Search Exposure\n\n");
    if inputs.search_exposure.is_empty() {
        out.push_str("No search exposure found.\n\n");
    } else {
        for s in &inputs.search_exposure {
            out.push_str(&format!("- {} ({})\n", s.url, s.risk));
        }
        out.push('\n');
    }

    out.push_str("## Recommendations\n\n");
    let mut recommendations = Vec::new();
    if !inputs.brokers.is_empty() {
        recommendations.push("Submit opt-out requests to the listed data brokers.");
    }
    if !inputs.breaches.is_empty() {
        recommendations.push("Change passwords for any accounts tied to the breached credentials.");
    }
    if !inputs.accounts.is_empty() {
        recommendations.push("Review privacy settings on the discovered accounts.");
    }
    if !inputs.search_exposure.is_empty() {
        recommendations.push("Request removal of high-risk search results (pastes, leaked documents).");
    }
    if recommendations.is_empty() {
        out.push_str("No action required at this time.\n");
    } else {
        for r in recommendations {
            out.push_str(&format!("- {r}\n"));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    }

    #[test]
    fn sections_render_in_fixed_order() {
        let inputs = ExposureReportInputs {
            brokers: vec![BrokerFinding {
                broker_name: "ExampleBroker".into(),
                url: "https://example.com".into(),
                snippet: None,
            }],
            breaches: vec![BreachFinding {
                label: "ExampleBreach".into(),
                severity: Severity::High,
                detail: None,
            }],
            accounts: vec![AccountFinding {
                platform: "Twitter".into(),
                url: None,
            }],
            search_exposure: vec![SearchExposureFinding {
                url: "https://pastebin.com/abc".into(),
                risk: Severity::High,
            }],
        };
        let report = generate_exposure_report("John Doe", date(), &inputs);

        let broker_pos = report.find("## Data Brokers").unwrap();
        let breach_pos = report.find("## Breaches & Leaks").unwrap();
        let account_pos = report.find("## Accounts Found").unwrap();
        let search_pos = report.find("## Search Exposure").unwrap();
        assert!(broker_pos < breach_pos);
        assert!(breach_pos < account_pos);
        assert!(account_pos < search_pos);
    }

    #[test]
    fn empty_categories_suppress_their_recommendation() {
        let inputs = ExposureReportInputs::default();
        let report = generate_exposure_report("Jane Doe", date(), &inputs);
        assert!(report.contains("No action required at this time."));
    }
}
