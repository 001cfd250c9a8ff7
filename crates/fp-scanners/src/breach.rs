//! Breach scanner: HIBP breached-account endpoint, then DeHashed search.
//!
//! Missing credentials, network failure, and any non-404/non-200 response
//! all collapse to an empty result for that source — never an error (§4.3,
//! §7 category 1/2).

use chrono::NaiveDate;
use fp_types::Severity;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct HibpBreachResponse {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "BreachDate")]
    breach_date: Option<NaiveDate>,
    #[serde(rename = "DataClasses")]
    data_classes: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HibpBreach {
    pub name: String,
    pub breach_date: Option<NaiveDate>,
    pub data_classes: Vec<String>,
    pub severity: Severity,
}

#[derive(Debug, Clone, Deserialize)]
struct DehashedSearchResponse {
    #[serde(default)]
    entries: Vec<DehashedEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct DehashedEntry {
    #[serde(default)]
    database_name: String,
    #[serde(default)]
    password: Option<String>,
    #[serde(default)]
    hashed_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DehashedRecord {
    pub database_name: String,
    pub has_plaintext_password: bool,
    pub has_hashed_password: bool,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default)]
pub struct BreachScanResult {
    pub hibp_breaches: Vec<HibpBreach>,
    pub dehashed_records: Vec<DehashedRecord>,
}

impl BreachScanResult {
    pub fn totals(&self) -> usize {
        self.hibp_breaches.len() + self.dehashed_records.len()
    }
}

/// `hibp_api_key` absent -> empty HIBP result (no credentials).
/// `dehashed_api_key`/`dehashed_email` absent -> empty DeHashed result.
pub async fn breach_scan(
    client: &reqwest::Client,
    email: &str,
    hibp_api_key: Option<&str>,
    dehashed_api_key: Option<&str>,
    dehashed_email: Option<&str>,
) -> BreachScanResult {
    let hibp_breaches = scan_hibp(client, email, hibp_api_key).await;
    let dehashed_records = scan_dehashed(client, email, dehashed_api_key, dehashed_email).await;

    BreachScanResult {
        hibp_breaches,
        dehashed_records,
    }
}

async fn scan_hibp(
    client: &reqwest::Client,
    email: &str,
    hibp_api_key: Option<&str>,
) -> Vec<HibpBreach> {
    let Some(api_key) = hibp_api_key else {
        tracing::debug!("hibp: no api key configured, skipping");
        return Vec::new();
    };

    let url = format!(
        "https://haveibeenpwned.com/api/v3/breachedaccount/{}",
        crate::urlencode::encode(email)
    );

    let response = match client
        .get(&url)
        .header("hibp-api-key", api_key)
        .header("user-agent", "digital-footprint-protection-engine")
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "hibp: request failed, treating as empty");
            return Vec::new();
        }
    };

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Vec::new();
    }
    if !response.status().is_success() {
        tracing::warn!(status = %response.status(), "hibp: non-200, treating as empty");
        return Vec::new();
    }

    let breaches: Vec<HibpBreachResponse> = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "hibp: malformed response, treating as empty");
            return Vec::new();
        }
    };

    breaches
        .into_iter()
        .map(|b| {
            let severity = fp_types::severity_rules::breach_severity(&b.data_classes);
            HibpBreach {
                name: b.name,
                breach_date: b.breach_date,
                data_classes: b.data_classes,
                severity,
            }
        })
        .collect()
}

async fn scan_dehashed(
    client: &reqwest::Client,
    email: &str,
    dehashed_api_key: Option<&str>,
    dehashed_email: Option<&str>,
) -> Vec<DehashedRecord> {
    let (Some(api_key), Some(account_email)) = (dehashed_api_key, dehashed_email) else {
        tracing::debug!("dehashed: no credentials configured, skipping");
        return Vec::new();
    };

    let url = format!(
        "https://api.dehashed.com/search?query=email:{}",
        crate::urlencode::encode(email)
    );

    let response = match client
        .get(&url)
        .basic_auth(account_email, Some(api_key))
        .header("accept", "application/json")
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "dehashed: request failed, treating as empty");
            return Vec::new();
        }
    };

    if !response.status().is_success() {
        tracing::warn!(status = %response.status(), "dehashed: non-200, treating as empty");
        return Vec::new();
    }

    let parsed: DehashedSearchResponse = match response.json().await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "dehashed: malformed response, treating as empty");
            return Vec::new();
        }
    };

    parsed
        .entries
        .into_iter()
        .map(|e| {
            let has_plaintext = e.password.as_deref().is_some_and(|p| !p.is_empty());
            let has_hashed = e.hashed_password.as_deref().is_some_and(|p| !p.is_empty());
            DehashedRecord {
                database_name: e.database_name,
                has_plaintext_password: has_plaintext,
                has_hashed_password: has_hashed,
                severity: fp_types::severity_rules::dehashed_severity(has_plaintext, has_hashed),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_credentials_yield_empty_result() {
        let client = reqwest::Client::new();
        let result = breach_scan(&client, "john@example.com", None, None, None).await;
        assert_eq!(result.totals(), 0);
    }
}
