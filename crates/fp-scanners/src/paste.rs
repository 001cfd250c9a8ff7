//! Paste scanner: HIBP's paste-account endpoint. Same empty-on-failure
//! policy as the breach scanner (§4.3, §7 category 1).

use fp_types::Severity;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
struct HibpPasteResponse {
    #[serde(rename = "Source")]
    source: String,
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "Title")]
    title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PasteHit {
    pub source: String,
    pub paste_id: Option<String>,
    pub title: Option<String>,
    pub severity: Severity,
}

pub async fn paste_scan(
    client: &reqwest::Client,
    email: &str,
    hibp_api_key: Option<&str>,
) -> Vec<PasteHit> {
    let Some(api_key) = hibp_api_key else {
        tracing::debug!("hibp paste: no api key configured, skipping");
        return Vec::new();
    };

    let url = format!(
        "https://haveibeenpwned.com/api/v3/pasteaccount/{}",
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
            tracing::warn!(error = %e, "hibp paste: request failed, treating as empty");
            return Vec::new();
        }
    };

    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return Vec::new();
    }
    if !response.status().is_success() {
        tracing::warn!(status = %response.status(), "hibp paste: non-200, treating as empty");
        return Vec::new();
    }

    let pastes: Vec<HibpPasteResponse> = match response.json().await {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!(error = %e, "hibp paste: malformed response, treating as empty");
            return Vec::new();
        }
    };

    pastes
        .into_iter()
        .map(|p| PasteHit {
            source: p.source,
            paste_id: p.id,
            title: p.title,
            severity: fp_types::severity_rules::paste_severity(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_yields_empty_result() {
        let client = reqwest::Client::new();
        let result = paste_scan(&client, "john@example.com", None).await;
        assert!(result.is_empty());
    }
}
