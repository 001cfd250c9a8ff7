//! Ahmia clearnet index scanner: a single GET against the search mirror and
//! a tolerant regex pass over the result list markup (§4.3). Ahmia's HTML is
//! not a stable public contract, so the scrape is deliberately forgiving —
//! a markup change yields zero hits rather than a parse error.

use fp_types::Severity;

#[derive(Debug, Clone)]
pub struct DarkWebHit {
    pub title: String,
    pub snippet: String,
    pub onion_url: Option<String>,
    pub severity: Severity,
}

const RESULT_PATTERN: &str =
    r#"(?s)<li[^>]*class="result"[^>]*>.*?<h4>\s*<a[^>]*href="([^"]*)"[^>]*>(.*?)</a>\s*</h4>.*?<p[^>]*>(.*?)</p>"#;

pub async fn ahmia_scan(client: &reqwest::Client, query: &str) -> Vec<DarkWebHit> {
    let url = format!(
        "https://ahmia.fi/search/?q={}",
        crate::urlencode::encode(query)
    );

    let response = match client
        .get(&url)
        .header("user-agent", "digital-footprint-protection-engine")
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "ahmia: request failed, treating as empty");
            return Vec::new();
        }
    };

    if !response.status().is_success() {
        tracing::warn!(status = %response.status(), "ahmia: non-200, treating as empty");
        return Vec::new();
    }

    let body = match response.text().await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(error = %e, "ahmia: failed to read body, treating as empty");
            return Vec::new();
        }
    };

    parse_results(&body)
}

fn parse_results(html: &str) -> Vec<DarkWebHit> {
    let re = match regex::Regex::new(RESULT_PATTERN) {
        Ok(re) => re,
        Err(_) => return Vec::new(),
    };

    re.captures_iter(html)
        .map(|c| {
            let onion_url = c.get(1).map(|m| strip_tags(m.as_str())).filter(|s| !s.is_empty());
            let title = strip_tags(&c[2]);
            let snippet = strip_tags(&c[3]);
            let severity = fp_types::severity_rules::dark_web_severity(&format!("{title} {snippet}"));
            DarkWebHit {
                title,
                snippet,
                onion_url,
                severity,
            }
        })
        .collect()
}

fn strip_tags(s: &str) -> String {
    let re = regex::Regex::new(r"<[^>]+>").unwrap();
    re.replace_all(s, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        <ol>
        <li class="result">
            <h4><a href="http://redirect.ahmia.fi/abc.onion">Password dump for John Doe</a></h4>
            <p>leaked credentials posted to a forum</p>
        </li>
        <li class="result">
            <h4><a href="http://redirect.ahmia.fi/def.onion">Random forum thread</a></h4>
            <p>unrelated discussion</p>
        </li>
        </ol>
    "#;

    #[test]
    fn parses_well_formed_result_list() {
        let hits = parse_results(SAMPLE);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Password dump for John Doe");
        assert_eq!(hits[0].severity, Severity::Critical);
        assert_eq!(hits[1].severity, Severity::High);
    }

    #[test]
    fn malformed_markup_yields_no_hits() {
        let hits = parse_results("<html><body>no results here</body></html>");
        assert!(hits.is_empty());
    }
}
