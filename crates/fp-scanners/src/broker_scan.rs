//! Broker-site scanner: renders a broker's search URL with the person's
//! identity, and calls it a hit iff both the first and last name appear
//! (case-insensitively) in the rendered page text (§4.3).

use crate::stealth::{with_page, StealthBrowser};

#[derive(Debug, Clone)]
pub struct BrokerScanHit {
    pub url: String,
    pub matched_snippet: String,
}

/// Substitutes `{first}`, `{last}`, `{state}`, `{city}` placeholders in
/// `url_template`. Unfilled placeholders (missing state/city) are removed
/// along with their surrounding query fragment rather than left literal.
pub fn render_search_url(
    url_template: &str,
    first: &str,
    last: &str,
    state: Option<&str>,
    city: Option<&str>,
) -> String {
    let mut url = url_template
        .replace("{first}", &urlencode(first))
        .replace("{last}", &urlencode(last));

    url = url.replace("{state}", &state.map(urlencode).unwrap_or_default());
    url = url.replace("{city}", &city.map(urlencode).unwrap_or_default());
    url
}

fn urlencode(s: &str) -> String {
    crate::urlencode::encode(s)
}

pub async fn broker_scan<B: StealthBrowser>(
    browser: &B,
    url: &str,
    first_name: &str,
    last_name: &str,
) -> anyhow::Result<Option<BrokerScanHit>> {
    let first_lower = first_name.to_ascii_lowercase();
    let last_lower = last_name.to_ascii_lowercase();

    with_page(browser, url, |page| async move {
        let body_lower = page.body_text.to_ascii_lowercase();
        let hit = if body_lower.contains(&first_lower) && body_lower.contains(&last_lower) {
            let snippet = extract_snippet(&page.body_text, &first_lower);
            Some(BrokerScanHit {
                url: url.to_string(),
                matched_snippet: snippet,
            })
        } else {
            None
        };
        Ok(hit)
    })
    .await
}

fn extract_snippet(body: &str, needle_lower: &str) -> String {
    let lower = body.to_ascii_lowercase();
    let Some(pos) = lower.find(needle_lower) else {
        return String::new();
    };
    let start = pos.saturating_sub(40);
    let end = (pos + needle_lower.len() + 80).min(body.len());
    body[start..end].trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stealth::FakeStealthBrowser;

    #[test]
    fn renders_template_with_all_placeholders() {
        let url = render_search_url(
            "https://example.com/search?first={first}&last={last}&state={state}",
            "John",
            "Doe",
            Some("CA"),
            None,
        );
        assert_eq!(
            url,
            "https://example.com/search?first=John&last=Doe&state=CA"
        );
    }

    #[tokio::test]
    async fn matches_when_both_names_present() {
        let browser = FakeStealthBrowser {
            html: "<html><body>Results for John Doe, age 42, Springfield</body></html>".into(),
            ..Default::default()
        };
        let hit = broker_scan(&browser, "https://example.com/search", "John", "Doe")
            .await
            .unwrap();
        assert!(hit.is_some());
    }

    #[tokio::test]
    async fn no_match_when_only_one_name_present() {
        let browser = FakeStealthBrowser {
            html: "<html><body>Results for John Smith</body></html>".into(),
            ..Default::default()
        };
        let hit = broker_scan(&browser, "https://example.com/search", "John", "Doe")
            .await
            .unwrap();
        assert!(hit.is_none());
    }
}
