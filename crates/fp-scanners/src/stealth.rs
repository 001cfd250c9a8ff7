//! Stealth browser contract.
//!
//! The concrete automation engine (driver process management, real page
//! navigation, fingerprint evasion) is an external collaborator and out of
//! scope: the core only depends on this trait. Every scanner that opens a
//! page must release it via the scoped-acquisition pattern in
//! `with_page` so a crash mid-scan can never leak a browser process.

use async_trait::async_trait;

/// One loaded page, as seen by the scanners that read it.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    pub body_text: String,
    pub html: String,
    /// OpenGraph-style `<meta property="..." content="...">` pairs.
    pub meta_tags: Vec<(String, String)>,
}

/// A headless-browser session, opened once per scan and always closed on
/// every exit path (success, error, or timeout).
#[async_trait]
pub trait StealthBrowser: Send + Sync {
    async fn open(&self, url: &str) -> anyhow::Result<PageContent>;

    async fn fill_and_submit(
        &self,
        url: &str,
        fields: &[(&str, &str)],
    ) -> anyhow::Result<FormSubmitOutcome>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormSubmitOutcome {
    Submitted,
    FilledNotSubmitted { fields_filled: usize },
    NoFormFound,
}

/// Run `op` against a freshly opened page, guaranteeing the browser handle
/// is dropped afterward regardless of how `op` returns. `StealthBrowser`
/// implementations own their own process/context cleanup in `Drop`; this
/// helper exists so callers never hold a page across an `await` boundary
/// longer than the scan itself requires.
pub async fn with_page<B, F, Fut, T>(browser: &B, url: &str, op: F) -> anyhow::Result<T>
where
    B: StealthBrowser,
    F: FnOnce(PageContent) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    let page = browser.open(url).await?;
    op(page).await
}

/// Deterministic in-memory fake used by scanner unit tests. Construct with
/// the HTML a scenario needs and no process is ever spawned.
#[derive(Debug, Clone, Default)]
pub struct FakeStealthBrowser {
    pub html: String,
    pub submit_outcome: FormSubmitOutcome,
}

impl Default for FormSubmitOutcome {
    fn default() -> Self {
        FormSubmitOutcome::NoFormFound
    }
}

#[async_trait]
impl StealthBrowser for FakeStealthBrowser {
    async fn open(&self, _url: &str) -> anyhow::Result<PageContent> {
        Ok(PageContent {
            body_text: strip_tags(&self.html),
            html: self.html.clone(),
            meta_tags: extract_meta_tags(&self.html),
        })
    }

    async fn fill_and_submit(
        &self,
        _url: &str,
        _fields: &[(&str, &str)],
    ) -> anyhow::Result<FormSubmitOutcome> {
        Ok(self.submit_outcome)
    }
}

fn strip_tags(html: &str) -> String {
    let re = regex::Regex::new(r"<[^>]+>").unwrap();
    re.replace_all(html, " ").to_string()
}

fn extract_meta_tags(html: &str) -> Vec<(String, String)> {
    let re = regex::Regex::new(
        r#"<meta\s+property="([^"]+)"\s+content="([^"]*)"\s*/?>"#,
    )
    .unwrap();
    re.captures_iter(html)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect()
}
