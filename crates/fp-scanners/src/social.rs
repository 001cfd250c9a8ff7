//! Social profile auditor: loads a profile URL through the stealth browser,
//! resolves the platform from the host, and flags PII visible on the public
//! page (§4.3).

use crate::stealth::{with_page, StealthBrowser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Twitter,
    Github,
    Instagram,
    LinkedIn,
    Reddit,
    TikTok,
    Facebook,
    Unknown,
}

impl Platform {
    fn from_host(host: &str) -> Self {
        let host = host.trim_start_matches("www.");
        match host {
            "twitter.com" | "x.com" => Platform::Twitter,
            "github.com" => Platform::Github,
            "instagram.com" => Platform::Instagram,
            "linkedin.com" => Platform::LinkedIn,
            "reddit.com" => Platform::Reddit,
            "tiktok.com" => Platform::TikTok,
            "facebook.com" => Platform::Facebook,
            _ => Platform::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Github => "github",
            Platform::Instagram => "instagram",
            Platform::LinkedIn => "linkedin",
            Platform::Reddit => "reddit",
            Platform::TikTok => "tiktok",
            Platform::Facebook => "facebook",
            Platform::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SocialAudit {
    pub platform: Option<String>,
    pub real_name_visible: bool,
    pub email_visible: bool,
    pub phone_visible: bool,
    pub location_visible: bool,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
}

const EMAIL_PATTERN: &str = r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}";
const PHONE_PATTERN: &str = r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b";
const LOCATION_PHRASES: [&str; 4] = ["located in", "based in", "lives in", "from "];

pub async fn social_audit<B: StealthBrowser>(
    browser: &B,
    profile_url: &str,
    full_name: &str,
) -> anyhow::Result<SocialAudit> {
    let platform = host_of(profile_url).map(|h| Platform::from_host(&h).as_str().to_string());
    let _ = full_name;

    with_page(browser, profile_url, move |page| async move {
        let og_title = meta_value(&page.meta_tags, "og:title");
        let og_description = meta_value(&page.meta_tags, "og:description");

        let all_text = format!(
            "{} {} {}",
            page.body_text,
            og_title.as_deref().unwrap_or(""),
            og_description.as_deref().unwrap_or(""),
        );
        let all_text_lower = all_text.to_ascii_lowercase();

        let email_re = regex::Regex::new(EMAIL_PATTERN).expect("static pattern");
        let phone_re = regex::Regex::new(PHONE_PATTERN).expect("static pattern");

        let real_name_visible = og_title
            .as_deref()
            .map(|title| title.contains(' ') && title.chars().next().is_some_and(char::is_uppercase))
            .unwrap_or(false);

        Ok(SocialAudit {
            platform,
            real_name_visible,
            email_visible: email_re.is_match(&all_text),
            phone_visible: phone_re.is_match(&all_text),
            location_visible: LOCATION_PHRASES.iter().any(|p| all_text_lower.contains(p)),
            og_title,
            og_description,
        })
    })
    .await
}

fn meta_value(tags: &[(String, String)], key: &str) -> Option<String> {
    tags.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.clone())
}

fn host_of(url: &str) -> Option<String> {
    let without_scheme = url.split_once("://").map(|(_, rest)| rest).unwrap_or(url);
    let host = without_scheme.split(['/', '?', '#']).next()?;
    Some(host.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stealth::FakeStealthBrowser;

    #[tokio::test]
    async fn flags_real_name_and_email_visibility() {
        let browser = FakeStealthBrowser {
            html: r#"<html><head>
                <meta property="og:title" content="John Doe" />
            </head><body>John Doe - contact me at john.doe@example.com, lives in Austin</body></html>"#
                .into(),
            ..Default::default()
        };
        let audit = social_audit(&browser, "https://www.facebook.com/john.doe", "John Doe")
            .await
            .unwrap();
        assert!(audit.real_name_visible);
        assert!(audit.email_visible);
        assert!(audit.location_visible);
        assert_eq!(audit.og_title.as_deref(), Some("John Doe"));
        assert_eq!(audit.platform.as_deref(), Some("facebook"));
    }

    #[tokio::test]
    async fn no_pii_markers_on_sparse_profile() {
        let browser = FakeStealthBrowser {
            html: "<html><body>private account</body></html>".into(),
            ..Default::default()
        };
        let audit = social_audit(&browser, "https://www.instagram.com/janedoe", "Jane Doe")
            .await
            .unwrap();
        assert!(!audit.real_name_visible);
        assert!(!audit.email_visible);
        assert!(!audit.phone_visible);
        assert_eq!(audit.platform.as_deref(), Some("instagram"));
    }

    #[tokio::test]
    async fn detects_pii_present_only_in_meta_description() {
        let browser = FakeStealthBrowser {
            html: r#"<html><head>
                <meta property="og:title" content="janedoe" />
                <meta property="og:description" content="Reach me at 512-555-0199 or based in Denver" />
            </head><body>bio is empty</body></html>"#
                .into(),
            ..Default::default()
        };
        let audit = social_audit(&browser, "https://x.com/janedoe", "Jane Doe")
            .await
            .unwrap();
        assert!(audit.phone_visible);
        assert!(audit.location_visible);
        assert!(!audit.real_name_visible);
        assert_eq!(audit.platform.as_deref(), Some("twitter"));
    }

    #[tokio::test]
    async fn unrecognized_host_yields_unknown_platform() {
        let browser = FakeStealthBrowser::default();
        let audit = social_audit(&browser, "https://example.net/janedoe", "Jane Doe")
            .await
            .unwrap();
        assert_eq!(audit.platform.as_deref(), Some("unknown"));
    }
}
