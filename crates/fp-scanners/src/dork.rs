//! Search-engine dork query generation and URL risk tagging (§4.3,
//! scenario S5). Pure, no I/O — the actual query execution belongs to
//! whatever search API the pipeline wires in.

use fp_types::Severity;

const PASTE_HOSTS: [&str; 6] = [
    "pastebin.com",
    "paste.ee",
    "ghostbin.com",
    "hastebin.com",
    "doxbin.com",
    "doxbin.org",
];
const HIGH_RISK_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// Fixed-order dork set: name-only, name+email, `site:pastebin.com "email"`,
/// bare email, name+phone, bare phone, name+address, then the two
/// document-filetype dorks. Each optional-field dork is omitted entirely
/// when that field is absent.
pub fn build_dork_queries(
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
    address: Option<&str>,
) -> Vec<String> {
    let mut queries = vec![format!("\"{name}\"")];

    if let Some(email) = email {
        queries.push(format!("\"{name}\" \"{email}\""));
        queries.push(format!("site:pastebin.com \"{email}\""));
        queries.push(format!("\"{email}\""));
    }

    if let Some(phone) = phone {
        queries.push(format!("\"{name}\" \"{phone}\""));
        queries.push(format!("\"{phone}\""));
    }

    if let Some(address) = address {
        queries.push(format!("\"{name}\" \"{address}\""));
    }

    queries.push(format!("filetype:pdf \"{name}\""));
    queries.push(format!("filetype:xls \"{name}\""));

    queries
}

pub fn tag_url_risk(url: &str) -> Severity {
    let lower = url.to_ascii_lowercase();
    let host = lower
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&lower)
        .split(['/', '?', '#'])
        .next()
        .unwrap_or("");

    let is_paste_host = PASTE_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{h}")));
    let is_high_risk_doc = lower
        .rsplit('.')
        .next()
        .map(|ext| HIGH_RISK_EXTENSIONS.contains(&ext))
        .unwrap_or(false);

    if is_paste_host || is_high_risk_doc {
        Severity::High
    } else {
        Severity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_queries_matching_scenario_s5() {
        let queries =
            build_dork_queries("John Doe", Some("john@example.com"), Some("555-0100"), None);
        assert_eq!(
            queries,
            vec![
                "\"John Doe\"".to_string(),
                "\"John Doe\" \"john@example.com\"".to_string(),
                "site:pastebin.com \"john@example.com\"".to_string(),
                "\"john@example.com\"".to_string(),
                "\"John Doe\" \"555-0100\"".to_string(),
                "\"555-0100\"".to_string(),
                "filetype:pdf \"John Doe\"".to_string(),
                "filetype:xls \"John Doe\"".to_string(),
            ]
        );
    }

    #[test]
    fn omits_dorks_for_absent_fields() {
        let queries = build_dork_queries("John Doe", None, None, None);
        assert_eq!(
            queries,
            vec![
                "\"John Doe\"".to_string(),
                "filetype:pdf \"John Doe\"".to_string(),
                "filetype:xls \"John Doe\"".to_string(),
            ]
        );
    }

    #[test]
    fn tags_paste_sites_and_document_filetypes_as_high_risk() {
        assert_eq!(tag_url_risk("https://pastebin.com/abc123"), Severity::High);
        assert_eq!(
            tag_url_risk("https://example.com/resume.pdf"),
            Severity::High
        );
        assert_eq!(tag_url_risk("https://example.com/about"), Severity::Medium);
    }
}
