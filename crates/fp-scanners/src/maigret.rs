//! Maigret username scanner: spawns the `maigret` CLI and reads its flat
//! JSON report (§4.3). Same bounded-timeout-and-empty-on-failure policy as
//! the holehe scanner.

use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

const TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct MaigretAccount {
    pub site_name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
struct MaigretSiteReport {
    #[serde(default)]
    status: String,
    #[serde(default)]
    url_user: String,
}

pub async fn maigret_scan(
    username: &str,
    output_dir: &std::path::Path,
    timeout_secs: u64,
) -> Vec<MaigretAccount> {
    let mut child = match Command::new("maigret")
        .arg(username)
        .arg("-J")
        .arg("simple")
        .arg("--folderoutput")
        .arg(output_dir)
        .arg("--timeout")
        .arg(timeout_secs.to_string())
        .arg("--no-color")
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "maigret: failed to spawn, treating as empty");
            return Vec::new();
        }
    };

    let wait = tokio::time::timeout(TIMEOUT, child.wait()).await;
    match wait {
        Ok(Ok(status)) if status.success() => {}
        Ok(Ok(status)) => {
            tracing::warn!(?status, "maigret: exited non-zero, treating as empty");
            return Vec::new();
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "maigret: wait failed, treating as empty");
            return Vec::new();
        }
        Err(_) => {
            tracing::warn!("maigret: timed out, killing child");
            let _ = child.kill().await;
            return Vec::new();
        }
    }

    let report_path = output_dir.join(format!("report_{username}_simple.json"));
    let contents = match tokio::fs::read_to_string(&report_path).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, path = %report_path.display(), "maigret: could not read report, treating as empty");
            return Vec::new();
        }
    };

    parse_report(&contents)
}

fn parse_report(contents: &str) -> Vec<MaigretAccount> {
    let parsed: std::collections::BTreeMap<String, MaigretSiteReport> =
        match serde_json::from_str(contents) {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "maigret: malformed report, treating as empty");
                return Vec::new();
            }
        };

    parsed
        .into_iter()
        .filter(|(_, site)| site.status == "Claimed")
        .map(|(site_name, site)| MaigretAccount {
            site_name,
            url: site.url_user,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_to_claimed_accounts_only() {
        let json = r#"{
            "Twitter": {"status": "Claimed", "url_user": "https://twitter.com/john"},
            "GitHub": {"status": "Available", "url_user": "https://github.com/john"}
        }"#;
        let accounts = parse_report(json);
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].site_name, "Twitter");
    }

    #[test]
    fn malformed_json_yields_no_accounts() {
        assert!(parse_report("not json").is_empty());
    }
}
