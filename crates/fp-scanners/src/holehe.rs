//! Holehe account-enumeration scanner: spawns the `holehe` CLI as a child
//! process and parses its CSV report (§4.3). Bounded to 60 seconds; a
//! timeout kills the child and the scan reports no accounts rather than
//! failing the whole pipeline run (§7 category 3).

use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

const TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct HoleheAccount {
    pub platform: String,
    pub email_used: bool,
}

pub async fn holehe_scan(email: &str, temp_csv_path: &std::path::Path) -> Vec<HoleheAccount> {
    let mut child = match Command::new("holehe")
        .arg(email)
        .arg("--only-used")
        .arg("--csv")
        .arg(temp_csv_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "holehe: failed to spawn, treating as empty");
            return Vec::new();
        }
    };

    let wait = tokio::time::timeout(TIMEOUT, child.wait()).await;
    match wait {
        Ok(Ok(status)) if status.success() => {}
        Ok(Ok(status)) => {
            tracing::warn!(?status, "holehe: exited non-zero, treating as empty");
            return Vec::new();
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "holehe: wait failed, treating as empty");
            return Vec::new();
        }
        Err(_) => {
            tracing::warn!("holehe: timed out after 60s, killing child");
            let _ = child.kill().await;
            return Vec::new();
        }
    }

    let contents = match tokio::fs::read_to_string(temp_csv_path).await {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "holehe: could not read csv report, treating as empty");
            return Vec::new();
        }
    };

    parse_csv(&contents)
}

/// Accepts either `domain,exists,emailrecovery,phonenumber,others` or the
/// older `platform,email,exists` header shape.
fn parse_csv(contents: &str) -> Vec<HoleheAccount> {
    let mut lines = contents.lines();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let columns: Vec<&str> = header.split(',').map(|c| c.trim()).collect();

    let platform_idx = columns
        .iter()
        .position(|c| c.eq_ignore_ascii_case("domain") || c.eq_ignore_ascii_case("platform"));
    let exists_idx = columns.iter().position(|c| c.eq_ignore_ascii_case("exists"));

    let (Some(platform_idx), Some(exists_idx)) = (platform_idx, exists_idx) else {
        return Vec::new();
    };

    lines
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').collect();
            let platform = fields.get(platform_idx)?.trim();
            let exists = fields.get(exists_idx)?.trim();
            if platform.is_empty() {
                return None;
            }
            let email_used = exists.eq_ignore_ascii_case("true") || exists == "1";
            if !email_used {
                return None;
            }
            Some(HoleheAccount {
                platform: platform.to_string(),
                email_used,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_domain_exists_header_shape() {
        let csv = "domain,exists,emailrecovery,phonenumber,others\ntwitter.com,True,,,\ngithub.com,False,,,\n";
        let accounts = parse_csv(csv);
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].platform, "twitter.com");
    }

    #[test]
    fn parses_platform_email_exists_header_shape() {
        let csv = "platform,email,exists\ninstagram.com,john@example.com,1\n";
        let accounts = parse_csv(csv);
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].platform, "instagram.com");
    }

    #[test]
    fn unknown_header_shape_yields_no_accounts() {
        let csv = "a,b,c\nx,y,z\n";
        assert!(parse_csv(csv).is_empty());
    }
}
