//! Delta-based email alerting (§4.8): fire once a job's finding count rises
//! over the previous run's count, never on a flat or falling count.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

#[derive(Debug, Clone)]
pub struct SmtpAlertConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub alert_email: String,
}

/// `should_alert(new, previous) = new > previous` for all integer inputs.
pub fn should_alert(new_count: i64, previous_count: i64) -> bool {
    new_count > previous_count
}

/// Sends the alert iff `should_alert` and SMTP config is present. SMTP
/// failures are logged and return `false` — they never propagate, so one
/// broken mail relay never fails a scheduled job.
pub async fn check_and_alert(
    smtp: Option<&SmtpAlertConfig>,
    person_name: &str,
    job_name: &str,
    new_count: i64,
    previous_count: i64,
) -> bool {
    if !should_alert(new_count, previous_count) {
        return false;
    }

    let Some(smtp) = smtp else {
        tracing::debug!("alerter: no smtp config, skipping alert");
        return false;
    };

    let delta = new_count - previous_count;
    let subject = format!("[Digital Footprint] {delta} new findings for {person_name} ({job_name})");
    let body = format!(
        "Job: {job_name}\nPerson: {person_name}\nNew findings: {delta}\n\
         Total findings: {new_count} (previous: {previous_count})\n\n\
         Review the latest exposure report and consider submitting removal \
         requests for any new broker listings.",
    );

    match send(smtp, &subject, &body).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "alerter: smtp send failed");
            false
        }
    }
}

async fn send(smtp: &SmtpAlertConfig, subject: &str, body: &str) -> anyhow::Result<()> {
    let message = Message::builder()
        .from(smtp.user.parse()?)
        .to(smtp.alert_email.parse()?)
        .subject(subject)
        .body(body.to_string())?;

    let creds = Credentials::new(smtp.user.clone(), smtp.password.clone());
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)?
        .port(smtp.port)
        .credentials(creds)
        .build();

    mailer.send(message).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_only_on_strict_increase() {
        assert!(should_alert(5, 3));
        assert!(!should_alert(3, 3));
        assert!(!should_alert(2, 3));
    }

    #[tokio::test]
    async fn no_smtp_config_never_alerts() {
        let sent = check_and_alert(None, "John Doe", "breach_recheck", 5, 2).await;
        assert!(!sent);
    }

    #[tokio::test]
    async fn flat_count_sends_nothing_even_with_config() {
        let smtp = SmtpAlertConfig {
            host: "smtp.example.com".into(),
            port: 587,
            user: "alerts@example.com".into(),
            password: "unused".into(),
            alert_email: "owner@example.com".into(),
        };
        let sent = check_and_alert(Some(&smtp), "John Doe", "breach_recheck", 4, 4).await;
        assert!(!sent);
    }
}
