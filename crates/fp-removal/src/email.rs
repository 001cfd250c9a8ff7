//! Email remover: CCPA/GDPR/generic templates sent over SMTP with STARTTLS
//! and LOGIN auth (§4.5).

use async_trait::async_trait;
use chrono::Utc;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::context::{BrokerCtx, PersonCtx};
use crate::outcome::Outcome;
use crate::remover::Remover;

#[derive(Debug, Clone)]
pub struct SmtpCredentials {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

pub struct EmailRemover {
    credentials: SmtpCredentials,
}

impl EmailRemover {
    pub fn new(credentials: SmtpCredentials) -> Self {
        EmailRemover { credentials }
    }
}

#[async_trait]
impl Remover for EmailRemover {
    async fn submit(&self, person: &PersonCtx, broker: &BrokerCtx) -> Outcome {
        let Some(to_address) = broker.opt_out_email.clone() else {
            return Outcome::PreCheckFailed {
                reason: format!("broker {} has no opt-out email configured", broker.slug),
            };
        };

        let reference = generate_reference();
        let (subject, body) = render_template(person, broker, &reference);

        match send(&self.credentials, &to_address, &subject, &body).await {
            Ok(()) => Outcome::Submitted {
                reference: Some(reference),
            },
            Err(e) => {
                tracing::warn!(error = %e, broker = %broker.slug, "email remover: send failed");
                Outcome::PreCheckFailed {
                    reason: format!("smtp send failed: {e}"),
                }
            }
        }
    }
}

fn generate_reference() -> String {
    let bytes: [u8; 4] = rand::random();
    format!("REF-{}", hex::encode_upper(bytes))
}

/// CCPA wins when a broker declares both; otherwise GDPR, otherwise generic.
fn render_template(person: &PersonCtx, broker: &BrokerCtx, reference: &str) -> (String, String) {
    let today = Utc::now().date_naive();

    if broker.ccpa_compliant {
        (
            format!("CCPA Data Deletion Request - {} ({reference})", person.name),
            format!(
                "Under the California Consumer Privacy Act (CCPA), I am requesting \
                 deletion of all personal information {} holds about me.\n\n\
                 Name: {}\nEmail: {}\nDate: {today}\nReference: {reference}\n\n\
                 Please confirm deletion within the time frame required by law.",
                broker.name,
                person.name,
                person.email.as_deref().unwrap_or("(not provided)"),
            ),
        )
    } else if broker.gdpr_compliant {
        (
            format!("GDPR Erasure Request - {} ({reference})", person.name),
            format!(
                "Under Article 17 of the GDPR, I am requesting erasure of all \
                 personal data {} holds about me.\n\n\
                 Name: {}\nEmail: {}\nDate: {today}\nReference: {reference}\n\n\
                 Please confirm erasure without undue delay.",
                broker.name,
                person.name,
                person.email.as_deref().unwrap_or("(not provided)"),
            ),
        )
    } else {
        (
            format!("Data Removal Request - {} ({reference})", person.name),
            format!(
                "I am requesting removal of my personal information from {}.\n\n\
                 Name: {}\nEmail: {}\nDate: {today}\nReference: {reference}",
                broker.name,
                person.name,
                person.email.as_deref().unwrap_or("(not provided)"),
            ),
        )
    }
}

async fn send(
    credentials: &SmtpCredentials,
    to: &str,
    subject: &str,
    body: &str,
) -> anyhow::Result<()> {
    let message = Message::builder()
        .from(credentials.user.parse()?)
        .to(to.parse()?)
        .subject(subject)
        .body(body.to_string())?;

    let transport_creds = Credentials::new(credentials.user.clone(), credentials.password.clone());
    let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&credentials.host)?
        .port(credentials.port)
        .credentials(transport_creds)
        .build();

    mailer.send(message).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_types::{Broker, BrokerCategory, BrokerDifficulty, OptOutMethod};

    fn broker_ctx(ccpa: bool, gdpr: bool) -> BrokerCtx {
        let broker = Broker {
            id: 1,
            slug: "example-broker".into(),
            name: "Example Broker".into(),
            url: "https://example.com".into(),
            category: BrokerCategory::PeopleSearch,
            opt_out_method: Some(OptOutMethod::Email),
            opt_out_url: None,
            opt_out_email: Some("privacy@example.com".into()),
            opt_out_phone: None,
            opt_out_mail_address: None,
            opt_out_steps: vec![],
            difficulty: BrokerDifficulty::Medium,
            automatable: true,
            recheck_days: 30,
            ccpa_compliant: ccpa,
            gdpr_compliant: gdpr,
            notes: None,
        };
        BrokerCtx::from(&broker)
    }

    fn person_ctx() -> PersonCtx {
        PersonCtx {
            name: "John Doe".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: Some("john@example.com".into()),
            phone: None,
            address: None,
            usernames: vec![],
        }
    }

    #[test]
    fn ccpa_wins_when_both_flags_set() {
        let reference = "REF-DEADBEEF";
        let (subject, _) = render_template(&person_ctx(), &broker_ctx(true, true), reference);
        assert!(subject.starts_with("CCPA"));
    }

    #[test]
    fn gdpr_used_when_only_gdpr_compliant() {
        let reference = "REF-DEADBEEF";
        let (subject, _) = render_template(&person_ctx(), &broker_ctx(false, true), reference);
        assert!(subject.starts_with("GDPR"));
    }

    #[test]
    fn generic_used_when_neither_flag_set() {
        let reference = "REF-DEADBEEF";
        let (subject, _) = render_template(&person_ctx(), &broker_ctx(false, false), reference);
        assert!(subject.starts_with("Data Removal Request"));
    }
}
