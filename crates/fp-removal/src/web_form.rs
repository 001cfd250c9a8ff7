//! Web-form remover: CAPTCHA detection, then a heuristic field fill through
//! the stealth browser (§4.5).

use async_trait::async_trait;

use fp_scanners::stealth::{FormSubmitOutcome, StealthBrowser};

use crate::context::{BrokerCtx, PersonCtx};
use crate::outcome::Outcome;
use crate::remover::Remover;

const CAPTCHA_MARKERS: [&str; 6] = [
    "recaptcha",
    "hcaptcha",
    "h-captcha",
    "g-recaptcha",
    "captcha",
    "cf-turnstile",
];

pub struct WebFormRemover<B: StealthBrowser> {
    browser: B,
}

impl<B: StealthBrowser> WebFormRemover<B> {
    pub fn new(browser: B) -> Self {
        WebFormRemover { browser }
    }
}

#[async_trait]
impl<B: StealthBrowser> Remover for WebFormRemover<B> {
    async fn submit(&self, person: &PersonCtx, broker: &BrokerCtx) -> Outcome {
        let Some(url) = broker.opt_out_url.clone() else {
            return Outcome::NoFormFound;
        };

        let page = match self.browser.open(&url).await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, broker = %broker.slug, "web form remover: open failed");
                return Outcome::NoFormFound;
            }
        };

        if has_captcha_marker(&page.html) {
            return Outcome::CaptchaRequired { url };
        }

        let fields = heuristic_fields(person);
        if fields.is_empty() {
            return Outcome::NoFormFound;
        }

        match self.browser.fill_and_submit(&url, &fields).await {
            Ok(FormSubmitOutcome::Submitted) => Outcome::Submitted { reference: None },
            Ok(FormSubmitOutcome::FilledNotSubmitted { fields_filled }) => {
                Outcome::FilledNotSubmitted { fields_filled }
            }
            Ok(FormSubmitOutcome::NoFormFound) => Outcome::NoFormFound,
            Err(e) => {
                tracing::warn!(error = %e, broker = %broker.slug, "web form remover: submit failed");
                Outcome::NoFormFound
            }
        }
    }
}

fn has_captcha_marker(html: &str) -> bool {
    let lower = html.to_ascii_lowercase();
    CAPTCHA_MARKERS.iter().any(|m| lower.contains(m))
}

/// The heuristic selector table from §4.5: name/first_name/last_name/email/
/// phone/address, in that order, each included only when the person has a
/// value for it.
fn heuristic_fields(person: &PersonCtx) -> Vec<(&'static str, &str)> {
    let mut fields = Vec::new();
    if !person.name.is_empty() {
        fields.push(("name", person.name.as_str()));
    }
    if !person.first_name.is_empty() {
        fields.push(("first_name", person.first_name.as_str()));
    }
    if !person.last_name.is_empty() {
        fields.push(("last_name", person.last_name.as_str()));
    }
    if let Some(email) = person.email.as_deref() {
        fields.push(("email", email));
    }
    if let Some(phone) = person.phone.as_deref() {
        fields.push(("phone", phone));
    }
    if let Some(address) = person.address.as_deref() {
        fields.push(("address", address));
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_scanners::stealth::FakeStealthBrowser;
    use fp_types::{Broker, BrokerCategory, BrokerDifficulty, OptOutMethod};

    fn broker_ctx(url: &str) -> BrokerCtx {
        let broker = Broker {
            id: 1,
            slug: "example-broker".into(),
            name: "Example Broker".into(),
            url: url.into(),
            category: BrokerCategory::PeopleSearch,
            opt_out_method: Some(OptOutMethod::WebForm),
            opt_out_url: Some(url.into()),
            opt_out_email: None,
            opt_out_phone: None,
            opt_out_mail_address: None,
            opt_out_steps: vec![],
            difficulty: BrokerDifficulty::Easy,
            automatable: true,
            recheck_days: 30,
            ccpa_compliant: false,
            gdpr_compliant: false,
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

    #[tokio::test]
    async fn captcha_marker_short_circuits_before_filling() {
        let browser = FakeStealthBrowser {
            html: r#"<html><body><div class="g-recaptcha"></div></body></html>"#.into(),
            submit_outcome: FormSubmitOutcome::Submitted,
        };
        let remover = WebFormRemover::new(browser);
        let outcome = remover
            .submit(&person_ctx(), &broker_ctx("https://example.com/optout"))
            .await;
        assert_eq!(
            outcome,
            Outcome::CaptchaRequired {
                url: "https://example.com/optout".into()
            }
        );
    }

    #[tokio::test]
    async fn submits_when_no_captcha_present() {
        let browser = FakeStealthBrowser {
            html: "<html><body><form></form></body></html>".into(),
            submit_outcome: FormSubmitOutcome::Submitted,
        };
        let remover = WebFormRemover::new(browser);
        let outcome = remover
            .submit(&person_ctx(), &broker_ctx("https://example.com/optout"))
            .await;
        assert_eq!(outcome, Outcome::Submitted { reference: None });
    }
}
