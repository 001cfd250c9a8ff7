//! Normalized removal-time views over a `Person`/`Broker` pair (§4.5).
//!
//! List fields (emails, phones, addresses) collapse to their first-element
//! singular here — a remover only ever acts against one address at a time.

use fp_types::{Broker, OptOutMethod, Person};

#[derive(Debug, Clone)]
pub struct PersonCtx {
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub usernames: Vec<String>,
}

impl From<&Person> for PersonCtx {
    fn from(person: &Person) -> Self {
        let (first_name, last_name) = split_name(&person.name);
        PersonCtx {
            name: person.name.clone(),
            first_name,
            last_name,
            email: person.emails.first().cloned(),
            phone: person.phones.first().cloned(),
            address: person.addresses.first().cloned(),
            usernames: person.usernames.clone(),
        }
    }
}

fn split_name(full_name: &str) -> (String, String) {
    match full_name.trim().split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (full_name.trim().to_string(), String::new()),
    }
}

#[derive(Debug, Clone)]
pub struct BrokerCtx {
    pub slug: String,
    pub name: String,
    pub url: String,
    pub opt_out_method: OptOutMethod,
    pub opt_out_url: Option<String>,
    pub opt_out_email: Option<String>,
    pub opt_out_phone: Option<String>,
    pub opt_out_mail_address: Option<String>,
    pub opt_out_steps: Vec<String>,
    pub ccpa_compliant: bool,
    pub gdpr_compliant: bool,
    pub recheck_days: i64,
}

impl From<&Broker> for BrokerCtx {
    fn from(broker: &Broker) -> Self {
        BrokerCtx {
            slug: broker.slug.clone(),
            name: broker.name.clone(),
            url: broker.url.clone(),
            opt_out_method: broker.opt_out_method.unwrap_or(OptOutMethod::Mail),
            opt_out_url: broker.opt_out_url.clone(),
            opt_out_email: broker.opt_out_email.clone(),
            opt_out_phone: broker.opt_out_phone.clone(),
            opt_out_mail_address: broker.opt_out_mail_address.clone(),
            opt_out_steps: broker.opt_out_steps.clone(),
            ccpa_compliant: broker.ccpa_compliant,
            gdpr_compliant: broker.gdpr_compliant,
            recheck_days: broker.recheck_days,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_single_word_name_into_first_only() {
        assert_eq!(split_name("Cher"), ("Cher".to_string(), String::new()));
    }

    #[test]
    fn splits_multi_word_name_on_first_space() {
        assert_eq!(
            split_name("Mary Jane Watson"),
            ("Mary".to_string(), "Jane Watson".to_string())
        );
    }
}
