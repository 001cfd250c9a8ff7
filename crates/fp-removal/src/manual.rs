//! Manual remover: a plain-text instruction block, never any I/O (§4.5).

use async_trait::async_trait;

use crate::context::{BrokerCtx, PersonCtx};
use crate::outcome::Outcome;
use crate::remover::Remover;

#[derive(Debug, Default)]
pub struct ManualRemover;

#[async_trait]
impl Remover for ManualRemover {
    async fn submit(&self, person: &PersonCtx, broker: &BrokerCtx) -> Outcome {
        Outcome::InstructionsGenerated {
            instructions: render_instructions(person, broker),
        }
    }
}

fn render_instructions(person: &PersonCtx, broker: &BrokerCtx) -> String {
    let mut lines = vec![
        format!("Manual removal required for {} ({})", broker.name, broker.slug),
        format!("Method: {}", broker.opt_out_method),
        String::new(),
        "Contact information:".to_string(),
    ];

    if let Some(phone) = &broker.opt_out_phone {
        lines.push(format!("  Phone: {phone}"));
    }
    if let Some(address) = &broker.opt_out_mail_address {
        lines.push(format!("  Mail: {address}"));
    }
    if let Some(email) = &broker.opt_out_email {
        lines.push(format!("  Email: {email}"));
    }
    if let Some(url) = &broker.opt_out_url {
        lines.push(format!("  URL: {url}"));
    }

    lines.push(String::new());
    lines.push("Identifying information to provide:".to_string());
    lines.push(format!("  Name: {}", person.name));
    if let Some(email) = &person.email {
        lines.push(format!("  Email: {email}"));
    }
    if let Some(phone) = &person.phone {
        lines.push(format!("  Phone: {phone}"));
    }
    if let Some(address) = &person.address {
        lines.push(format!("  Address: {address}"));
    }

    if !broker.opt_out_steps.is_empty() {
        lines.push(String::new());
        lines.push("Steps:".to_string());
        for (i, step) in broker.opt_out_steps.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, step));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_types::{Broker, BrokerCategory, BrokerDifficulty, OptOutMethod};

    #[tokio::test]
    async fn renders_steps_and_contact_info() {
        let broker = Broker {
            id: 1,
            slug: "example-broker".into(),
            name: "Example Broker".into(),
            url: "https://example.com".into(),
            category: BrokerCategory::PeopleSearch,
            opt_out_method: Some(OptOutMethod::Mail),
            opt_out_url: None,
            opt_out_email: None,
            opt_out_phone: None,
            opt_out_mail_address: Some("PO Box 1, Anytown".into()),
            opt_out_steps: vec!["Print the form".into(), "Mail it in".into()],
            difficulty: BrokerDifficulty::Manual,
            automatable: false,
            recheck_days: 30,
            ccpa_compliant: false,
            gdpr_compliant: false,
            notes: None,
        };
        let person = PersonCtx {
            name: "John Doe".into(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: None,
            phone: None,
            address: None,
            usernames: vec![],
        };

        let remover = ManualRemover;
        let outcome = remover.submit(&person, &BrokerCtx::from(&broker)).await;
        match outcome {
            Outcome::InstructionsGenerated { instructions } => {
                assert!(instructions.contains("PO Box 1, Anytown"));
                assert!(instructions.contains("1. Print the form"));
                assert!(instructions.contains("2. Mail it in"));
            }
            other => panic!("expected InstructionsGenerated, got {other:?}"),
        }
    }
}
