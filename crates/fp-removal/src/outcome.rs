//! What a `Remover` hands back to the orchestrator (§4.5 handler outcomes).

use fp_types::RemovalStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Submitted { reference: Option<String> },
    InstructionsGenerated { instructions: String },
    CaptchaRequired { url: String },
    FilledNotSubmitted { fields_filled: usize },
    NoFormFound,
    PreCheckFailed { reason: String },
}

impl Outcome {
    pub fn status(&self) -> RemovalStatus {
        match self {
            Outcome::Submitted { .. } => RemovalStatus::Submitted,
            Outcome::InstructionsGenerated { .. } => RemovalStatus::InstructionsGenerated,
            Outcome::CaptchaRequired { .. }
            | Outcome::FilledNotSubmitted { .. }
            | Outcome::NoFormFound
            | Outcome::PreCheckFailed { .. } => RemovalStatus::Pending,
        }
    }

    pub fn reference(&self) -> Option<String> {
        match self {
            Outcome::Submitted { reference } => reference.clone(),
            _ => None,
        }
    }

    pub fn notes(&self) -> Option<String> {
        match self {
            Outcome::InstructionsGenerated { instructions } => Some(instructions.clone()),
            Outcome::CaptchaRequired { url } => Some(format!("captcha_required at {url}")),
            Outcome::FilledNotSubmitted { fields_filled } => {
                Some(format!("filled_not_submitted ({fields_filled} fields)"))
            }
            Outcome::NoFormFound => Some("no_form_found".to_string()),
            Outcome::PreCheckFailed { reason } => Some(reason.clone()),
            Outcome::Submitted { .. } => None,
        }
    }
}
