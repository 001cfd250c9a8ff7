//! Severity derivation rules (§4.1), shared by every scanner that produces a
//! `Breach` or a dark-web `Finding` before it reaches the store.

use crate::Severity;

const CRITICAL_DATA_CLASSES: [&str; 3] = ["Passwords", "Credit cards", "Social security numbers"];
const HIGH_DATA_CLASSES: [&str; 3] = ["Phone numbers", "Physical addresses", "IP addresses"];
const DARK_WEB_CRITICAL_MARKERS: [&str; 5] =
    ["password", "credential", "dump", "leak", "breach"];

fn contains_any_ci(data_classes: &[String], needles: &[&str]) -> bool {
    needles
        .iter()
        .any(|needle| data_classes.iter().any(|dc| dc.eq_ignore_ascii_case(needle)))
}

/// HIBP/generic breach severity from the reported data classes.
pub fn breach_severity(data_classes: &[String]) -> Severity {
    if contains_any_ci(data_classes, &CRITICAL_DATA_CLASSES) {
        Severity::Critical
    } else if contains_any_ci(data_classes, &HIGH_DATA_CLASSES) {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// DeHashed record severity: plaintext beats hashed beats neither.
pub fn dehashed_severity(has_plaintext_password: bool, has_hashed_password: bool) -> Severity {
    if has_plaintext_password {
        Severity::Critical
    } else if has_hashed_password {
        Severity::High
    } else {
        Severity::Medium
    }
}

/// Paste appearances default to high severity.
pub fn paste_severity() -> Severity {
    Severity::High
}

/// Dark-web hit severity from its title/snippet text.
pub fn dark_web_severity(title_and_snippet: &str) -> Severity {
    let lower = title_and_snippet.to_ascii_lowercase();
    if DARK_WEB_CRITICAL_MARKERS.iter().any(|m| lower.contains(m)) {
        Severity::Critical
    } else {
        Severity::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breach_severity_matches_scenario_s2() {
        assert_eq!(
            breach_severity(&["Email addresses".into(), "Passwords".into()]),
            Severity::Critical
        );
        assert_eq!(
            breach_severity(&["Email addresses".into(), "IP addresses".into()]),
            Severity::High
        );
        assert_eq!(
            breach_severity(&["Email addresses".into()]),
            Severity::Medium
        );
    }

    #[test]
    fn dehashed_severity_prefers_plaintext() {
        assert_eq!(dehashed_severity(true, true), Severity::Critical);
        assert_eq!(dehashed_severity(false, true), Severity::High);
        assert_eq!(dehashed_severity(false, false), Severity::Medium);
    }

    #[test]
    fn dark_web_severity_flags_credential_markers() {
        assert_eq!(dark_web_severity("Password dump for sale"), Severity::Critical);
        assert_eq!(dark_web_severity("Random forum post"), Severity::High);
    }
}
