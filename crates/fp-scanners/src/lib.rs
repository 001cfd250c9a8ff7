//! Scanner implementations for every exposure source named in the data
//! model: breach databases, paste sites, dark-web indexes, people-search
//! brokers, social profiles, and search-engine dorking.
//!
//! Each scanner follows the same contract: network/process failure never
//! propagates as an error, it collapses to an empty result and a warning
//! log line, so one flaky source never aborts a pipeline run (§7).

mod ahmia;
mod breach;
mod broker_scan;
mod dork;
mod holehe;
mod maigret;
mod paste;
mod social;
pub mod stealth;
mod urlencode;

pub use ahmia::{ahmia_scan, DarkWebHit};
pub use breach::{breach_scan, BreachScanResult, DehashedRecord, HibpBreach};
pub use broker_scan::{broker_scan, render_search_url, BrokerScanHit};
pub use dork::{build_dork_queries, tag_url_risk};
pub use holehe::{holehe_scan, HoleheAccount};
pub use maigret::{maigret_scan, MaigretAccount};
pub use paste::{paste_scan, PasteHit};
pub use social::{social_audit, Platform, SocialAudit};
pub use stealth::{FakeStealthBrowser, FormSubmitOutcome, PageContent, StealthBrowser};
