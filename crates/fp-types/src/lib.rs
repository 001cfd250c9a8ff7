//! Domain types shared by every component of the protection engine.
//!
//! Mirrors the source system's data model (see the entity table in the
//! design docs): each struct here is the in-memory shape of one durable row
//! owned exclusively by the store. List fields (`emails`, `phones`, ...) are
//! ordered and must round-trip exactly through JSON encoding.

mod breach;
mod broker;
mod finding;
mod person;
mod removal;
mod run;
mod severity;
pub mod severity_rules;

pub use breach::{Breach, BreachSource};
pub use broker::{Broker, BrokerCategory, BrokerDifficulty, OptOutMethod};
pub use finding::{Finding, FindingStatus};
pub use person::{Person, Relation};
pub use removal::{Removal, RemovalStatus};
pub use run::{PipelineRunRow, PipelineRunStatus, ScheduledRunRow, ScheduledRunStatus};
pub use severity::Severity;
