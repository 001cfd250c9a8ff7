//! The common handler contract every removal method implements (§4.5
//! implementation note), mirroring the broker-adapter `submit()` shape used
//! elsewhere in the workspace.

use async_trait::async_trait;

use crate::context::{BrokerCtx, PersonCtx};
use crate::outcome::Outcome;

#[async_trait]
pub trait Remover: Send + Sync {
    async fn submit(&self, person: &PersonCtx, broker: &BrokerCtx) -> Outcome;
}
