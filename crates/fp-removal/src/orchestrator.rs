//! Dispatches a removal request to the right handler and records the
//! outcome as a `Removal` row (§4.5).

use anyhow::{Context, Result};
use chrono::Utc;
use fp_types::OptOutMethod;
use sqlx::SqlitePool;

use crate::context::{BrokerCtx, PersonCtx};
use crate::remover::Remover;

/// Holds one boxed handler per dispatch bucket. `web_form`/`email` are
/// optional: an engine with no SMTP credentials or no browser wired in
/// still runs, falling back to manual instructions for those methods.
pub struct RemovalOrchestrator {
    email: Option<Box<dyn Remover>>,
    web_form: Option<Box<dyn Remover>>,
    manual: Box<dyn Remover>,
}

impl RemovalOrchestrator {
    pub fn new(
        email: Option<Box<dyn Remover>>,
        web_form: Option<Box<dyn Remover>>,
        manual: Box<dyn Remover>,
    ) -> Self {
        RemovalOrchestrator {
            email,
            web_form,
            manual,
        }
    }

    pub async fn submit_removal(
        &self,
        pool: &SqlitePool,
        person_id: i64,
        broker_slug: &str,
    ) -> Result<i64> {
        let person = fp_store::get_person(pool, person_id)
            .await
            .with_context(|| format!("no person with id {person_id}"))?;
        let broker = fp_store::get_broker_by_slug(pool, broker_slug)
            .await
            .with_context(|| format!("no broker with slug {broker_slug}"))?;

        let person_ctx = PersonCtx::from(&person);
        let broker_ctx = BrokerCtx::from(&broker);

        let handler: &dyn Remover = match broker_ctx.opt_out_method {
            OptOutMethod::Email => self.email.as_deref().unwrap_or(self.manual.as_ref()),
            OptOutMethod::WebForm => self.web_form.as_deref().unwrap_or(self.manual.as_ref()),
            OptOutMethod::Api | OptOutMethod::Phone | OptOutMethod::Mail => self.manual.as_ref(),
        };

        let outcome = handler.submit(&person_ctx, &broker_ctx).await;
        let status = outcome.status();
        let reference = outcome.reference();
        let submitted_at = matches!(status, fp_types::RemovalStatus::Submitted).then(Utc::now);
        let next_check_at = submitted_at.map(|t| t + chrono::Duration::days(broker_ctx.recheck_days));

        let removal_id = fp_store::insert_removal(
            pool,
            person.id,
            broker.id,
            broker_ctx.opt_out_method,
            None,
            status,
            reference.as_deref(),
            submitted_at,
            next_check_at,
        )
        .await
        .context("insert_removal failed")?;

        Ok(removal_id)
    }
}
