//! Verification pass: re-runs the broker scanner against each pending
//! removal and advances its state machine accordingly (§4.5).

use anyhow::{Context, Result};
use fp_scanners::stealth::StealthBrowser;
use fp_types::Removal;
use sqlx::SqlitePool;

#[derive(Debug, Clone)]
pub struct VerificationOutcome {
    pub removal_id: i64,
    pub confirmed: bool,
}

pub async fn verify_pending_removals<B: StealthBrowser>(
    pool: &SqlitePool,
    browser: &B,
) -> Result<Vec<VerificationOutcome>> {
    let pending = fp_store::pending_verifications(pool)
        .await
        .context("pending_verifications failed")?;

    let mut outcomes = Vec::with_capacity(pending.len());
    for removal in pending {
        let outcome = verify_one(pool, browser, &removal).await?;
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

async fn verify_one<B: StealthBrowser>(
    pool: &SqlitePool,
    browser: &B,
    removal: &Removal,
) -> Result<VerificationOutcome> {
    let broker = fp_store::get_broker(pool, removal.broker_id).await?;
    let person = fp_store::get_person(pool, removal.person_id).await?;

    let first_name = person.name.split_whitespace().next().unwrap_or("").to_string();
    let last_name = person
        .name
        .split_whitespace()
        .nth(1)
        .unwrap_or("")
        .to_string();

    let still_found = match &broker.opt_out_url {
        Some(url) => fp_scanners::broker_scan(browser, url, &first_name, &last_name)
            .await
            .unwrap_or(None)
            .is_some(),
        None => false,
    };

    if still_found {
        fp_store::mark_still_found_or_failed(pool, removal.id, broker.recheck_days).await?;
        Ok(VerificationOutcome {
            removal_id: removal.id,
            confirmed: false,
        })
    } else {
        fp_store::mark_confirmed(pool, removal.id).await?;
        Ok(VerificationOutcome {
            removal_id: removal.id,
            confirmed: true,
        })
    }
}
