use std::fmt;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fp_types::{OptOutMethod, Removal, RemovalStatus};
use sqlx::{Row, SqlitePool};

/// Returned when a removal status transition is attempted from a state that
/// does not permit it (§4.5's state machine table). Callers must treat this
/// as an invariant violation, not a retryable error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalTransitionError {
    pub removal_id: i64,
    pub from_allowed: &'static [&'static str],
}

impl fmt::Display for RemovalTransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "removal {} is not in one of the expected states {:?}",
            self.removal_id, self.from_allowed
        )
    }
}

impl std::error::Error for RemovalTransitionError {}

fn row_to_removal(row: &sqlx::sqlite::SqliteRow) -> Result<Removal> {
    let method_raw: String = row.try_get("method")?;
    let status_raw: String = row.try_get("status")?;

    Ok(Removal {
        id: row.try_get("id")?,
        person_id: row.try_get("person_id")?,
        broker_id: row.try_get("broker_id")?,
        method: OptOutMethod::from_str(&method_raw)?,
        finding_id: row.try_get("finding_id")?,
        status: RemovalStatus::from_str(&status_raw)?,
        submitted_at: row.try_get("submitted_at")?,
        confirmed_at: row.try_get("confirmed_at")?,
        last_checked_at: row.try_get("last_checked_at")?,
        attempts: row.try_get("attempts")?,
        next_check_at: row.try_get("next_check_at")?,
        reference: row.try_get("reference")?,
        notes: row.try_get("notes")?,
    })
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_removal(
    pool: &SqlitePool,
    person_id: i64,
    broker_id: i64,
    method: OptOutMethod,
    finding_id: Option<i64>,
    status: RemovalStatus,
    reference: Option<&str>,
    submitted_at: Option<DateTime<Utc>>,
    next_check_at: Option<DateTime<Utc>>,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO removals (person_id, broker_id, method, finding_id, status, submitted_at, next_check_at, attempts, reference)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(person_id)
    .bind(broker_id)
    .bind(method.as_str())
    .bind(finding_id)
    .bind(status.as_str())
    .bind(submitted_at)
    .bind(next_check_at)
    .bind(reference)
    .execute(pool)
    .await
    .context("insert_removal failed")?;

    Ok(result.last_insert_rowid())
}

pub async fn get_removal(pool: &SqlitePool, id: i64) -> Result<Removal> {
    let row = sqlx::query("SELECT * FROM removals WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .with_context(|| format!("no removal with id {id}"))?;
    row_to_removal(&row)
}

pub async fn list_removals_by_person(pool: &SqlitePool, person_id: i64) -> Result<Vec<Removal>> {
    let rows = sqlx::query("SELECT * FROM removals WHERE person_id = ? ORDER BY id ASC")
        .bind(person_id)
        .fetch_all(pool)
        .await
        .context("list_removals_by_person failed")?;
    rows.iter().map(row_to_removal).collect()
}

/// Rows eligible for verification: status = submitted AND next_check_at <= now,
/// ordered by next_check_at ascending (§4.5, concurrency ordering guarantee).
pub async fn pending_verifications(pool: &SqlitePool) -> Result<Vec<Removal>> {
    let rows = sqlx::query(
        r#"
        SELECT * FROM removals
        WHERE status = 'submitted' AND next_check_at IS NOT NULL AND next_check_at <= ?
        ORDER BY next_check_at ASC
        "#,
    )
    .bind(Utc::now())
    .fetch_all(pool)
    .await
    .context("pending_verifications failed")?;
    rows.iter().map(row_to_removal).collect()
}

/// Verification confirmed the data is gone: submitted|still_found -> confirmed (terminal).
pub async fn mark_confirmed(pool: &SqlitePool, id: i64) -> Result<()> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        UPDATE removals
        SET status = 'confirmed', confirmed_at = ?, last_checked_at = ?
        WHERE id = ? AND status IN ('submitted', 'still_found')
        "#,
    )
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await
    .with_context(|| format!("mark_confirmed({id}) failed"))?;

    if result.rows_affected() == 0 {
        anyhow::bail!(RemovalTransitionError {
            removal_id: id,
            from_allowed: &["submitted", "still_found"],
        });
    }
    Ok(())
}

/// Verification found the data still present: attempts += 1, reschedule.
/// Once attempts exceeds the cap the removal is declared `failed` instead
/// (§4.5, §7 category 4).
pub async fn mark_still_found_or_failed(
    pool: &SqlitePool,
    id: i64,
    recheck_days: i64,
) -> Result<RemovalStatus> {
    let removal = get_removal(pool, id).await?;
    if !matches!(
        removal.status,
        RemovalStatus::Submitted | RemovalStatus::StillFound
    ) {
        anyhow::bail!(RemovalTransitionError {
            removal_id: id,
            from_allowed: &["submitted", "still_found"],
        });
    }

    let new_attempts = removal.attempts + 1;
    let now = Utc::now();

    if new_attempts > Removal::MAX_VERIFICATION_ATTEMPTS {
        let result = sqlx::query(
            r#"
            UPDATE removals
            SET status = 'failed', attempts = ?, last_checked_at = ?, next_check_at = NULL
            WHERE id = ? AND status IN ('submitted', 'still_found')
            "#,
        )
        .bind(new_attempts)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("mark_failed({id}) failed"))?;
        if result.rows_affected() == 0 {
            anyhow::bail!(RemovalTransitionError {
                removal_id: id,
                from_allowed: &["submitted", "still_found"],
            });
        }
        return Ok(RemovalStatus::Failed);
    }

    let next_check_at = now + chrono::Duration::days(recheck_days);
    let result = sqlx::query(
        r#"
        UPDATE removals
        SET status = 'still_found', attempts = ?, last_checked_at = ?, next_check_at = ?
        WHERE id = ? AND status IN ('submitted', 'still_found')
        "#,
    )
    .bind(new_attempts)
    .bind(now)
    .bind(next_check_at)
    .bind(id)
    .execute(pool)
    .await
    .with_context(|| format!("mark_still_found({id}) failed"))?;
    if result.rows_affected() == 0 {
        anyhow::bail!(RemovalTransitionError {
            removal_id: id,
            from_allowed: &["submitted", "still_found"],
        });
    }
    Ok(RemovalStatus::StillFound)
}

/// `verify_removals` job bookkeeping: touch `last_checked_at` without
/// changing status (used before the found/not-found decision is known, e.g.
/// while only counting pending rows).
pub async fn touch_last_checked(pool: &SqlitePool, id: i64) -> Result<()> {
    let result = sqlx::query("UPDATE removals SET last_checked_at = ? WHERE id = ?")
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await
        .with_context(|| format!("touch_last_checked({id}) failed"))?;
    if result.rows_affected() == 0 {
        anyhow::bail!("touch_last_checked: no removal with id {id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;

    async fn seed_submitted(pool: &SqlitePool) -> i64 {
        insert_removal(
            pool,
            1,
            1,
            OptOutMethod::Email,
            None,
            RemovalStatus::Submitted,
            Some("REF-DEADBEEF"),
            Some(Utc::now()),
            Some(Utc::now()),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn confirmed_is_terminal_and_guarded() {
        let pool = connect_in_memory().await.unwrap();
        let id = seed_submitted(&pool).await;

        mark_confirmed(&pool, id).await.unwrap();
        let removal = get_removal(&pool, id).await.unwrap();
        assert_eq!(removal.status, RemovalStatus::Confirmed);
        assert!(removal.confirmed_at.is_some());

        // Confirming again from a terminal state must fail (guarded transition).
        let err = mark_confirmed(&pool, id).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn still_found_increments_attempts_then_fails_after_cap() {
        let pool = connect_in_memory().await.unwrap();
        let id = seed_submitted(&pool).await;

        for expected_attempt in 1..=3 {
            let status = mark_still_found_or_failed(&pool, id, 7).await.unwrap();
            assert_eq!(status, RemovalStatus::StillFound);
            let removal = get_removal(&pool, id).await.unwrap();
            assert_eq!(removal.attempts, expected_attempt);
        }

        let status = mark_still_found_or_failed(&pool, id, 7).await.unwrap();
        assert_eq!(status, RemovalStatus::Failed);
        let removal = get_removal(&pool, id).await.unwrap();
        assert_eq!(removal.attempts, 4);
        assert!(removal.next_check_at.is_none());
    }

    #[tokio::test]
    async fn pending_verifications_orders_by_next_check_at() {
        let pool = connect_in_memory().await.unwrap();
        let now = Utc::now();
        let later = insert_removal(
            &pool, 1, 1, OptOutMethod::Email, None, RemovalStatus::Submitted,
            None, Some(now), Some(now - chrono::Duration::minutes(1)),
        ).await.unwrap();
        let earlier = insert_removal(
            &pool, 1, 1, OptOutMethod::Email, None, RemovalStatus::Submitted,
            None, Some(now), Some(now - chrono::Duration::minutes(5)),
        ).await.unwrap();

        let due = pending_verifications(&pool).await.unwrap();
        assert_eq!(due.len(), 2);
        assert_eq!(due[0].id, earlier);
        assert_eq!(due[1].id, later);
    }
}
