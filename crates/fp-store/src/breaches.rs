use std::str::FromStr;

use anyhow::{Context, Result};
use fp_types::{Breach, BreachSource, Severity};
use sqlx::{Row, SqlitePool};

use crate::{decode_list, encode_list};

fn row_to_breach(row: &sqlx::sqlite::SqliteRow) -> Result<Breach> {
    let source_raw: String = row.try_get("source")?;
    let severity_raw: String = row.try_get("severity")?;

    Ok(Breach {
        id: row.try_get("id")?,
        person_id: row.try_get("person_id")?,
        breach_name: row.try_get("breach_name")?,
        source: BreachSource::from_str(&source_raw)?,
        breach_date: row.try_get("breach_date")?,
        data_types: decode_list(&row.try_get::<String, _>("data_types")?),
        severity: Severity::from_str(&severity_raw)?,
        action_taken: row.try_get("action_taken")?,
    })
}

pub async fn insert_breach(
    pool: &SqlitePool,
    person_id: i64,
    breach_name: &str,
    source: BreachSource,
    breach_date: Option<chrono::NaiveDate>,
    data_types: &[String],
    severity: Severity,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO breaches (person_id, breach_name, source, breach_date, data_types, severity)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(person_id)
    .bind(breach_name)
    .bind(source.as_str())
    .bind(breach_date)
    .bind(encode_list(data_types))
    .bind(severity.as_str())
    .execute(pool)
    .await
    .context("insert_breach failed")?;

    Ok(result.last_insert_rowid())
}

pub async fn list_breaches_by_person(pool: &SqlitePool, person_id: i64) -> Result<Vec<Breach>> {
    let rows = sqlx::query("SELECT * FROM breaches WHERE person_id = ? ORDER BY id ASC")
        .bind(person_id)
        .fetch_all(pool)
        .await
        .context("list_breaches_by_person failed")?;
    rows.iter().map(row_to_breach).collect()
}
