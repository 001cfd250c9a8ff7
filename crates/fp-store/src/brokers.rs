use std::str::FromStr;

use anyhow::{Context, Result};
use fp_types::{Broker, BrokerCategory, BrokerDifficulty, OptOutMethod};
use sqlx::{Row, SqlitePool};

use crate::{decode_list, encode_list};

fn row_to_broker(row: &sqlx::sqlite::SqliteRow) -> Result<Broker> {
    let category_raw: String = row.try_get("category")?;
    let difficulty_raw: String = row.try_get("difficulty")?;
    let method_raw: Option<String> = row.try_get("opt_out_method")?;

    Ok(Broker {
        id: row.try_get("id")?,
        slug: row.try_get("slug")?,
        name: row.try_get("name")?,
        url: row.try_get("url")?,
        category: BrokerCategory::from_str(&category_raw)?,
        opt_out_method: method_raw.map(|m| OptOutMethod::from_str(&m)).transpose()?,
        opt_out_url: row.try_get("opt_out_url")?,
        opt_out_email: row.try_get("opt_out_email")?,
        opt_out_phone: row.try_get("opt_out_phone")?,
        opt_out_mail_address: row.try_get("opt_out_mail_address")?,
        opt_out_steps: decode_list(&row.try_get::<String, _>("opt_out_steps")?),
        difficulty: BrokerDifficulty::from_str(&difficulty_raw)?,
        automatable: row.try_get::<i64, _>("automatable")? != 0,
        recheck_days: row.try_get("recheck_days")?,
        ccpa_compliant: row.try_get::<i64, _>("ccpa_compliant")? != 0,
        gdpr_compliant: row.try_get::<i64, _>("gdpr_compliant")? != 0,
        notes: row.try_get("notes")?,
    })
}

/// Insert a broker, or replace the existing row with the same slug.
///
/// This is the registry's idempotent load primitive (§4.2): reloading the
/// same YAML document twice must leave a byte-identical row.
pub async fn upsert_broker_by_slug(pool: &SqlitePool, broker: &Broker) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO brokers (
            slug, name, url, category, opt_out_method, opt_out_url, opt_out_email,
            opt_out_phone, opt_out_mail_address, opt_out_steps, difficulty, automatable,
            recheck_days, ccpa_compliant, gdpr_compliant, notes
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(slug) DO UPDATE SET
            name = excluded.name,
            url = excluded.url,
            category = excluded.category,
            opt_out_method = excluded.opt_out_method,
            opt_out_url = excluded.opt_out_url,
            opt_out_email = excluded.opt_out_email,
            opt_out_phone = excluded.opt_out_phone,
            opt_out_mail_address = excluded.opt_out_mail_address,
            opt_out_steps = excluded.opt_out_steps,
            difficulty = excluded.difficulty,
            automatable = excluded.automatable,
            recheck_days = excluded.recheck_days,
            ccpa_compliant = excluded.ccpa_compliant,
            gdpr_compliant = excluded.gdpr_compliant,
            notes = excluded.notes
        RETURNING id
        "#,
    )
    .bind(&broker.slug)
    .bind(&broker.name)
    .bind(&broker.url)
    .bind(broker.category.as_str())
    .bind(broker.opt_out_method.map(|m| m.as_str()))
    .bind(&broker.opt_out_url)
    .bind(&broker.opt_out_email)
    .bind(&broker.opt_out_phone)
    .bind(&broker.opt_out_mail_address)
    .bind(encode_list(&broker.opt_out_steps))
    .bind(broker.difficulty.as_str())
    .bind(broker.automatable as i64)
    .bind(broker.recheck_days)
    .bind(broker.ccpa_compliant as i64)
    .bind(broker.gdpr_compliant as i64)
    .bind(&broker.notes)
    .fetch_one(pool)
    .await
    .with_context(|| format!("upsert_broker_by_slug({}) failed", broker.slug))?;

    result.try_get::<i64, _>("id").context("read new broker id")
}

pub async fn get_broker_by_slug(pool: &SqlitePool, slug: &str) -> Result<Broker> {
    let row = sqlx::query("SELECT * FROM brokers WHERE slug = ?")
        .bind(slug)
        .fetch_one(pool)
        .await
        .with_context(|| format!("no broker with slug {slug}"))?;
    row_to_broker(&row)
}

pub async fn get_broker(pool: &SqlitePool, id: i64) -> Result<Broker> {
    let row = sqlx::query("SELECT * FROM brokers WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .with_context(|| format!("no broker with id {id}"))?;
    row_to_broker(&row)
}

#[derive(Debug, Default, Clone)]
pub struct BrokerFilter {
    pub category: Option<BrokerCategory>,
    pub difficulty: Option<BrokerDifficulty>,
    pub automatable: Option<bool>,
}

pub async fn list_brokers(pool: &SqlitePool, filter: &BrokerFilter) -> Result<Vec<Broker>> {
    let rows = sqlx::query("SELECT * FROM brokers ORDER BY slug ASC")
        .fetch_all(pool)
        .await
        .context("list_brokers failed")?;

    rows.iter()
        .map(row_to_broker)
        .collect::<Result<Vec<_>>>()
        .map(|brokers| {
            brokers
                .into_iter()
                .filter(|b| filter.category.map_or(true, |c| c == b.category))
                .filter(|b| filter.difficulty.map_or(true, |d| d == b.difficulty))
                .filter(|b| filter.automatable.map_or(true, |a| a == b.automatable))
                .collect()
        })
}

#[derive(Debug, Clone, Default)]
pub struct BrokerStats {
    pub total: i64,
    pub automatable: i64,
}

pub async fn broker_stats(pool: &SqlitePool) -> Result<BrokerStats> {
    let row = sqlx::query(
        "SELECT COUNT(*) AS total, SUM(automatable) AS automatable FROM brokers",
    )
    .fetch_one(pool)
    .await
    .context("broker_stats failed")?;

    Ok(BrokerStats {
        total: row.try_get("total")?,
        automatable: row.try_get::<Option<i64>, _>("automatable")?.unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;

    fn sample_broker(slug: &str) -> Broker {
        Broker {
            id: 0,
            slug: slug.to_string(),
            name: "Test Broker".to_string(),
            url: "https://example.com".to_string(),
            category: BrokerCategory::PeopleSearch,
            opt_out_method: Some(OptOutMethod::Email),
            opt_out_url: None,
            opt_out_email: Some("privacy@example.com".to_string()),
            opt_out_phone: None,
            opt_out_mail_address: None,
            opt_out_steps: vec![],
            difficulty: BrokerDifficulty::Medium,
            automatable: true,
            recheck_days: 30,
            ccpa_compliant: true,
            gdpr_compliant: false,
            notes: None,
        }
    }

    #[tokio::test]
    async fn reloading_same_slug_is_byte_identical() {
        let pool = connect_in_memory().await.unwrap();
        let broker = sample_broker("testbroker");

        let id1 = upsert_broker_by_slug(&pool, &broker).await.unwrap();
        let id2 = upsert_broker_by_slug(&pool, &broker).await.unwrap();
        assert_eq!(id1, id2);

        let loaded = get_broker_by_slug(&pool, "testbroker").await.unwrap();
        assert_eq!(loaded.name, broker.name);
        assert_eq!(loaded.ccpa_compliant, broker.ccpa_compliant);
    }

    #[tokio::test]
    async fn upsert_replaces_prior_fields() {
        let pool = connect_in_memory().await.unwrap();
        let mut broker = sample_broker("testbroker");
        upsert_broker_by_slug(&pool, &broker).await.unwrap();

        broker.name = "Renamed Broker".to_string();
        broker.recheck_days = 45;
        upsert_broker_by_slug(&pool, &broker).await.unwrap();

        let loaded = get_broker_by_slug(&pool, "testbroker").await.unwrap();
        assert_eq!(loaded.name, "Renamed Broker");
        assert_eq!(loaded.recheck_days, 45);
    }
}
