use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use fp_types::{Person, Relation};
use sqlx::{Row, SqlitePool};

use crate::{decode_list, encode_list};

/// Fields accepted by a partial person update. `None` leaves a field
/// unchanged; list fields, when present, replace the stored list wholesale.
#[derive(Debug, Default, Clone)]
pub struct PersonUpdate {
    pub name: Option<String>,
    pub relation: Option<Relation>,
    pub emails: Option<Vec<String>>,
    pub phones: Option<Vec<String>>,
    pub addresses: Option<Vec<String>>,
    pub usernames: Option<Vec<String>>,
    pub date_of_birth: Option<Option<NaiveDate>>,
}

fn row_to_person(row: &sqlx::sqlite::SqliteRow) -> Result<Person> {
    let relation_raw: String = row.try_get("relation")?;
    Ok(Person {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        relation: Relation::from_str(&relation_raw)?,
        emails: decode_list(&row.try_get::<String, _>("emails")?),
        phones: decode_list(&row.try_get::<String, _>("phones")?),
        addresses: decode_list(&row.try_get::<String, _>("addresses")?),
        usernames: decode_list(&row.try_get::<String, _>("usernames")?),
        date_of_birth: row.try_get("date_of_birth")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub async fn insert_person(
    pool: &SqlitePool,
    name: &str,
    relation: Relation,
    emails: &[String],
    phones: &[String],
    addresses: &[String],
    usernames: &[String],
    date_of_birth: Option<NaiveDate>,
) -> Result<i64> {
    let now = Utc::now();
    let result = sqlx::query(
        r#"
        INSERT INTO persons (name, relation, emails, phones, addresses, usernames, date_of_birth, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(relation.as_str())
    .bind(encode_list(emails))
    .bind(encode_list(phones))
    .bind(encode_list(addresses))
    .bind(encode_list(usernames))
    .bind(date_of_birth)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("insert_person failed")?;

    Ok(result.last_insert_rowid())
}

pub async fn get_person(pool: &SqlitePool, id: i64) -> Result<Person> {
    let row = sqlx::query("SELECT * FROM persons WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .with_context(|| format!("get_person {id} failed"))?;
    row_to_person(&row)
}

pub async fn list_persons(pool: &SqlitePool) -> Result<Vec<Person>> {
    let rows = sqlx::query("SELECT * FROM persons ORDER BY id ASC")
        .fetch_all(pool)
        .await
        .context("list_persons failed")?;
    rows.iter().map(row_to_person).collect()
}

pub async fn update_person(pool: &SqlitePool, id: i64, update: PersonUpdate) -> Result<()> {
    let existing = get_person(pool, id).await?;

    let name = update.name.unwrap_or(existing.name);
    let relation = update.relation.unwrap_or(existing.relation);
    let emails = update.emails.unwrap_or(existing.emails);
    let phones = update.phones.unwrap_or(existing.phones);
    let addresses = update.addresses.unwrap_or(existing.addresses);
    let usernames = update.usernames.unwrap_or(existing.usernames);
    let date_of_birth = update.date_of_birth.unwrap_or(existing.date_of_birth);

    let result = sqlx::query(
        r#"
        UPDATE persons
        SET name = ?, relation = ?, emails = ?, phones = ?, addresses = ?, usernames = ?,
            date_of_birth = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(name)
    .bind(relation.as_str())
    .bind(encode_list(&emails))
    .bind(encode_list(&phones))
    .bind(encode_list(&addresses))
    .bind(encode_list(&usernames))
    .bind(date_of_birth)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await
    .with_context(|| format!("update_person {id} failed"))?;

    if result.rows_affected() == 0 {
        anyhow::bail!("update_person: no person with id {id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;

    #[tokio::test]
    async fn insert_then_get_round_trips_list_order() {
        let pool = connect_in_memory().await.unwrap();
        let id = insert_person(
            &pool,
            "John Doe",
            Relation::SelfPerson,
            &["b@example.com".to_string(), "a@example.com".to_string()],
            &[],
            &[],
            &[],
            None,
        )
        .await
        .unwrap();

        let person = get_person(&pool, id).await.unwrap();
        assert_eq!(
            person.emails,
            vec!["b@example.com".to_string(), "a@example.com".to_string()]
        );
        assert_eq!(person.relation, Relation::SelfPerson);
        assert!(person.updated_at >= person.created_at);
    }

    #[tokio::test]
    async fn update_touches_updated_at_and_replaces_lists() {
        let pool = connect_in_memory().await.unwrap();
        let id = insert_person(&pool, "Jane", Relation::Spouse, &[], &[], &[], &[], None)
            .await
            .unwrap();
        let before = get_person(&pool, id).await.unwrap();

        update_person(
            &pool,
            id,
            PersonUpdate {
                emails: Some(vec!["jane@example.com".to_string()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let after = get_person(&pool, id).await.unwrap();
        assert_eq!(after.emails, vec!["jane@example.com".to_string()]);
        assert!(after.updated_at >= before.updated_at);
    }
}
