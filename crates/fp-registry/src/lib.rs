//! Broker registry: loads declarative broker definitions from a directory of
//! YAML documents, validates them, and upserts them into the store.
//!
//! Reading is best-effort per file: one malformed document is reported and
//! skipped, it never fails the whole load (§4.2).

use std::path::Path;

use anyhow::{Context, Result};
use fp_store::upsert_broker_by_slug;
use fp_types::{Broker, BrokerCategory, BrokerDifficulty, OptOutMethod};
use serde::Deserialize;
use sqlx::SqlitePool;

#[derive(Debug, Deserialize)]
struct OptOutDoc {
    method: Option<String>,
    url: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    mail_address: Option<String>,
    #[serde(default)]
    steps: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BrokerDoc {
    name: Option<String>,
    url: Option<String>,
    category: Option<String>,
    difficulty: Option<String>,
    #[serde(default)]
    automatable: bool,
    recheck_days: Option<i64>,
    #[serde(default)]
    ccpa_compliant: bool,
    #[serde(default)]
    gdpr_compliant: bool,
    notes: Option<String>,
    opt_out: Option<OptOutDoc>,
}

/// One file's worth of load outcome, for reporting back to the caller.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Upserted { slug: String, broker_id: i64 },
    Invalid { slug: String, reason: String },
}

#[derive(Debug, Clone, Default)]
pub struct RegistryLoadReport {
    pub outcomes: Vec<LoadOutcome>,
}

impl RegistryLoadReport {
    pub fn upserted_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Upserted { .. }))
            .count()
    }

    pub fn invalid(&self) -> Vec<&LoadOutcome> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, LoadOutcome::Invalid { .. }))
            .collect()
    }
}

fn validate(slug: &str, doc: BrokerDoc) -> Result<Broker, String> {
    let name = doc.name.ok_or("missing required field: name")?;
    let url = doc.url.ok_or("missing required field: url")?;
    let category_raw = doc.category.ok_or("missing required field: category")?;
    let category: BrokerCategory = category_raw
        .parse()
        .map_err(|_| format!("unknown category: {category_raw}"))?;

    let difficulty = match doc.difficulty {
        Some(d) => d
            .parse::<BrokerDifficulty>()
            .map_err(|_| format!("unknown difficulty: {d}"))?,
        None => BrokerDifficulty::Medium,
    };

    let opt_out = doc.opt_out.unwrap_or(OptOutDoc {
        method: None,
        url: None,
        email: None,
        phone: None,
        mail_address: None,
        steps: vec![],
    });

    let opt_out_method = match opt_out.method {
        Some(m) => Some(
            m.parse::<OptOutMethod>()
                .map_err(|_| format!("unknown opt_out.method: {m}"))?,
        ),
        None => None,
    };

    Ok(Broker {
        id: 0,
        slug: slug.to_string(),
        name,
        url,
        category,
        opt_out_method,
        opt_out_url: opt_out.url,
        opt_out_email: opt_out.email,
        opt_out_phone: opt_out.phone,
        opt_out_mail_address: opt_out.mail_address,
        opt_out_steps: opt_out.steps,
        difficulty,
        automatable: doc.automatable,
        recheck_days: doc.recheck_days.unwrap_or(Broker::DEFAULT_RECHECK_DAYS),
        ccpa_compliant: doc.ccpa_compliant,
        gdpr_compliant: doc.gdpr_compliant,
        notes: doc.notes,
    })
}

/// Load every non-leading-underscore `.yaml`/`.yml` document in `dir`, in
/// sorted filename order, and upsert each valid one by slug. Invalid
/// documents are reported in the returned report but never abort the load.
pub async fn load_registry(pool: &SqlitePool, dir: &Path) -> Result<RegistryLoadReport> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("read broker registry dir {:?}", dir))?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            let is_yaml = p
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            let leading_underscore = p
                .file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.starts_with('_'))
                .unwrap_or(false);
            is_yaml && !leading_underscore
        })
        .collect();
    entries.sort();

    let mut report = RegistryLoadReport::default();

    for path in entries {
        let slug = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_string();

        let outcome = match load_one(pool, &path, &slug).await {
            Ok(broker_id) => LoadOutcome::Upserted {
                slug: slug.clone(),
                broker_id,
            },
            Err(reason) => {
                tracing::warn!(slug = %slug, reason = %reason, "skipping invalid broker document");
                LoadOutcome::Invalid { slug: slug.clone(), reason }
            }
        };
        report.outcomes.push(outcome);
    }

    Ok(report)
}

async fn load_one(pool: &SqlitePool, path: &Path, slug: &str) -> Result<i64, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    let doc: BrokerDoc = serde_yaml::from_str(&raw).map_err(|e| e.to_string())?;
    let broker = validate(slug, doc)?;
    upsert_broker_by_slug(pool, &broker)
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fp_store::{connect_in_memory, get_broker_by_slug};
    use std::io::Write;

    fn write_doc(dir: &Path, name: &str, contents: &str) {
        let mut f = std::fs::File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn valid_and_invalid_documents_coexist() {
        let pool = connect_in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();

        write_doc(
            dir.path(),
            "testbroker.yaml",
            r#"
name: Test Broker
url: https://example.com
category: people_search
ccpa_compliant: true
opt_out:
  method: email
  email: privacy@testbroker.com
"#,
        );
        write_doc(
            dir.path(),
            "broken.yaml",
            r#"
name: Missing URL And Category
"#,
        );
        write_doc(dir.path(), "_template.yaml", "name: ignored\nurl: x\ncategory: x\n");

        let report = load_registry(&pool, dir.path()).await.unwrap();
        assert_eq!(report.upserted_count(), 1);
        assert_eq!(report.invalid().len(), 1);

        let broker = get_broker_by_slug(&pool, "testbroker").await.unwrap();
        assert!(broker.ccpa_compliant);
        assert_eq!(broker.recheck_days, Broker::DEFAULT_RECHECK_DAYS);
    }

    #[tokio::test]
    async fn reloading_is_idempotent_by_slug() {
        let pool = connect_in_memory().await.unwrap();
        let dir = tempfile::tempdir().unwrap();
        write_doc(
            dir.path(),
            "testbroker.yaml",
            "name: Test Broker\nurl: https://example.com\ncategory: people_search\n",
        );

        load_registry(&pool, dir.path()).await.unwrap();
        let report2 = load_registry(&pool, dir.path()).await.unwrap();
        assert_eq!(report2.upserted_count(), 1);
    }
}
