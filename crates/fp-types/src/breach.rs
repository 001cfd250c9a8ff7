use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreachSource {
    Hibp,
    Dehashed,
    Paste,
}

impl BreachSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            BreachSource::Hibp => "hibp",
            BreachSource::Dehashed => "dehashed",
            BreachSource::Paste => "paste",
        }
    }
}

impl fmt::Display for BreachSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreachSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hibp" => Ok(BreachSource::Hibp),
            "dehashed" => Ok(BreachSource::Dehashed),
            "paste" => Ok(BreachSource::Paste),
            other => Err(anyhow::anyhow!("unknown breach source: {other}")),
        }
    }
}

/// A credential-breach or paste exposure tied to a person's email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breach {
    pub id: i64,
    pub person_id: i64,
    pub breach_name: String,
    pub source: BreachSource,
    pub breach_date: Option<NaiveDate>,
    pub data_types: Vec<String>,
    pub severity: Severity,
    pub action_taken: Option<String>,
}
