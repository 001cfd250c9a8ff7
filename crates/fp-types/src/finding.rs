use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Severity;

/// Status lifecycle of a Finding. Monotone forward except an explicit admin
/// reset (not modeled here; resets go through the same `update` path).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Active,
    RemovalPending,
    Removed,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Active => "active",
            FindingStatus::RemovalPending => "removal_pending",
            FindingStatus::Removed => "removed",
        }
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(FindingStatus::Active),
            "removal_pending" => Ok(FindingStatus::RemovalPending),
            "removed" => Ok(FindingStatus::Removed),
            other => Err(anyhow::anyhow!("unknown finding status: {other}")),
        }
    }
}

/// A single piece of discovered exposure, tied to a person and optionally a
/// broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: i64,
    pub person_id: i64,
    pub broker_id: Option<i64>,
    pub source: String,
    pub finding_type: String,
    pub data_found: Value,
    pub risk_level: Severity,
    pub url: Option<String>,
    pub screenshot_path: Option<String>,
    pub status: FindingStatus,
    pub discovered_at: DateTime<Utc>,
}
