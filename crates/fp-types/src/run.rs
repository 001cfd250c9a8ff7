use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Append-only per-person pipeline invocation record (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineRunStatus {
    Running,
    Completed,
    Error,
}

impl PipelineRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineRunStatus::Running => "running",
            PipelineRunStatus::Completed => "completed",
            PipelineRunStatus::Error => "error",
        }
    }
}

impl fmt::Display for PipelineRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineRunStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(PipelineRunStatus::Running),
            "completed" => Ok(PipelineRunStatus::Completed),
            "error" => Ok(PipelineRunStatus::Error),
            other => Err(anyhow::anyhow!("unknown pipeline run status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRunRow {
    pub id: i64,
    pub person_id: i64,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: PipelineRunStatus,
    pub breaches_found: i64,
    pub dark_web_findings: i64,
    pub accounts_found: i64,
    pub removals_submitted: i64,
    pub risk_score: i64,
    pub error: Option<String>,
}

/// Append-only scheduler invocation record (§3.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduledRunStatus {
    Success,
    Skipped,
    Failed,
}

impl ScheduledRunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduledRunStatus::Success => "success",
            ScheduledRunStatus::Skipped => "skipped",
            ScheduledRunStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for ScheduledRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduledRunStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ScheduledRunStatus::Success),
            "skipped" => Ok(ScheduledRunStatus::Skipped),
            "failed" => Ok(ScheduledRunStatus::Failed),
            other => Err(anyhow::anyhow!("unknown scheduled run status: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledRunRow {
    pub id: i64,
    pub job_name: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: Option<ScheduledRunStatus>,
    pub details: Value,
    pub error: Option<String>,
}
