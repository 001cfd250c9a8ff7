use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::OptOutMethod;

/// The removal state machine (§4.5). `Confirmed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStatus {
    Pending,
    Submitted,
    InstructionsGenerated,
    Confirmed,
    StillFound,
    Failed,
}

impl RemovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalStatus::Pending => "pending",
            RemovalStatus::Submitted => "submitted",
            RemovalStatus::InstructionsGenerated => "instructions_generated",
            RemovalStatus::Confirmed => "confirmed",
            RemovalStatus::StillFound => "still_found",
            RemovalStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RemovalStatus::Confirmed | RemovalStatus::Failed)
    }
}

impl fmt::Display for RemovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemovalStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use RemovalStatus::*;
        Ok(match s {
            "pending" => Pending,
            "submitted" => Submitted,
            "instructions_generated" => InstructionsGenerated,
            "confirmed" => Confirmed,
            "still_found" => StillFound,
            "failed" => Failed,
            other => return Err(anyhow::anyhow!("unknown removal status: {other}")),
        })
    }
}

/// A removal request tracked from submission through verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Removal {
    pub id: i64,
    pub person_id: i64,
    pub broker_id: i64,
    pub method: OptOutMethod,
    pub finding_id: Option<i64>,
    pub status: RemovalStatus,
    pub submitted_at: Option<DateTime<Utc>>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub last_checked_at: Option<DateTime<Utc>>,
    pub attempts: i64,
    pub next_check_at: Option<DateTime<Utc>>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl Removal {
    /// Verification stops retrying and declares `failed` once attempts
    /// exceed this cap following a found=true check (§4.5, §7 policy).
    pub const MAX_VERIFICATION_ATTEMPTS: i64 = 3;
}
