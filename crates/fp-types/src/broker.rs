use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of broker categories (§3 data model).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerCategory {
    PeopleSearch,
    BackgroundCheck,
    PublicRecords,
    Marketing,
    SocialAggregator,
    Property,
    Financial,
    Genealogy,
    ReverseLookup,
    ImageSearch,
}

impl BrokerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrokerCategory::PeopleSearch => "people_search",
            BrokerCategory::BackgroundCheck => "background_check",
            BrokerCategory::PublicRecords => "public_records",
            BrokerCategory::Marketing => "marketing",
            BrokerCategory::SocialAggregator => "social_aggregator",
            BrokerCategory::Property => "property",
            BrokerCategory::Financial => "financial",
            BrokerCategory::Genealogy => "genealogy",
            BrokerCategory::ReverseLookup => "reverse_lookup",
            BrokerCategory::ImageSearch => "image_search",
        }
    }
}

impl fmt::Display for BrokerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrokerCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use BrokerCategory::*;
        Ok(match s {
            "people_search" => PeopleSearch,
            "background_check" => BackgroundCheck,
            "public_records" => PublicRecords,
            "marketing" => Marketing,
            "social_aggregator" => SocialAggregator,
            "property" => Property,
            "financial" => Financial,
            "genealogy" => Genealogy,
            "reverse_lookup" => ReverseLookup,
            "image_search" => ImageSearch,
            other => return Err(anyhow::anyhow!("unknown broker category: {other}")),
        })
    }
}

/// Closed set of opt-out methods a broker may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptOutMethod {
    WebForm,
    Email,
    Api,
    Phone,
    Mail,
}

impl OptOutMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptOutMethod::WebForm => "web_form",
            OptOutMethod::Email => "email",
            OptOutMethod::Api => "api",
            OptOutMethod::Phone => "phone",
            OptOutMethod::Mail => "mail",
        }
    }
}

impl fmt::Display for OptOutMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OptOutMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use OptOutMethod::*;
        Ok(match s {
            "web_form" => WebForm,
            "email" => Email,
            "api" => Api,
            "phone" => Phone,
            "mail" => Mail,
            other => return Err(anyhow::anyhow!("unknown opt-out method: {other}")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrokerDifficulty {
    Easy,
    Medium,
    Hard,
    Manual,
}

impl Default for BrokerDifficulty {
    fn default() -> Self {
        BrokerDifficulty::Medium
    }
}

impl BrokerDifficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrokerDifficulty::Easy => "easy",
            BrokerDifficulty::Medium => "medium",
            BrokerDifficulty::Hard => "hard",
            BrokerDifficulty::Manual => "manual",
        }
    }
}

impl fmt::Display for BrokerDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BrokerDifficulty {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use BrokerDifficulty::*;
        Ok(match s {
            "easy" => Easy,
            "medium" => Medium,
            "hard" => Hard,
            "manual" => Manual,
            other => return Err(anyhow::anyhow!("unknown broker difficulty: {other}")),
        })
    }
}

/// A declarative broker definition, loaded from YAML and upserted by slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Broker {
    pub id: i64,
    pub slug: String,
    pub name: String,
    pub url: String,
    pub category: BrokerCategory,
    pub opt_out_method: Option<OptOutMethod>,
    pub opt_out_url: Option<String>,
    pub opt_out_email: Option<String>,
    pub opt_out_phone: Option<String>,
    pub opt_out_mail_address: Option<String>,
    pub opt_out_steps: Vec<String>,
    pub difficulty: BrokerDifficulty,
    pub automatable: bool,
    pub recheck_days: i64,
    pub ccpa_compliant: bool,
    pub gdpr_compliant: bool,
    pub notes: Option<String>,
}

impl Broker {
    /// Default recheck interval when a YAML document omits the field.
    pub const DEFAULT_RECHECK_DAYS: i64 = 30;
}
