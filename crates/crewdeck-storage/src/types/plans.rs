//! Subscription plan vocabulary.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subscription plan tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanCode {
    Free,
    Team,
    Enterprise,
    Custom,
}

impl PlanCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanCode::Free => "free",
            PlanCode::Team => "team",
            PlanCode::Enterprise => "enterprise",
            PlanCode::Custom => "custom",
        }
    }

    /// Case-insensitive parse. Returns `None` for anything outside the known
    /// set; the entitlement resolver maps that to the free plan rather than
    /// erroring.
    pub fn parse_lenient(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Some(PlanCode::Free),
            "team" => Some(PlanCode::Team),
            "enterprise" => Some(PlanCode::Enterprise),
            "custom" => Some(PlanCode::Custom),
            _ => None,
        }
    }
}

impl FromStr for PlanCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanCode::parse_lenient(s).ok_or_else(|| format!("invalid plan code: {}", s))
    }
}

impl std::fmt::Display for PlanCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subscription status for an organization's plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Active,
    PastDue,
    Canceled,
}

impl PlanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Active => "active",
            PlanStatus::PastDue => "past_due",
            PlanStatus::Canceled => "canceled",
        }
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(PlanStatus::Active),
            "past_due" => Ok(PlanStatus::PastDue),
            "canceled" => Ok(PlanStatus::Canceled),
            _ => Err(format!("invalid plan status: {}", s)),
        }
    }
}

impl std::fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
