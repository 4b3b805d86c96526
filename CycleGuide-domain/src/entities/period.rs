use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use validator::Validate;

/// Flow intensity recorded with a period
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlowIntensity {
    /// Light flow
    Light,
    /// Medium flow
    Medium,
    /// Heavy flow
    Heavy,
}

impl fmt::Display for FlowIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowIntensity::Light => "light",
            FlowIntensity::Medium => "medium",
            FlowIntensity::Heavy => "heavy",
        };
        f.write_str(label)
    }
}

impl FromStr for FlowIntensity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(FlowIntensity::Light),
            "medium" => Ok(FlowIntensity::Medium),
            "heavy" => Ok(FlowIntensity::Heavy),
            other => Err(format!("Invalid flow intensity: {}", other)),
        }
    }
}

/// Domain model for a logged period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeriodRecord {
    /// Unique identifier for the record
    pub id: String,

    /// Identifier of the user who logged the period
    pub owner_id: String,

    /// First day of bleeding
    pub start_date: NaiveDate,

    /// Last day of bleeding, never before `start_date`
    pub end_date: NaiveDate,

    /// Flow intensity
    pub flow: FlowIntensity,

    /// Optional free-text notes
    pub notes: Option<String>,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl PeriodRecord {
    /// Number of bleeding days, inclusive of both ends
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }
}

/// Request payload for logging a new period
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePeriodRequest {
    /// Identifier of the user logging the period
    #[validate(length(min = 1, message = "Owner id must not be empty"))]
    pub owner_id: String,

    /// First day of bleeding
    pub start_date: NaiveDate,

    /// Last day of bleeding
    pub end_date: NaiveDate,

    /// Flow intensity
    pub flow: FlowIntensity,

    /// Optional notes about the period
    #[validate(length(max = 1000, message = "Notes cannot exceed 1000 characters"))]
    pub notes: Option<String>,
}
