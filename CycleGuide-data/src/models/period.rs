use serde::{Deserialize, Serialize};

/// Storage model for a logged period
///
/// Dates are kept as `YYYY-MM-DD` strings and `created_at` as RFC 3339, the
/// same text representation used by the SQLite schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRecord {
    /// Unique identifier for the record
    pub id: String,

    /// Identifier of the user who logged the period
    pub owner_id: String,

    /// First day of bleeding
    pub start_date: String,

    /// Last day of bleeding
    pub end_date: String,

    /// Flow intensity (light, medium or heavy)
    pub flow: String,

    /// Optional free-text notes
    pub notes: Option<String>,

    /// When the record was created
    pub created_at: String,
}

/// Input data for creating a new period record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePeriodRequest {
    /// Identifier of the user who logged the period
    pub owner_id: String,

    /// First day of bleeding
    pub start_date: String,

    /// Last day of bleeding
    pub end_date: String,

    /// Flow intensity (light, medium or heavy)
    pub flow: String,

    /// Optional free-text notes
    pub notes: Option<String>,
}
