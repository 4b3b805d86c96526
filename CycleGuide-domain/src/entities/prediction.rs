use std::fmt;

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

/// Fertility window as day offsets from the start of a cycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertilityWindow {
    /// First fertile day, counted from cycle start
    pub start_day_offset: i64,
    /// Last fertile day, counted from cycle start
    pub end_day_offset: i64,
}

/// Next-cycle forecast
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Prediction {
    /// Predicted length of the upcoming cycle in days
    pub cycle_length_days: i64,

    /// Estimated ovulation day within the cycle
    pub ovulation_day: i64,

    /// Confidence in the forecast, 0 to 100
    pub confidence_percent: u8,

    /// Estimated fertile days within the cycle
    pub fertility_window: FertilityWindow,

    /// Start date of the next period, when a last period is known
    pub predicted_date: Option<NaiveDate>,
}

impl Default for Prediction {
    /// Forecast used when there is no personal history at all
    fn default() -> Self {
        Self {
            cycle_length_days: 28,
            ovulation_day: 14,
            confidence_percent: 50,
            fertility_window: FertilityWindow {
                start_day_offset: 11,
                end_day_offset: 17,
            },
            predicted_date: None,
        }
    }
}

/// How much cycle lengths vary, by the spread between shortest and longest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Regularity {
    /// Spread of at most 2 days
    VeryRegular,
    /// Spread of at most 7 days
    Regular,
    /// Spread of at most 14 days
    SomewhatIrregular,
    /// Anything wider
    Irregular,
}

impl Regularity {
    /// Classify a spread (longest minus shortest cycle) in days
    pub fn from_spread(spread_days: i64) -> Self {
        if spread_days <= 2 {
            Regularity::VeryRegular
        } else if spread_days <= 7 {
            Regularity::Regular
        } else if spread_days <= 14 {
            Regularity::SomewhatIrregular
        } else {
            Regularity::Irregular
        }
    }
}

impl fmt::Display for Regularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Regularity::VeryRegular => "Very Regular",
            Regularity::Regular => "Regular",
            Regularity::SomewhatIrregular => "Somewhat Irregular",
            Regularity::Irregular => "Irregular",
        };
        f.write_str(label)
    }
}

/// Data-quality problem found in a user's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapAnomaly {
    /// Two records share a start date
    DuplicateStartDate(NaiveDate),
    /// Records were not supplied in start-date order
    OutOfOrderInput,
}

/// Summary of a user's own cycle history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleStatistics {
    /// Rounded mean cycle length, 28 when there is no history
    pub mean_cycle_length: i64,

    /// Shortest observed cycle
    pub shortest: Option<i64>,

    /// Longest observed cycle
    pub longest: Option<i64>,

    /// Regularity tier, when at least one cycle has been observed
    pub regularity: Option<Regularity>,

    /// Number of observed cycles
    pub cycle_count: usize,

    /// Duplicate or out-of-order records found while measuring
    #[serde(default)]
    pub anomalies: Vec<GapAnomaly>,
}
