use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entities::period::PeriodRecord;
pub use crate::entities::prediction::GapAnomaly;

/// Cycle length assumed when nothing has been measured
pub const DEFAULT_CYCLE_LENGTH: i64 = 28;

/// How the predictor's personal history is derived from measured gaps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FirstCycleHistory {
    /// Lead with a 28-day placeholder for the first cycle and drop the latest gap
    #[default]
    Placeholder,
    /// Use every measured gap
    MeasuredOnly,
}

/// Gaps between consecutive periods, plus anything odd found on the way
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleAnalysis {
    /// Whole days between consecutive start dates, oldest first; all positive
    pub gaps: Vec<i64>,
    /// Problems found while deriving the gaps
    pub anomalies: Vec<GapAnomaly>,
    /// Most recent start date
    pub latest_start: Option<NaiveDate>,
}

/// Whole days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Derive cycle gaps from a user's period records
pub fn analyze_cycles(records: &[PeriodRecord]) -> CycleAnalysis {
    let mut starts: Vec<NaiveDate> = records.iter().map(|record| record.start_date).collect();
    let mut anomalies = Vec::new();

    if starts.windows(2).any(|pair| pair[0] > pair[1]) {
        debug!("Period records arrived out of start-date order, sorting");
        anomalies.push(GapAnomaly::OutOfOrderInput);
    }
    starts.sort();

    let mut gaps = Vec::with_capacity(starts.len().saturating_sub(1));
    for pair in starts.windows(2) {
        let gap = days_between(pair[0], pair[1]);
        if gap == 0 {
            warn!("Ignoring zero-day cycle: duplicate start date {}", pair[1]);
            anomalies.push(GapAnomaly::DuplicateStartDate(pair[1]));
        } else {
            gaps.push(gap);
        }
    }

    CycleAnalysis {
        gaps,
        anomalies,
        latest_start: starts.last().copied(),
    }
}

impl CycleAnalysis {
    /// Gaps as floats, for the statistics functions
    pub fn measured(&self) -> Vec<f64> {
        self.gaps.iter().map(|gap| *gap as f64).collect()
    }

    /// History fed to the predictor
    pub fn predictor_history(&self, policy: FirstCycleHistory) -> Vec<f64> {
        match policy {
            FirstCycleHistory::MeasuredOnly => self.measured(),
            FirstCycleHistory::Placeholder => {
                if self.gaps.is_empty() {
                    return Vec::new();
                }
                std::iter::once(DEFAULT_CYCLE_LENGTH)
                    .chain(self.gaps[..self.gaps.len() - 1].iter().copied())
                    .map(|gap| gap as f64)
                    .collect()
            }
        }
    }

    /// Rounded mean of the measured gaps, or the default length
    pub fn average_cycle_length(&self) -> i64 {
        if self.gaps.is_empty() {
            return DEFAULT_CYCLE_LENGTH;
        }
        let total: i64 = self.gaps.iter().sum();
        (total as f64 / self.gaps.len() as f64).round() as i64
    }

    /// Shortest measured gap
    pub fn shortest(&self) -> Option<i64> {
        self.gaps.iter().min().copied()
    }

    /// Longest measured gap
    pub fn longest(&self) -> Option<i64> {
        self.gaps.iter().max().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{date, periods_starting};

    #[test]
    fn test_days_between_whole_days() {
        assert_eq!(days_between(date(2024, 1, 1), date(2024, 1, 29)), 28);
        assert_eq!(days_between(date(2024, 2, 28), date(2024, 3, 1)), 2);
        assert_eq!(days_between(date(2024, 1, 29), date(2024, 1, 1)), -28);
    }

    #[test]
    fn test_empty_and_single_history() {
        let empty = analyze_cycles(&[]);
        assert!(empty.gaps.is_empty());
        assert_eq!(empty.latest_start, None);
        assert_eq!(empty.average_cycle_length(), DEFAULT_CYCLE_LENGTH);

        let single = analyze_cycles(&periods_starting(&[date(2024, 1, 1)]));
        assert!(single.gaps.is_empty());
        assert_eq!(single.latest_start, Some(date(2024, 1, 1)));
        assert!(single.predictor_history(FirstCycleHistory::Placeholder).is_empty());
    }

    #[test]
    fn test_gaps_are_sorted_by_start_date() {
        let records = periods_starting(&[
            date(2024, 3, 1),
            date(2024, 1, 1),
            date(2024, 1, 31),
        ]);
        let analysis = analyze_cycles(&records);

        assert_eq!(analysis.gaps, vec![30, 30]);
        assert_eq!(analysis.latest_start, Some(date(2024, 3, 1)));
        assert_eq!(analysis.anomalies, vec![GapAnomaly::OutOfOrderInput]);
    }

    #[test]
    fn test_duplicate_start_dates_are_rejected() {
        let records = periods_starting(&[
            date(2024, 1, 1),
            date(2024, 1, 1),
            date(2024, 1, 29),
        ]);
        let analysis = analyze_cycles(&records);

        assert_eq!(analysis.gaps, vec![28]);
        assert_eq!(
            analysis.anomalies,
            vec![GapAnomaly::DuplicateStartDate(date(2024, 1, 1))]
        );
        assert!(analysis.gaps.iter().all(|gap| *gap > 0));
    }

    #[test]
    fn test_predictor_history_policies() {
        let records = periods_starting(&[
            date(2024, 1, 1),
            date(2024, 1, 31),
            date(2024, 3, 1),
            date(2024, 3, 26),
        ]);
        let analysis = analyze_cycles(&records);
        assert_eq!(analysis.gaps, vec![30, 30, 25]);

        assert_eq!(
            analysis.predictor_history(FirstCycleHistory::Placeholder),
            vec![28.0, 30.0, 30.0]
        );
        assert_eq!(
            analysis.predictor_history(FirstCycleHistory::MeasuredOnly),
            vec![30.0, 30.0, 25.0]
        );
    }

    #[test]
    fn test_summary_helpers() {
        let records = periods_starting(&[
            date(2024, 1, 1),
            date(2024, 1, 27),
            date(2024, 2, 29),
        ]);
        let analysis = analyze_cycles(&records);
        assert_eq!(analysis.gaps, vec![26, 33]);
        assert_eq!(analysis.average_cycle_length(), 30);
        assert_eq!(analysis.shortest(), Some(26));
        assert_eq!(analysis.longest(), Some(33));
    }
}
