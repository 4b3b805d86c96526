// Testing utilities for the domain layer
// Only compiled for tests or when the "mock" feature is enabled

pub use cycle_guide_data::repository::tests::MockPeriodRepository;

pub use crate::telemetry::init_test_tracing;

/// Builders for period histories and training tables
pub mod fixtures {
    use chrono::{Duration, NaiveDate, TimeZone, Utc};

    use crate::entities::period::{FlowIntensity, PeriodRecord};

    /// Owner used by fixture records
    pub const TEST_OWNER: &str = "test-user";

    /// A small population table with one 20s cohort large enough to be trusted
    pub const SAMPLE_TRAINING_TABLE: &str = "\
ClientID,LengthofCycle,EstimatedDayofOvulation,TotalMensesScore,TotalDaysofFertility,Age
nfp8122,29,17,8,9,26
nfp8122,27,15,9,8,26
nfp8122,29,15,7,10,26
nfp8114,27,15,11,8,24
nfp8114,28,14,10,7,24
nfp8114,30,16,12,7,24
nfp8109,28,14,9,6,22
nfp8109,26,12,8,6,22
nfp8109,31,17,10,8,22
nfp8107,29,15,11,7,28
nfp8107,28,14,12,6,28
nfp8107,30,16,9,7,28
nfp8200,33,19,13,5,36
nfp8200,32,18,12,6,36
nfp8201,,14,10,6,31
";

    /// Calendar date shorthand
    pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
    }

    /// A five-day period starting on `start`
    pub fn period(index: usize, start: NaiveDate) -> PeriodRecord {
        PeriodRecord {
            id: format!("period-{}", index),
            owner_id: TEST_OWNER.to_string(),
            start_date: start,
            end_date: start + Duration::days(4),
            flow: FlowIntensity::Medium,
            notes: None,
            created_at: Utc
                .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
                .single()
                .expect("valid fixture timestamp"),
        }
    }

    /// Periods starting on each date, in the order given
    pub fn periods_starting(starts: &[NaiveDate]) -> Vec<PeriodRecord> {
        starts
            .iter()
            .enumerate()
            .map(|(index, start)| period(index, *start))
            .collect()
    }

    /// Periods with the given gaps between consecutive starts, beginning on `first`
    pub fn periods_with_gaps(first: NaiveDate, gaps: &[i64]) -> Vec<PeriodRecord> {
        let mut starts = vec![first];
        for gap in gaps {
            let previous = starts[starts.len() - 1];
            starts.push(previous + Duration::days(*gap));
        }
        periods_starting(&starts)
    }
}
