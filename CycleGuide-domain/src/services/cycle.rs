//! Display-facing cycle service.
//!
//! Wraps the analyzer, predictor and insight generator behind the handful of
//! calls a tracker UI needs. Holds the shared population model and the engine
//! configuration; everything else is computed per call from the records given.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::EngineConfig;
use crate::entities::insight::Insight;
use crate::entities::period::PeriodRecord;
use crate::entities::population::{PopulationHighlights, PopulationModel, TrainingSummary};
use crate::entities::prediction::{CycleStatistics, Prediction, Regularity};
use crate::services::cycle_analysis::{analyze_cycles, days_between};
use crate::services::{insights, prediction};

/// Cycle predictions and insights for one user's history
#[derive(Debug, Clone)]
pub struct CycleService {
    model: Arc<PopulationModel>,
    config: EngineConfig,
}

impl CycleService {
    /// Create a service over a shared population model
    pub fn new(model: Arc<PopulationModel>, config: EngineConfig) -> Self {
        Self { model, config }
    }

    /// The population model in use
    pub fn model(&self) -> &PopulationModel {
        &self.model
    }

    /// The engine configuration in use
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn age_or_default(&self, user_age: Option<u32>) -> u32 {
        user_age.unwrap_or(self.config.default_user_age)
    }

    /// Start date of the next period, if anything has been logged
    pub fn predict_next_period(&self, records: &[PeriodRecord]) -> Option<NaiveDate> {
        self.predict_with_confidence(records, None).predicted_date
    }

    /// Full forecast for the next cycle
    ///
    /// Nothing logged gives the default forecast; from the first period on,
    /// the population or cohort prior applies.
    pub fn predict_with_confidence(&self, records: &[PeriodRecord], user_age: Option<u32>) -> Prediction {
        if records.is_empty() {
            return Prediction::default();
        }

        let analysis = analyze_cycles(records);
        let history = analysis.predictor_history(self.config.first_cycle_history);

        let mut forecast =
            prediction::predict_from_prior(&history, self.age_or_default(user_age), &self.model);
        if self.config.clamp_negative_offsets {
            forecast = prediction::clamp_offsets(forecast);
        }
        prediction::with_predicted_date(forecast, analysis.latest_start)
    }

    /// Summary of the user's measured cycles
    pub fn cycle_statistics(&self, records: &[PeriodRecord]) -> CycleStatistics {
        let analysis = analyze_cycles(records);
        let regularity = match (analysis.shortest(), analysis.longest()) {
            (Some(shortest), Some(longest)) => Some(Regularity::from_spread(longest - shortest)),
            _ => None,
        };

        CycleStatistics {
            mean_cycle_length: analysis.average_cycle_length(),
            shortest: analysis.shortest(),
            longest: analysis.longest(),
            regularity,
            cycle_count: analysis.gaps.len(),
            anomalies: analysis.anomalies,
        }
    }

    /// Insights comparing the user with the population
    pub fn generate_insights(&self, records: &[PeriodRecord], user_age: Option<u32>) -> Vec<Insight> {
        insights::generate_insights(records, self.age_or_default(user_age), &self.model)
    }

    /// Tip to show today
    pub fn health_tip(&self, records: &[PeriodRecord], user_age: Option<u32>, today: NaiveDate) -> String {
        let days_since = self.days_since_last_period(records, today);
        let insights = if days_since.is_some() {
            self.generate_insights(records, user_age)
        } else {
            Vec::new()
        };
        insights::select_health_tip(&insights, days_since)
    }

    /// Whole days since the most recent period started
    pub fn days_since_last_period(&self, records: &[PeriodRecord], today: NaiveDate) -> Option<i64> {
        records
            .iter()
            .map(|record| record.start_date)
            .max()
            .map(|latest| days_between(latest, today))
    }

    /// Whole days until the predicted next period; negative when overdue
    pub fn days_until_next_period(&self, records: &[PeriodRecord], today: NaiveDate) -> Option<i64> {
        let next = self.predict_next_period(records)?;
        let days = days_between(today, next);
        debug!("Next period predicted for {} ({} days from {})", next, days, today);
        Some(days)
    }

    /// Where the population model came from
    pub fn training_summary(&self) -> TrainingSummary {
        self.model.training.clone()
    }

    /// Headline population figures
    pub fn population_highlights(&self) -> PopulationHighlights {
        self.model.highlights()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::insight::CyclePhase;
    use crate::entities::population::AgeCohortModel;
    use crate::entities::prediction::GapAnomaly;
    use crate::services::cycle_analysis::FirstCycleHistory;
    use crate::services::insights::NO_HISTORY_TIP;
    use crate::services::population::train_population_model;
    use crate::testing::fixtures::{date, periods_starting, periods_with_gaps, SAMPLE_TRAINING_TABLE};

    fn fallback_service() -> CycleService {
        CycleService::new(Arc::new(PopulationModel::fallback()), EngineConfig::default())
    }

    #[test]
    fn test_no_records() {
        let service = fallback_service();

        assert_eq!(service.predict_next_period(&[]), None);
        assert_eq!(service.predict_with_confidence(&[], None), Prediction::default());

        let stats = service.cycle_statistics(&[]);
        assert_eq!(stats.mean_cycle_length, 28);
        assert_eq!(stats.shortest, None);
        assert_eq!(stats.regularity, None);

        assert_eq!(service.generate_insights(&[], None), vec![Insight::track_more_cycles()]);
        assert_eq!(service.health_tip(&[], None, date(2024, 5, 1)), NO_HISTORY_TIP);
        assert_eq!(service.days_since_last_period(&[], date(2024, 5, 1)), None);
        assert_eq!(service.days_until_next_period(&[], date(2024, 5, 1)), None);
    }

    #[test]
    fn test_single_record_uses_population_prior() {
        let service = fallback_service();
        let records = periods_starting(&[date(2024, 3, 1)]);

        let forecast = service.predict_with_confidence(&records, None);
        assert_eq!(forecast.cycle_length_days, 28);
        assert_eq!(forecast.confidence_percent, 70);
        assert_eq!(forecast.predicted_date, Some(date(2024, 3, 29)));
    }

    #[test]
    fn test_single_record_uses_trusted_cohort() {
        let mut model = PopulationModel::fallback();
        model.age_cohorts.insert(
            30,
            AgeCohortModel {
                mean: 32.0,
                standard_deviation: 2.5,
                count: 500,
            },
        );
        let service = CycleService::new(Arc::new(model), EngineConfig::default());

        let one = periods_starting(&[date(2024, 3, 1)]);
        let two = periods_with_gaps(date(2024, 3, 1), &[30]);

        let one_forecast = service.predict_with_confidence(&one, Some(34));
        let two_forecast = service.predict_with_confidence(&two, Some(34));

        assert_eq!(one_forecast.cycle_length_days, 32);
        assert_eq!(one_forecast.confidence_percent, 95);
        assert_eq!(one_forecast.predicted_date, Some(date(2024, 4, 2)));
        assert_eq!(one_forecast.cycle_length_days, two_forecast.cycle_length_days);
        assert_eq!(one_forecast.confidence_percent, two_forecast.confidence_percent);
    }

    #[test]
    fn test_placeholder_history_needs_four_periods_to_blend() {
        let service = fallback_service();

        let three = periods_with_gaps(date(2024, 1, 1), &[32, 32]);
        assert_eq!(service.predict_with_confidence(&three, None).confidence_percent, 70);

        let four = periods_with_gaps(date(2024, 1, 1), &[32, 32, 32]);
        let forecast = service.predict_with_confidence(&four, None);
        // history [28, 32, 32]: 0.7 * 30.67 + 0.3 * 28 = 29.87
        assert_eq!(forecast.cycle_length_days, 30);
        assert_eq!(forecast.confidence_percent, 90);
    }

    #[test]
    fn test_measured_history_policy() {
        let config = EngineConfig::default().with_first_cycle_history(FirstCycleHistory::MeasuredOnly);
        let service = CycleService::new(Arc::new(PopulationModel::fallback()), config);

        let four = periods_with_gaps(date(2024, 1, 1), &[30, 30, 30]);
        let forecast = service.predict_with_confidence(&four, None);
        // 0.7 * 30 + 0.3 * 28 = 29.4
        assert_eq!(forecast.cycle_length_days, 29);
        assert_eq!(forecast.confidence_percent, 90);
        assert_eq!(forecast.predicted_date, Some(date(2024, 3, 31) + chrono::Duration::days(29)));
    }

    #[test]
    fn test_offsets_clamped_unless_disabled() {
        let records = periods_with_gaps(date(2024, 1, 1), &[5, 5, 5, 5]);

        let clamped = fallback_service().predict_with_confidence(&records, None);
        assert!(clamped.ovulation_day >= 0);
        assert!(clamped.fertility_window.start_day_offset >= 0);

        let config = EngineConfig {
            clamp_negative_offsets: false,
            ..EngineConfig::default()
        };
        let raw = CycleService::new(Arc::new(PopulationModel::fallback()), config)
            .predict_with_confidence(&records, None);
        assert!(raw.fertility_window.start_day_offset < 0);
    }

    #[test]
    fn test_cycle_statistics() {
        let service = fallback_service();
        let records = periods_with_gaps(date(2024, 1, 1), &[26, 30, 33]);

        let stats = service.cycle_statistics(&records);
        assert_eq!(stats.mean_cycle_length, 30);
        assert_eq!(stats.shortest, Some(26));
        assert_eq!(stats.longest, Some(33));
        assert_eq!(stats.regularity, Some(Regularity::Regular));
        assert_eq!(stats.cycle_count, 3);
        assert!(stats.anomalies.is_empty());
    }

    #[test]
    fn test_cycle_statistics_reports_anomalies() {
        let service = fallback_service();
        let records = periods_starting(&[date(2024, 2, 1), date(2024, 1, 1), date(2024, 1, 1)]);

        let stats = service.cycle_statistics(&records);
        assert_eq!(stats.cycle_count, 1);
        assert_eq!(stats.mean_cycle_length, 31);
        assert_eq!(
            stats.anomalies,
            vec![
                GapAnomaly::OutOfOrderInput,
                GapAnomaly::DuplicateStartDate(date(2024, 1, 1)),
            ]
        );

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["anomalies"][0], "out_of_order_input");
    }

    #[test]
    fn test_trained_model_cohort_drives_prediction() {
        let model = train_population_model(SAMPLE_TRAINING_TABLE).unwrap();
        let service = CycleService::new(Arc::new(model), EngineConfig::default());
        let records = periods_with_gaps(date(2024, 1, 1), &[28]);

        let forecast = service.predict_with_confidence(&records, Some(25));
        // twelve cycles in the 20s cohort, mean 28.5
        assert_eq!(forecast.cycle_length_days, 29);
        assert_eq!(forecast.confidence_percent, 82);

        let summary = service.training_summary();
        assert_eq!(summary.cycle_count, 14);
        assert_eq!(summary.subject_count, 5);
        assert_eq!(service.population_highlights().cohort_age_range, Some((20, 30)));
    }

    #[test]
    fn test_health_tip_and_day_counts() {
        let service = fallback_service();
        let records = periods_with_gaps(date(2024, 1, 1), &[28, 28, 28]);
        let latest = date(2024, 3, 25);

        assert_eq!(service.days_since_last_period(&records, date(2024, 4, 6)), Some(12));
        assert_eq!(
            service.health_tip(&records, None, date(2024, 4, 6)),
            CyclePhase::Ovulatory.tip()
        );

        let next = service.predict_next_period(&records).unwrap();
        assert_eq!(
            service.days_until_next_period(&records, latest),
            Some((next - latest).num_days())
        );
    }
}
