use crate::entities::insight::{ConfidenceTier, CyclePhase, Insight, InsightType};
use crate::entities::period::PeriodRecord;
use crate::entities::population::{cohort_key, PopulationModel};
use crate::services::cycle_analysis::analyze_cycles;
use crate::services::prediction::MIN_COHORT_COUNT;
use crate::services::statistics;

/// Distinct period start dates needed before personal insights are attempted
pub const MIN_PERIODS_FOR_INSIGHTS: usize = 3;

/// Personal mean must differ from the population by more than this
const CYCLE_LENGTH_DEVIATION_DAYS: f64 = 3.0;

/// Personal spread must exceed the population spread by this factor
const IRREGULARITY_FACTOR: f64 = 1.5;

/// Tip shown before any period has been logged
pub const NO_HISTORY_TIP: &str = "Track your cycles to get personalized insights!";

/// Generate insights comparing a user's cycles with the population
pub fn generate_insights(
    periods: &[PeriodRecord],
    user_age: u32,
    model: &PopulationModel,
) -> Vec<Insight> {
    let gaps = analyze_cycles(periods).measured();
    // duplicate start dates yield no gap, so this counts distinct starts
    if gaps.len() + 1 < MIN_PERIODS_FOR_INSIGHTS {
        return vec![Insight::track_more_cycles()];
    }

    let mut insights = Vec::new();

    if let (Ok(personal_mean), Ok(personal_std)) = (
        statistics::mean(&gaps),
        statistics::standard_deviation(&gaps),
    ) {
        let population = &model.cycle_length;

        if (personal_mean - population.mean).abs() > CYCLE_LENGTH_DEVIATION_DAYS {
            let direction = if personal_mean > population.mean {
                "longer"
            } else {
                "shorter"
            };
            insights.push(Insight {
                insight_type: InsightType::CycleLength,
                message: format!(
                    "Your average cycle length ({} days) is {} than the population average ({:.1} days).",
                    personal_mean.round() as i64,
                    direction,
                    population.mean
                ),
                confidence: ConfidenceTier::High,
            });
        }

        if personal_std > population.standard_deviation * IRREGULARITY_FACTOR {
            insights.push(Insight {
                insight_type: InsightType::Irregularity,
                message: "Your cycles show more variation than typical. Consider tracking additional factors like stress, sleep, and exercise."
                    .to_string(),
                confidence: ConfidenceTier::Medium,
            });
        }
    }

    if let Some(cohort) = model
        .cohort_for_age(user_age)
        .filter(|cohort| cohort.count > MIN_COHORT_COUNT)
    {
        insights.push(Insight {
            insight_type: InsightType::AgePattern,
            message: format!(
                "Women in your age group ({}s) typically have {}-day cycles.",
                cohort_key(user_age),
                cohort.mean.round() as i64
            ),
            confidence: ConfidenceTier::High,
        });
    }

    if insights.is_empty() {
        insights.push(Insight::track_more_cycles());
    }
    insights
}

/// Pick the health tip to show.
///
/// The first high-confidence insight wins; otherwise the tip for the current
/// cycle phase. `days_since_last_period` is `None` when nothing is logged.
pub fn select_health_tip(insights: &[Insight], days_since_last_period: Option<i64>) -> String {
    let Some(days_since) = days_since_last_period else {
        return NO_HISTORY_TIP.to_string();
    };

    insights
        .iter()
        .find(|insight| insight.confidence == ConfidenceTier::High)
        .map(|insight| insight.message.clone())
        .unwrap_or_else(|| CyclePhase::from_days_since(days_since).tip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::population::AgeCohortModel;
    use crate::testing::fixtures::{date, periods_starting};

    fn regular_periods() -> Vec<PeriodRecord> {
        periods_starting(&[
            date(2024, 1, 1),
            date(2024, 1, 29),
            date(2024, 2, 26),
            date(2024, 3, 25),
        ])
    }

    fn model_with_cohort(count: usize) -> PopulationModel {
        let mut model = PopulationModel::fallback();
        model.age_cohorts.insert(
            20,
            AgeCohortModel {
                mean: 29.2,
                standard_deviation: 3.1,
                count,
            },
        );
        model
    }

    #[test]
    fn test_too_few_periods() {
        let periods = periods_starting(&[date(2024, 1, 1), date(2024, 2, 5)]);
        let insights = generate_insights(&periods, 25, &model_with_cohort(100));

        assert_eq!(insights, vec![Insight::track_more_cycles()]);
    }

    #[test]
    fn test_duplicate_start_dates_do_not_count_towards_threshold() {
        let periods = periods_starting(&[date(2024, 1, 1), date(2024, 1, 1), date(2024, 2, 5)]);
        let insights = generate_insights(&periods, 25, &model_with_cohort(100));

        assert_eq!(insights, vec![Insight::track_more_cycles()]);
    }

    #[test]
    fn test_typical_cycles_get_generic_insight() {
        let insights = generate_insights(&regular_periods(), 25, &PopulationModel::fallback());
        assert_eq!(insights, vec![Insight::track_more_cycles()]);
    }

    #[test]
    fn test_long_cycles_are_flagged() {
        let periods = periods_starting(&[
            date(2024, 1, 1),
            date(2024, 2, 5),
            date(2024, 3, 11),
            date(2024, 4, 15),
        ]);
        let insights = generate_insights(&periods, 25, &PopulationModel::fallback());

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight_type, InsightType::CycleLength);
        assert_eq!(insights[0].confidence, ConfidenceTier::High);
        assert_eq!(
            insights[0].message,
            "Your average cycle length (35 days) is longer than the population average (28.0 days)."
        );
    }

    #[test]
    fn test_short_cycles_are_flagged() {
        let periods = periods_starting(&[
            date(2024, 1, 1),
            date(2024, 1, 22),
            date(2024, 2, 12),
        ]);
        let insights = generate_insights(&periods, 25, &PopulationModel::fallback());
        assert!(insights[0].message.contains("(21 days) is shorter"));
    }

    #[test]
    fn test_irregular_cycles_are_flagged() {
        // gaps 20, 36, 22, 34: mean 28, std dev 7.07
        let periods = periods_starting(&[
            date(2024, 1, 1),
            date(2024, 1, 21),
            date(2024, 2, 26),
            date(2024, 3, 19),
            date(2024, 4, 22),
        ]);
        let insights = generate_insights(&periods, 25, &PopulationModel::fallback());

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight_type, InsightType::Irregularity);
        assert_eq!(insights[0].confidence, ConfidenceTier::Medium);
    }

    #[test]
    fn test_age_pattern_needs_large_cohort() {
        let insights = generate_insights(&regular_periods(), 25, &model_with_cohort(11));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].insight_type, InsightType::AgePattern);
        assert_eq!(
            insights[0].message,
            "Women in your age group (20s) typically have 29-day cycles."
        );

        let small = generate_insights(&regular_periods(), 25, &model_with_cohort(10));
        assert_eq!(small, vec![Insight::track_more_cycles()]);

        let other_decade = generate_insights(&regular_periods(), 35, &model_with_cohort(50));
        assert_eq!(other_decade, vec![Insight::track_more_cycles()]);
    }

    #[test]
    fn test_health_tip_prefers_high_confidence_insight() {
        let insights = generate_insights(&regular_periods(), 25, &model_with_cohort(50));
        let tip = select_health_tip(&insights, Some(3));
        assert_eq!(tip, insights[0].message);
    }

    #[test]
    fn test_health_tip_falls_back_to_phase() {
        let insights = vec![Insight::track_more_cycles()];
        assert_eq!(
            select_health_tip(&insights, Some(2)),
            CyclePhase::Menstrual.tip()
        );
        assert_eq!(
            select_health_tip(&insights, Some(12)),
            CyclePhase::Ovulatory.tip()
        );
        assert_eq!(
            select_health_tip(&insights, Some(25)),
            CyclePhase::Luteal.tip()
        );
        assert_eq!(
            select_health_tip(&insights, Some(8)),
            CyclePhase::Unspecified.tip()
        );
        assert_eq!(select_health_tip(&[], None), NO_HISTORY_TIP);
    }
}
