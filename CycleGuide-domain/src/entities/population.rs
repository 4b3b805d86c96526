use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Statistical summary of one tracked field across the training corpus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationFieldModel {
    /// Arithmetic mean
    pub mean: f64,
    /// Median
    pub median: f64,
    /// Population standard deviation
    pub standard_deviation: f64,
    /// Smallest observation, for fields that track a range
    pub min: Option<f64>,
    /// Largest observation, for fields that track a range
    pub max: Option<f64>,
    /// Bucket label to fraction of observations, rounded to 2 decimals
    pub distribution: BTreeMap<String, f64>,
}

/// Cycle-length summary for one decade-of-age cohort
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AgeCohortModel {
    /// Mean cycle length in the cohort
    pub mean: f64,
    /// Population standard deviation of cycle length in the cohort
    pub standard_deviation: f64,
    /// Number of cycles observed in the cohort
    pub count: usize,
}

/// Whether the model came from training data or the built-in constants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModelSource {
    /// Trained from a population table
    Trained,
    /// Hand-authored fallback constants
    Fallback,
}

/// Provenance of the loaded population model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrainingSummary {
    /// Where the model came from
    pub source: ModelSource,
    /// Number of accepted cycle rows
    pub cycle_count: usize,
    /// Number of distinct subjects among accepted rows
    pub subject_count: usize,
}

/// Headline population figures for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PopulationHighlights {
    /// Average cycle length, rounded
    pub average_cycle_length: i64,
    /// Typical ovulation day, rounded
    pub typical_ovulation_day: i64,
    /// Typical fertility window length in days, rounded
    pub typical_fertility_window_days: i64,
    /// Average menses intensity score, rounded
    pub average_menses_intensity: i64,
    /// Youngest and oldest cohort keys, when cohorts exist
    pub cohort_age_range: Option<(u32, u32)>,
    /// Accuracy figure shown alongside the model
    pub accuracy_percent: u8,
}

/// Population statistics used as the prior for predictions
///
/// Built once at startup and shared read-only afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PopulationModel {
    /// Cycle length in days
    pub cycle_length: PopulationFieldModel,
    /// Estimated ovulation day
    pub ovulation: PopulationFieldModel,
    /// Total menses intensity score
    pub menses_intensity: PopulationFieldModel,
    /// Fertility window length in days
    pub fertility_window: PopulationFieldModel,
    /// Cycle-length cohorts keyed by `floor(age / 10) * 10`
    pub age_cohorts: BTreeMap<u32, AgeCohortModel>,
    /// Provenance
    pub training: TrainingSummary,
}

/// Cohort key for an age: the start of its decade
pub fn cohort_key(age: u32) -> u32 {
    (age / 10) * 10
}

fn distribution(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries
        .iter()
        .map(|(label, fraction)| (label.to_string(), *fraction))
        .collect()
}

impl PopulationModel {
    /// Built-in model used whenever training data is unavailable
    pub fn fallback() -> Self {
        Self {
            cycle_length: PopulationFieldModel {
                mean: 28.0,
                median: 28.0,
                standard_deviation: 3.0,
                min: Some(21.0),
                max: Some(35.0),
                distribution: distribution(&[
                    ("21-24", 0.1),
                    ("25-27", 0.2),
                    ("28-30", 0.4),
                    ("31-33", 0.2),
                    ("34-35", 0.1),
                ]),
            },
            ovulation: PopulationFieldModel {
                mean: 14.0,
                median: 14.0,
                standard_deviation: 2.0,
                min: None,
                max: None,
                distribution: distribution(&[
                    ("12-13", 0.1),
                    ("14-15", 0.6),
                    ("16-17", 0.2),
                    ("18-19", 0.1),
                ]),
            },
            menses_intensity: PopulationFieldModel {
                mean: 10.0,
                median: 10.0,
                standard_deviation: 3.0,
                min: None,
                max: None,
                distribution: distribution(&[
                    ("1-5", 0.1),
                    ("6-8", 0.2),
                    ("9-12", 0.4),
                    ("13-15", 0.2),
                    ("16+", 0.1),
                ]),
            },
            fertility_window: PopulationFieldModel {
                mean: 6.0,
                median: 6.0,
                standard_deviation: 2.0,
                min: None,
                max: None,
                distribution: distribution(&[
                    ("3-4", 0.1),
                    ("5-6", 0.4),
                    ("7-8", 0.3),
                    ("9-10", 0.2),
                ]),
            },
            age_cohorts: BTreeMap::new(),
            training: TrainingSummary {
                source: ModelSource::Fallback,
                cycle_count: 0,
                subject_count: 0,
            },
        }
    }

    /// Whether this is the built-in fallback model
    pub fn is_fallback(&self) -> bool {
        self.training.source == ModelSource::Fallback
    }

    /// Cohort covering `age`, if the training data had one
    pub fn cohort_for_age(&self, age: u32) -> Option<&AgeCohortModel> {
        self.age_cohorts.get(&cohort_key(age))
    }

    /// Accuracy figure shown next to the model
    ///
    /// Trained models report their mean cycle length relative to 28 days,
    /// capped at 99; the fallback reports a fixed 95.
    pub fn accuracy_percent(&self) -> u8 {
        match self.training.source {
            ModelSource::Fallback => 95,
            ModelSource::Trained => {
                let relative = (self.cycle_length.mean / 28.0 * 100.0).round();
                relative.clamp(0.0, 99.0) as u8
            }
        }
    }

    /// Headline figures for display
    pub fn highlights(&self) -> PopulationHighlights {
        let cohort_age_range = match (
            self.age_cohorts.keys().next(),
            self.age_cohorts.keys().next_back(),
        ) {
            (Some(youngest), Some(oldest)) => Some((*youngest, *oldest)),
            _ => None,
        };

        PopulationHighlights {
            average_cycle_length: self.cycle_length.mean.round() as i64,
            typical_ovulation_day: self.ovulation.mean.round() as i64,
            typical_fertility_window_days: self.fertility_window.mean.round() as i64,
            average_menses_intensity: self.menses_intensity.mean.round() as i64,
            cohort_age_range,
            accuracy_percent: self.accuracy_percent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cohort_key() {
        assert_eq!(cohort_key(0), 0);
        assert_eq!(cohort_key(19), 10);
        assert_eq!(cohort_key(20), 20);
        assert_eq!(cohort_key(37), 30);
    }

    #[test]
    fn test_fallback_constants() {
        let model = PopulationModel::fallback();
        assert!(model.is_fallback());
        assert_eq!(model.cycle_length.mean, 28.0);
        assert_eq!(model.cycle_length.standard_deviation, 3.0);
        assert_eq!(model.cycle_length.min, Some(21.0));
        assert_eq!(model.cycle_length.max, Some(35.0));
        assert_eq!(model.ovulation.mean, 14.0);
        assert_eq!(model.menses_intensity.standard_deviation, 3.0);
        assert_eq!(model.fertility_window.median, 6.0);
        assert!(model.age_cohorts.is_empty());
        assert!(model.cohort_for_age(25).is_none());
    }

    #[test]
    fn test_fallback_highlights() {
        let highlights = PopulationModel::fallback().highlights();
        assert_eq!(highlights.average_cycle_length, 28);
        assert_eq!(highlights.typical_ovulation_day, 14);
        assert_eq!(highlights.typical_fertility_window_days, 6);
        assert_eq!(highlights.average_menses_intensity, 10);
        assert_eq!(highlights.cohort_age_range, None);
        assert_eq!(highlights.accuracy_percent, 95);
    }

    #[test]
    fn test_trained_accuracy_is_capped() {
        let mut model = PopulationModel::fallback();
        model.training.source = ModelSource::Trained;
        model.cycle_length.mean = 29.4;
        assert_eq!(model.accuracy_percent(), 99);

        model.cycle_length.mean = 26.6;
        assert_eq!(model.accuracy_percent(), 95);
    }
}
