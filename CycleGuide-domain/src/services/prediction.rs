use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::entities::population::PopulationModel;
use crate::entities::prediction::{FertilityWindow, Prediction};
use crate::services::statistics;

/// Confidence in the population prior alone
const BASE_CONFIDENCE: f64 = 0.7;
/// Ceiling on any blended confidence
const MAX_CONFIDENCE: f64 = 0.95;
/// Confidence gained from a usable personal history
const PERSONAL_CONFIDENCE_BOOST: f64 = 0.2;
/// Weight of the personal mean when blending with the prior
const PERSONAL_WEIGHT: f64 = 0.7;
/// Cohorts need more observations than this to be trusted
pub const MIN_COHORT_COUNT: usize = 10;
/// Personal history needs at least this many samples to be blended in
const MIN_PERSONAL_SAMPLES: usize = 3;
/// Days from ovulation to the next period
const LUTEAL_PHASE_DAYS: i64 = 14;

/// Forecast the next cycle from personal history and the population prior.
///
/// `history` is a list of cycle lengths in days. With no history at all the
/// default prediction is returned without consulting the model. Offsets are
/// not clamped here; see [`clamp_offsets`].
pub fn predict(history: &[f64], user_age: u32, model: &PopulationModel) -> Prediction {
    if history.is_empty() {
        debug!("No personal cycle history, returning default prediction");
        return Prediction::default();
    }
    predict_from_prior(history, user_age, model)
}

/// Forecast starting from the population or cohort prior, even with no history.
///
/// Used once at least one period is logged: a single period has no measured
/// cycle yet but still deserves the population estimate.
pub fn predict_from_prior(history: &[f64], user_age: u32, model: &PopulationModel) -> Prediction {
    let mut estimate = model.cycle_length.mean;
    let mut confidence = BASE_CONFIDENCE;

    if let Some(cohort) = model
        .cohort_for_age(user_age)
        .filter(|cohort| cohort.count > MIN_COHORT_COUNT)
    {
        estimate = cohort.mean;
        confidence = (BASE_CONFIDENCE + cohort.count as f64 / 100.0).min(MAX_CONFIDENCE);
    }

    if history.len() >= MIN_PERSONAL_SAMPLES {
        if let Ok(personal_mean) = statistics::mean(history) {
            estimate = PERSONAL_WEIGHT * personal_mean + (1.0 - PERSONAL_WEIGHT) * estimate;
            confidence = (confidence + PERSONAL_CONFIDENCE_BOOST).min(MAX_CONFIDENCE);
        }
    }

    let cycle_length_days = estimate.round() as i64;
    let prediction = Prediction {
        cycle_length_days,
        ovulation_day: cycle_length_days - LUTEAL_PHASE_DAYS,
        confidence_percent: (confidence * 100.0).round() as u8,
        fertility_window: FertilityWindow {
            start_day_offset: cycle_length_days - 17,
            end_day_offset: cycle_length_days - 11,
        },
        predicted_date: None,
    };

    debug!(
        "Predicted {}-day cycle at {}% confidence from {} history samples",
        prediction.cycle_length_days,
        prediction.confidence_percent,
        history.len()
    );
    prediction
}

/// Floor the ovulation day and fertility window bounds at zero
pub fn clamp_offsets(mut prediction: Prediction) -> Prediction {
    prediction.ovulation_day = prediction.ovulation_day.max(0);
    prediction.fertility_window.start_day_offset = prediction.fertility_window.start_day_offset.max(0);
    prediction.fertility_window.end_day_offset = prediction.fertility_window.end_day_offset.max(0);
    prediction
}

/// Anchor a prediction to the most recent period start
pub fn with_predicted_date(mut prediction: Prediction, latest_start: Option<NaiveDate>) -> Prediction {
    prediction.predicted_date = latest_start
        .and_then(|start| start.checked_add_signed(Duration::days(prediction.cycle_length_days)));
    prediction
}
