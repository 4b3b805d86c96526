//! Population model training.
//!
//! Turns a delimited training table into a [`PopulationModel`]. Any failure
//! along the way degrades to [`PopulationModel::fallback`] with a warning, so
//! callers always get a usable model.

use std::collections::{BTreeMap, HashSet};

use thiserror::Error;
use tracing::{debug, info, warn};

use cycle_guide_data::training::TrainingDataSource;

use crate::entities::population::{
    cohort_key, AgeCohortModel, ModelSource, PopulationFieldModel, PopulationModel, TrainingSummary,
};
use crate::services::statistics::{self, StatisticsError};

const CLIENT_ID_COLUMN: &str = "ClientID";
const CYCLE_LENGTH_COLUMN: &str = "LengthofCycle";
const OVULATION_COLUMN: &str = "EstimatedDayofOvulation";
const MENSES_SCORE_COLUMN: &str = "TotalMensesScore";
const FERTILITY_DAYS_COLUMN: &str = "TotalDaysofFertility";
const AGE_COLUMN: &str = "Age";

/// Exclusive upper bound for plausible cycle lengths and ovulation days
const MAX_PLAUSIBLE_DAYS: i64 = 50;

/// Population model training errors
#[derive(Debug, Error)]
pub enum PopulationModelError {
    /// The table has no header row
    #[error("Training table is empty")]
    EmptyTable,

    /// A required column is missing from the header
    #[error("Training table is missing required column {0}")]
    MissingColumn(&'static str),

    /// No row carried a parseable cycle length
    #[error("Training table has no rows with a valid cycle length")]
    NoAcceptedRows,

    /// A statistic could not be computed
    #[error("Statistics error: {0}")]
    Statistics(#[from] StatisticsError),
}

/// One accepted row of the training table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingRow {
    /// Subject identifier, if the table has one
    pub client_id: Option<String>,
    /// Cycle length in days
    pub cycle_length: i64,
    /// Estimated ovulation day
    pub ovulation_day: Option<i64>,
    /// Total menses intensity score
    pub menses_score: Option<i64>,
    /// Fertility window length in days
    pub fertility_days: Option<i64>,
    /// Subject age in years
    pub age: Option<i64>,
}

/// Parse a leading integer the lenient way: optional sign, then digits,
/// ignoring whatever follows (so `"28.5"` and `"28 days"` both read as 28).
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

fn detect_delimiter(header: &str) -> char {
    if header.contains('\t') {
        '\t'
    } else if header.contains(';') && !header.contains(',') {
        ';'
    } else {
        ','
    }
}

fn clean_cell(cell: &str) -> &str {
    cell.trim().trim_matches('"').trim()
}

/// Parse the training table, keeping rows whose cycle length parses
pub fn parse_training_table(text: &str) -> Result<Vec<TrainingRow>, PopulationModelError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or(PopulationModelError::EmptyTable)?;
    let delimiter = detect_delimiter(header);

    let columns: Vec<&str> = header.split(delimiter).map(clean_cell).collect();
    let position = |name: &str| columns.iter().position(|column| *column == name);

    let cycle_idx = position(CYCLE_LENGTH_COLUMN)
        .ok_or(PopulationModelError::MissingColumn(CYCLE_LENGTH_COLUMN))?;
    let client_idx = position(CLIENT_ID_COLUMN);
    let ovulation_idx = position(OVULATION_COLUMN);
    let menses_idx = position(MENSES_SCORE_COLUMN);
    let fertility_idx = position(FERTILITY_DAYS_COLUMN);
    let age_idx = position(AGE_COLUMN);

    let mut rows = Vec::new();
    let mut rejected = 0usize;

    for line in lines {
        let cells: Vec<&str> = line.split(delimiter).map(clean_cell).collect();
        let cell = |idx: Option<usize>| idx.and_then(|i| cells.get(i).copied());
        let int_cell = |idx: Option<usize>| cell(idx).and_then(parse_leading_int);

        let Some(cycle_length) = int_cell(Some(cycle_idx)) else {
            rejected += 1;
            continue;
        };

        rows.push(TrainingRow {
            client_id: cell(client_idx)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            cycle_length,
            ovulation_day: int_cell(ovulation_idx),
            menses_score: int_cell(menses_idx),
            fertility_days: int_cell(fertility_idx),
            age: int_cell(age_idx),
        });
    }

    debug!(
        "Parsed training table: {} accepted rows, {} rejected",
        rows.len(),
        rejected
    );
    Ok(rows)
}

fn field_model(
    name: &str,
    values: Vec<f64>,
    with_range: bool,
    fallback: &PopulationFieldModel,
) -> Result<PopulationFieldModel, PopulationModelError> {
    if values.is_empty() {
        warn!("No usable {} values in training data, using fallback field model", name);
        return Ok(fallback.clone());
    }
    Ok(statistics::summarize(&values, with_range)?)
}

fn cohort_models(rows: &[TrainingRow]) -> Result<BTreeMap<u32, AgeCohortModel>, PopulationModelError> {
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for row in rows {
        if let Some(age) = row.age.filter(|age| *age > 0) {
            let key = cohort_key(u32::try_from(age).unwrap_or(u32::MAX));
            groups.entry(key).or_default().push(row.cycle_length as f64);
        }
    }

    groups
        .into_iter()
        .map(|(key, cycles)| {
            Ok((
                key,
                AgeCohortModel {
                    mean: statistics::mean(&cycles)?,
                    standard_deviation: statistics::standard_deviation(&cycles)?,
                    count: cycles.len(),
                },
            ))
        })
        .collect()
}

/// Train a population model from already-parsed rows
pub fn train_from_rows(rows: &[TrainingRow]) -> Result<PopulationModel, PopulationModelError> {
    if rows.is_empty() {
        return Err(PopulationModelError::NoAcceptedRows);
    }

    let fallback = PopulationModel::fallback();
    let in_plausible_range = |v: &i64| *v > 0 && *v < MAX_PLAUSIBLE_DAYS;

    let cycle_lengths = rows
        .iter()
        .map(|row| row.cycle_length)
        .filter(in_plausible_range)
        .map(|v| v as f64)
        .collect();
    let ovulation_days = rows
        .iter()
        .filter_map(|row| row.ovulation_day)
        .filter(in_plausible_range)
        .map(|v| v as f64)
        .collect();
    let menses_scores = rows
        .iter()
        .filter_map(|row| row.menses_score)
        .filter(|v| *v > 0)
        .map(|v| v as f64)
        .collect();
    let fertility_days = rows
        .iter()
        .filter_map(|row| row.fertility_days)
        .filter(|v| *v > 0)
        .map(|v| v as f64)
        .collect();

    let subjects: HashSet<&str> = rows
        .iter()
        .filter_map(|row| row.client_id.as_deref())
        .collect();

    Ok(PopulationModel {
        cycle_length: field_model("cycle length", cycle_lengths, true, &fallback.cycle_length)?,
        ovulation: field_model("ovulation day", ovulation_days, false, &fallback.ovulation)?,
        menses_intensity: field_model(
            "menses score",
            menses_scores,
            false,
            &fallback.menses_intensity,
        )?,
        fertility_window: field_model(
            "fertility window",
            fertility_days,
            false,
            &fallback.fertility_window,
        )?,
        age_cohorts: cohort_models(rows)?,
        training: TrainingSummary {
            source: ModelSource::Trained,
            cycle_count: rows.len(),
            subject_count: subjects.len(),
        },
    })
}

/// Parse and train in one step
pub fn train_population_model(text: &str) -> Result<PopulationModel, PopulationModelError> {
    let rows = parse_training_table(text)?;
    train_from_rows(&rows)
}

/// Load the population model from `source`, or fall back to the built-in one
pub async fn load_population_model(source: Option<&TrainingDataSource>) -> PopulationModel {
    let Some(source) = source else {
        info!("No training data source configured, using fallback population model");
        return PopulationModel::fallback();
    };

    let text = match source.fetch().await {
        Ok(text) => text,
        Err(e) => {
            warn!("Could not fetch training data from {}: {}. Using fallback population model", source, e);
            return PopulationModel::fallback();
        }
    };

    match train_population_model(&text) {
        Ok(model) => {
            info!(
                "Population model trained with {} cycles from {} subjects ({} age cohorts)",
                model.training.cycle_count,
                model.training.subject_count,
                model.age_cohorts.len()
            );
            model
        }
        Err(e) => {
            warn!("Could not train population model from {}: {}. Using fallback population model", source, e);
            PopulationModel::fallback()
        }
    }
}
