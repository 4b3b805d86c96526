// Engine configuration
// Values come from the environment, optionally seeded from a .env file by the caller.

use std::env;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, info};

use cycle_guide_data::training::TrainingDataSource;

use crate::services::cycle_analysis::FirstCycleHistory;

/// Age assumed for users who have not given one
pub const DEFAULT_USER_AGE: u32 = 25;

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be used
    #[error("{key} has invalid value '{value}'")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },
}

/// Settings for the prediction engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Where to load the population training table from
    pub training_source: Option<TrainingDataSource>,
    /// Age used when a caller does not supply one
    pub default_user_age: u32,
    /// How the predictor's personal history is derived
    pub first_cycle_history: FirstCycleHistory,
    /// Floor ovulation day and fertility window at zero
    pub clamp_negative_offsets: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            training_source: None,
            default_user_age: DEFAULT_USER_AGE,
            first_cycle_history: FirstCycleHistory::Placeholder,
            clamp_negative_offsets: true,
        }
    }
}

impl EngineConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        // A local file wins over a URL when both are set
        let training_source = match (lookup("TRAINING_DATA_PATH"), lookup("TRAINING_DATA_URL")) {
            (Some(path), _) if !path.trim().is_empty() => {
                Some(TrainingDataSource::File(PathBuf::from(path.trim())))
            }
            (_, Some(url)) if !url.trim().is_empty() => Some(TrainingDataSource::Url(url.trim().to_string())),
            _ => None,
        };

        let default_user_age = match lookup("DEFAULT_USER_AGE") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: "DEFAULT_USER_AGE",
                value: raw,
            })?,
            None => defaults.default_user_age,
        };

        let first_cycle_history = match lookup("FIRST_CYCLE_HISTORY") {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "placeholder" => FirstCycleHistory::Placeholder,
                "measured" | "measured_only" => FirstCycleHistory::MeasuredOnly,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "FIRST_CYCLE_HISTORY",
                        value: raw,
                    })
                }
            },
            None => defaults.first_cycle_history,
        };

        let clamp_negative_offsets = match lookup("CLAMP_NEGATIVE_OFFSETS") {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "CLAMP_NEGATIVE_OFFSETS",
                        value: raw,
                    })
                }
            },
            None => defaults.clamp_negative_offsets,
        };

        match &training_source {
            Some(source) => info!("Training data source: {}", source),
            None => info!("No training data source configured"),
        }
        debug!(
            "Engine configuration: default_user_age={}, first_cycle_history={:?}, clamp_negative_offsets={}",
            default_user_age, first_cycle_history, clamp_negative_offsets
        );

        Ok(Self {
            training_source,
            default_user_age,
            first_cycle_history,
            clamp_negative_offsets,
        })
    }

    /// Use a specific training data source
    pub fn with_training_source(mut self, source: TrainingDataSource) -> Self {
        self.training_source = Some(source);
        self
    }

    /// Use a specific first-cycle history policy
    pub fn with_first_cycle_history(mut self, policy: FirstCycleHistory) -> Self {
        self.first_cycle_history = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.default_user_age, 25);
        assert_eq!(config.first_cycle_history, FirstCycleHistory::Placeholder);
        assert!(config.clamp_negative_offsets);
        assert!(config.training_source.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("TRAINING_DATA_URL", "https://example.org/p1.csv"),
            ("DEFAULT_USER_AGE", "34"),
            ("FIRST_CYCLE_HISTORY", "measured"),
            ("CLAMP_NEGATIVE_OFFSETS", "false"),
        ]))
        .unwrap();

        assert_eq!(
            config.training_source,
            Some(TrainingDataSource::Url("https://example.org/p1.csv".to_string()))
        );
        assert_eq!(config.default_user_age, 34);
        assert_eq!(config.first_cycle_history, FirstCycleHistory::MeasuredOnly);
        assert!(!config.clamp_negative_offsets);
    }

    #[test]
    fn test_path_wins_over_url() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("TRAINING_DATA_PATH", "data/p1.csv"),
            ("TRAINING_DATA_URL", "https://example.org/p1.csv"),
        ]))
        .unwrap();
        assert_eq!(
            config.training_source,
            Some(TrainingDataSource::File(PathBuf::from("data/p1.csv")))
        );
    }

    #[test]
    fn test_invalid_values() {
        let err = EngineConfig::from_lookup(lookup_from(&[("DEFAULT_USER_AGE", "old")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "DEFAULT_USER_AGE",
                value: "old".to_string()
            }
        );

        assert!(EngineConfig::from_lookup(lookup_from(&[("FIRST_CYCLE_HISTORY", "guess")])).is_err());
        assert!(EngineConfig::from_lookup(lookup_from(&[("CLAMP_NEGATIVE_OFFSETS", "maybe")])).is_err());
    }
}
