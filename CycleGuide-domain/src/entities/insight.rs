use serde::{Deserialize, Serialize};

/// Kind of insight produced by the insight generator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    /// Personal cycle length differs from the population
    CycleLength,
    /// Personal cycles vary more than typical
    Irregularity,
    /// Typical cycle length for the user's age cohort
    AgePattern,
    /// Generic guidance when nothing specific applies
    General,
}

/// How much weight an insight deserves
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    /// Low confidence
    Low,
    /// Medium confidence
    Medium,
    /// High confidence
    High,
}

/// A display-ready insight
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Insight {
    /// Insight category
    #[serde(rename = "type")]
    pub insight_type: InsightType,

    /// Human-readable message
    pub message: String,

    /// Confidence tier
    pub confidence: ConfidenceTier,
}

impl Insight {
    /// The low-confidence insight shown when there is too little data
    pub fn track_more_cycles() -> Self {
        Self {
            insight_type: InsightType::General,
            message: "Track more cycles to get personalized insights about your reproductive health."
                .to_string(),
            confidence: ConfidenceTier::Low,
        }
    }
}

/// Cycle phase inferred from days since the last period started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    /// Up to day 5
    Menstrual,
    /// Days 10 through 16
    Ovulatory,
    /// Day 20 onwards
    Luteal,
    /// The stretches in between
    Unspecified,
}

impl CyclePhase {
    /// Infer the phase from whole days since the last period started
    pub fn from_days_since(days_since: i64) -> Self {
        match days_since {
            d if d <= 5 => CyclePhase::Menstrual,
            10..=16 => CyclePhase::Ovulatory,
            d if d >= 20 => CyclePhase::Luteal,
            _ => CyclePhase::Unspecified,
        }
    }

    /// Wellness tip for the phase
    pub fn tip(&self) -> &'static str {
        match self {
            CyclePhase::Menstrual => {
                "During your period: Stay hydrated, eat iron-rich foods, and consider light exercise to help with cramps."
            }
            CyclePhase::Ovulatory => {
                "Ovulation phase: You may experience increased energy. Great time for exercise and social activities."
            }
            CyclePhase::Luteal => {
                "Pre-menstrual phase: Consider reducing caffeine and increasing magnesium-rich foods."
            }
            CyclePhase::Unspecified => {
                "Stay hydrated and maintain a balanced diet for optimal health."
            }
        }
    }
}
