// Domain entities and value objects
pub mod conversions;
pub mod insight;
pub mod period;
pub mod population;
pub mod prediction;

// Re-export common types for easier imports
pub use insight::{ConfidenceTier, CyclePhase, Insight, InsightType};
pub use period::{CreatePeriodRequest, FlowIntensity, PeriodRecord};
pub use population::{
    AgeCohortModel, ModelSource, PopulationFieldModel, PopulationHighlights, PopulationModel,
    TrainingSummary,
};
pub use prediction::{CycleStatistics, FertilityWindow, GapAnomaly, Prediction, Regularity};
