pub mod cycle;
pub mod cycle_analysis;
pub mod insights;
pub mod periods;
pub mod population;
pub mod prediction;
pub mod statistics;

// Domain services
// Statistics, population training, cycle analysis, prediction and insights,
// plus the period tracking and display-facing services built on them.

// Re-export service types and factory functions
pub use cycle::CycleService;
pub use cycle_analysis::{analyze_cycles, CycleAnalysis, FirstCycleHistory, GapAnomaly};
pub use periods::{create_default_period_service, PeriodService, PeriodServiceError, PeriodServiceTrait};
pub use population::{load_population_model, train_population_model, PopulationModelError};
pub use statistics::StatisticsError;
